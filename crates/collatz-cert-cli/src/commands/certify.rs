use crate::cli::CertifyArgs;
use crate::commands::{avoidance, gate_cycle, tower};
use crate::support::{
    ConfigFile, exit_with_verdict, merge_avoidance, merge_gate_cycle, or_exit, print_json_or_exit,
};
use collatz_cert_kernel::{AvoidanceOptions, CertificateParams, run_certificate};

pub fn run(args: CertifyArgs, config: &ConfigFile) {
    let params = CertificateParams {
        avoidance: merge_avoidance(
            config.avoidance,
            args.m0,
            args.horizon,
            args.spike_threshold,
            args.lift_bits,
        ),
        gate_cycle: merge_gate_cycle(config.gate_cycle, args.gate_precision, None),
        tower: args.tower.then_some(config.tower),
    };
    let options = AvoidanceOptions {
        fingerprint: args.hash,
        fail_fast: args.fail_fast,
        retain_witnesses: 0,
    };
    let report = or_exit(run_certificate(&params, &options));

    if args.json {
        print_json_or_exit(&report);
    } else {
        avoidance::print_summary(&report.avoidance, false);
        gate_cycle::print_summary(&report.gate_cycle, false);
        if let Some(tower_report) = &report.tower {
            tower::print_summary(tower_report);
        }
        println!("collatz-cert certificate: {}", report.verdict);
    }

    exit_with_verdict(report.verdict);
}
