use crate::cli::AvoidanceArgs;
use crate::support::{
    ConfigFile, exit_with_verdict, merge_avoidance, or_exit, print_json_or_exit,
};
use collatz_cert_kernel::{AvoidanceOptions, AvoidanceReport, run_avoidance_check};

pub fn run(args: AvoidanceArgs, config: &ConfigFile) {
    let params = merge_avoidance(
        config.avoidance,
        args.m0,
        args.horizon,
        args.spike_threshold,
        args.lift_bits,
    );
    let options = AvoidanceOptions {
        fingerprint: args.hash,
        fail_fast: args.fail_fast,
        retain_witnesses: args.print_sample,
    };
    let report = or_exit(run_avoidance_check(&params, &options));

    if args.json {
        print_json_or_exit(&report);
    } else {
        print_witness_sample(&report);
        if args.print_survivors {
            for r in &report.survivors {
                println!("SURVIVOR r={r}");
            }
        }
        print_summary(&report, args.print_survivors);
    }

    exit_with_verdict(report.verdict);
}

fn print_witness_sample(report: &AvoidanceReport) {
    for w in &report.witnesses {
        println!(
            "r={:5} -> (ell={:2}, j={:2}, b={:2})",
            w.residue, w.lift, w.step, w.valuation
        );
    }
}

pub fn print_summary(report: &AvoidanceReport, survivors_listed: bool) {
    let p = &report.params;
    println!("collatz-cert avoidance");
    println!(
        "  m0={}, J={}, K={}, lifts={}",
        p.m0,
        p.horizon,
        p.spike_threshold,
        p.lift_count()
    );
    println!("  Odd residues checked: {}", report.residues_checked);
    println!("  Witnesses found:      {}", report.witnesses_found);
    println!("  Survivors (A_m0):     {}", report.survivor_count());
    if let Some(h) = &report.hardest {
        println!("  Worst best-hit step:  {}", h.step);
        println!(
            "  Hardest case (r, ell, j, b): ({}, {}, {}, {})",
            h.residue, h.lift, h.step, h.valuation
        );
    }
    if report.halted_early {
        println!("  Halted at first survivor r={}", report.survivors[0]);
    }
    if report.verdict.is_pass() {
        println!("  Result: {} (A_m0 is empty)", report.verdict);
    } else {
        println!("  Result: {} (A_m0 is non-empty)", report.verdict);
        if !survivors_listed && !report.halted_early {
            println!("  Tip: rerun with --print-survivors to list survivors.");
        }
    }
    if let Some(digest) = &report.fingerprint {
        println!("  SHA256(witness-stream) = {digest}");
    }
}
