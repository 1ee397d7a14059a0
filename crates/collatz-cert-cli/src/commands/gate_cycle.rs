use crate::cli::GateCycleArgs;
use crate::support::{
    ConfigFile, exit_with_verdict, merge_gate_cycle, or_exit, print_json_or_exit,
};
use collatz_cert_kernel::{GateCycleReport, run_gate_cycle_check};

pub fn run(args: GateCycleArgs, config: &ConfigFile) {
    let params = merge_gate_cycle(config.gate_cycle, args.m, args.lift_bits);
    let report = or_exit(run_gate_cycle_check(&params, args.hash));

    if args.json {
        print_json_or_exit(&report);
    } else {
        print_summary(&report, args.show_trajectories);
    }

    exit_with_verdict(report.verdict);
}

pub fn print_summary(report: &GateCycleReport, show_trajectories: bool) {
    println!("collatz-cert gate-cycle");
    println!(
        "  m={}, lift bits={}, gate states={}",
        report.params.m, report.params.lift_bits, report.gate_count
    );
    for outcome in &report.outcomes {
        let cycle: Vec<String> = outcome.cycle.iter().map(ToString::to_string).collect();
        println!(
            "    - gate {}: transient={}, cycle=[{}] -> {}",
            outcome.gate,
            outcome.transient_len,
            cycle.join(", "),
            outcome.verdict
        );
        if !outcome.gate_hits.is_empty() {
            let hits: Vec<String> = outcome.gate_hits.iter().map(ToString::to_string).collect();
            println!("      gate states on cycle: {}", hits.join(", "));
        }
        if show_trajectories {
            let orbit: Vec<String> = outcome.orbit.iter().map(ToString::to_string).collect();
            println!("      trajectory: {}", orbit.join(" -> "));
        }
    }
    if report.verdict.is_pass() {
        println!("  Result: {} (no eventual cycle meets the gate)", report.verdict);
    } else {
        println!(
            "  Result: {} ({} gate state(s) cycle back into the gate)",
            report.verdict,
            report.failing_gates().count()
        );
    }
    if let Some(digest) = &report.fingerprint {
        println!("  SHA256(gate-stream) = {digest}");
    }
}
