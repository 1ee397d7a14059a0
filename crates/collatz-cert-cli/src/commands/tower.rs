use crate::cli::TowerArgs;
use crate::support::{ConfigFile, exit_with_verdict, merge_tower, or_exit, print_json_or_exit};
use collatz_cert_kernel::{TowerReport, run_tower_check};

pub fn run(args: TowerArgs, config: &ConfigFile) {
    let params = merge_tower(config.tower, args.s0, args.alpha);
    let report = or_exit(run_tower_check(&params));

    if args.json {
        print_json_or_exit(&report);
    } else {
        print_summary(&report);
    }

    exit_with_verdict(report.verdict);
}

pub fn print_summary(report: &TowerReport) {
    println!("collatz-cert tower");
    println!(
        "  s0={}, alpha={}",
        report.params.s0, report.params.alpha
    );
    println!("  T window: {}..{}", report.t_window.0, report.t_window.1);
    println!("  q modulus: 2^{}", report.modulus_bits);
    println!("  |V| = {}", report.vertex_count);
    println!("  |E| = {}", report.edge_count);
    println!("  Survivors after pruning: {}", report.survivors);
    if let Some(w) = &report.witness {
        println!("  Witness survivor: T={} q={}", w.state.t, w.state.q);
        println!("  Live successor:   T'={} q'={}", w.successor.t, w.successor.q);
    }
    println!("  Result: {}", report.verdict);
}
