//! Collatz certificate CLI: the `collatz-cert` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse()
        .reject_ignored_args()
        .unwrap_or_else(|err| err.exit());
    support::init_tracing(cli.global.quiet, cli.global.verbose);
    let config = support::load_config_or_exit(cli.global.config.as_deref());

    match cli.command {
        Some(Commands::Certify(args)) => commands::certify::run(args, &config),
        Some(Commands::Avoidance(args)) => commands::avoidance::run(args, &config),
        Some(Commands::GateCycle(args)) => commands::gate_cycle::run(args, &config),
        Some(Commands::Tower(args)) => commands::tower::run(args, &config),
        None => commands::certify::run(cli.certify, &config),
    }
}
