use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "collatz-cert",
    about = "Collatz finite certificate: exhaustive checks at fixed precision",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Certificate options used when no subcommand is given
    #[command(flatten)]
    pub certify: CertifyArgs,
}

impl Cli {
    /// Reject top-level certificate options alongside a subcommand, which
    /// would otherwise be parsed and then ignored.
    ///
    /// Global options (`--config`, `-v`, `-q`) may appear on either side.
    pub fn reject_ignored_args(self) -> Result<Self, clap::Error> {
        if self.command.is_some() && self.certify != CertifyArgs::default() {
            return Err(Self::command().error(
                ErrorKind::ArgumentConflict,
                "certificate options given before a subcommand are not used; \
                 pass them after the subcommand",
            ));
        }
        Ok(self)
    }
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// TOML file with [avoidance], [gate_cycle] and [tower] parameter tables
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every certificate check and report one verdict
    Certify(CertifyArgs),

    /// Check that the avoidance set A_m0 is empty
    Avoidance(AvoidanceArgs),

    /// Check that no eventual cycle from the gate set re-enters it
    GateCycle(GateCycleArgs),

    /// Check that the truncated tower graph has no survivors
    Tower(TowerArgs),
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CertifyArgs {
    /// Base resolution m0 of the avoidance check
    #[arg(long)]
    pub m0: Option<u32>,

    /// Horizon J: odd steps examined per lift
    #[arg(short = 'J', long)]
    pub horizon: Option<u32>,

    /// Spike threshold K: a step with v2(3x+1) >= K excludes a residue
    #[arg(short = 'K', long = "spike")]
    pub spike_threshold: Option<u32>,

    /// Lift bits of the avoidance check (lifts range over 0..2^bits)
    #[arg(long)]
    pub lift_bits: Option<u32>,

    /// Precision m of the gate-cycle check
    #[arg(long = "gate-m")]
    pub gate_precision: Option<u32>,

    /// Also run the tower-graph survival check
    #[arg(long)]
    pub tower: bool,

    /// Compute SHA-256 fingerprints of the witness streams
    #[arg(long)]
    pub hash: bool,

    /// Stop the avoidance scan at the first survivor
    #[arg(long)]
    pub fail_fast: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AvoidanceArgs {
    /// Base resolution m0: residues are odd values modulo 2^m0
    #[arg(long)]
    pub m0: Option<u32>,

    /// Horizon J: odd steps examined per lift
    #[arg(short = 'J', long)]
    pub horizon: Option<u32>,

    /// Spike threshold K: a step with v2(3x+1) >= K excludes a residue
    #[arg(short = 'K', long = "spike")]
    pub spike_threshold: Option<u32>,

    /// Lift bits (lifts range over 0..2^bits)
    #[arg(long)]
    pub lift_bits: Option<u32>,

    /// Compute the SHA-256 fingerprint of the witness stream
    #[arg(long)]
    pub hash: bool,

    /// Print the first N witnesses
    #[arg(long, default_value_t = 0)]
    pub print_sample: usize,

    /// Print every survivor
    #[arg(long)]
    pub print_survivors: bool,

    /// Stop at the first survivor
    #[arg(long)]
    pub fail_fast: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GateCycleArgs {
    /// Precision m: residues are odd values modulo 2^m
    #[arg(long)]
    pub m: Option<u32>,

    /// Lift bits (lifts range over 0..2^bits)
    #[arg(long)]
    pub lift_bits: Option<u32>,

    /// Compute the SHA-256 fingerprint of the gate trajectories
    #[arg(long)]
    pub hash: bool,

    /// Print every gate trajectory in discovery order
    #[arg(long)]
    pub show_trajectories: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TowerArgs {
    /// Base depth scale s0
    #[arg(long)]
    pub s0: Option<u32>,

    /// Extra robustness bits alpha
    #[arg(long)]
    pub alpha: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_hash_flag_selects_the_default_run() {
        let cli = Cli::try_parse_from(["collatz-cert", "--hash"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.certify.hash);
    }

    #[test]
    fn short_horizon_and_spike_flags() {
        let cli =
            Cli::try_parse_from(["collatz-cert", "avoidance", "--m0", "8", "-J", "2", "-K", "5"])
                .unwrap();
        let Some(Commands::Avoidance(args)) = cli.command else {
            panic!("expected avoidance subcommand");
        };
        assert_eq!(args.m0, Some(8));
        assert_eq!(args.horizon, Some(2));
        assert_eq!(args.spike_threshold, Some(5));
    }

    #[test]
    fn top_level_certificate_options_conflict_with_a_subcommand() {
        for argv in [
            vec!["collatz-cert", "--hash", "avoidance"],
            vec!["collatz-cert", "--m0", "3", "-J", "1", "avoidance", "--m0", "4"],
            vec!["collatz-cert", "--json", "tower"],
        ] {
            let cli = Cli::try_parse_from(argv.iter().copied()).unwrap();
            let err = cli.reject_ignored_args().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ArgumentConflict, "{argv:?}");
        }
    }

    #[test]
    fn global_options_still_combine_with_a_subcommand() {
        let cli = Cli::try_parse_from(["collatz-cert", "--config", "c.toml", "-v", "avoidance"])
            .unwrap()
            .reject_ignored_args()
            .unwrap();
        assert_eq!(cli.global.config.as_deref(), Some("c.toml"));
        assert!(cli.global.verbose);

        let cli = Cli::try_parse_from(["collatz-cert", "--hash", "--m0", "4"])
            .unwrap()
            .reject_ignored_args()
            .unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["collatz-cert", "-v", "-q"]).is_err());
    }
}
