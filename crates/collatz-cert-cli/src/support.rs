use collatz_cert_kernel::{AvoidanceParams, CertError, GateCycleParams, TowerParams, Verdict};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Exit status for a falsified certificate.
pub const EXIT_REJECTED: i32 = 1;
/// Exit status for parameter, configuration and computation errors.
pub const EXIT_ERROR: i32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Cert(#[from] CertError),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parameter tables read from `--config`. Missing tables and keys fall back
/// to the built-in defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub avoidance: AvoidanceParams,
    pub gate_cycle: GateCycleParams,
    pub tower: TowerParams,
}

impl ConfigFile {
    pub fn parse(text: &str, path: &Path) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }
}

pub fn load_config_or_exit(path: Option<&str>) -> ConfigFile {
    let Some(path) = path else {
        return ConfigFile::default();
    };
    let config = ConfigFile::load(Path::new(path)).unwrap_or_else(|e| fail(e));
    tracing::debug!(path, ?config, "config loaded");
    config
}

/// Explicit flags win over config values.
pub fn merge_avoidance(
    base: AvoidanceParams,
    m0: Option<u32>,
    horizon: Option<u32>,
    spike_threshold: Option<u32>,
    lift_bits: Option<u32>,
) -> AvoidanceParams {
    AvoidanceParams {
        m0: m0.unwrap_or(base.m0),
        horizon: horizon.unwrap_or(base.horizon),
        spike_threshold: spike_threshold.unwrap_or(base.spike_threshold),
        lift_bits: lift_bits.unwrap_or(base.lift_bits),
    }
}

pub fn merge_gate_cycle(
    base: GateCycleParams,
    m: Option<u32>,
    lift_bits: Option<u32>,
) -> GateCycleParams {
    GateCycleParams {
        m: m.unwrap_or(base.m),
        lift_bits: lift_bits.unwrap_or(base.lift_bits),
    }
}

pub fn merge_tower(base: TowerParams, s0: Option<u32>, alpha: Option<u32>) -> TowerParams {
    TowerParams {
        s0: s0.unwrap_or(base.s0),
        alpha: alpha.unwrap_or(base.alpha),
    }
}

/// Logging goes to stderr so stdout stays parseable under `--json`.
pub fn init_tracing(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

pub fn fail(err: impl Into<CliError>) -> ! {
    eprintln!("error: {}", err.into());
    std::process::exit(EXIT_ERROR);
}

pub fn or_exit<T>(result: Result<T, CertError>) -> T {
    result.unwrap_or_else(|e| fail(e))
}

pub fn print_json_or_exit<T: Serialize>(value: &T) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e));
    println!("{rendered}");
}

pub fn exit_with_verdict(verdict: Verdict) {
    if !verdict.is_pass() {
        std::process::exit(EXIT_REJECTED);
    }
}
