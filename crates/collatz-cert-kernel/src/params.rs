//! Run parameters for the finite checks.
//!
//! Defaults are the base-resolution certificate `(m0, J, K) = (16, 16, 4)`
//! with 16 lifts, gate precision `m = 16`, and tower window `(s0, alpha) =
//! (16, 4)`. Every parameter set is validated before any work starts.

use crate::error::{CertError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_M0: u32 = 16;
pub const DEFAULT_HORIZON: u32 = 16;
pub const DEFAULT_SPIKE_THRESHOLD: u32 = 4;
pub const DEFAULT_LIFT_BITS: u32 = 4;
pub const DEFAULT_GATE_PRECISION: u32 = 16;
pub const DEFAULT_TOWER_S0: u32 = 16;
pub const DEFAULT_TOWER_ALPHA: u32 = 4;

const MAX_M0: u32 = 32;
const MAX_HORIZON: u32 = u8::MAX as u32;
const MAX_SPIKE_THRESHOLD: u32 = 63;
const MAX_LIFT_BITS: u32 = 8;
const MAX_GATE_PRECISION: u32 = 48;
const MAX_TOWER_MODULUS_BITS: u32 = 22;

fn check_range(name: &'static str, value: u32, min: u32, max: u32) -> Result<()> {
    if value < min || value > max {
        return Err(CertError::invalid(
            name,
            u64::from(value),
            format!("must be in {min}..={max}"),
        ));
    }
    Ok(())
}

/// Largest horizon whose orbits stay inside `u64` for every start `x_0 < 2^bits`.
///
/// `x_{j+1} + 1 <= (3/2)(x_j + 1)`, so `x_j + 1 <= (3/2)^j · 2^bits`, and step
/// `j` evaluates `3x_j + 1 < 3(x_j + 1)`.
fn max_horizon_for(bits: u32) -> u32 {
    let limit = 1u128 << 64;
    let mut bound = 1u128 << bits;
    let mut steps = 0;
    while steps < MAX_HORIZON && 3 * bound <= limit {
        bound = (3 * bound).div_ceil(2);
        steps += 1;
    }
    steps
}

/// Parameters of the avoidance-set exhaustion check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct AvoidanceParams {
    /// Base resolution: residues are odd values modulo `2^m0`.
    pub m0: u32,
    /// Horizon `J`: odd steps examined per lift.
    pub horizon: u32,
    /// Spike threshold `K`: a step with `v2(3x + 1) >= K` excludes the residue.
    pub spike_threshold: u32,
    /// Lifts range over `0..2^lift_bits`.
    pub lift_bits: u32,
}

impl Default for AvoidanceParams {
    fn default() -> Self {
        Self {
            m0: DEFAULT_M0,
            horizon: DEFAULT_HORIZON,
            spike_threshold: DEFAULT_SPIKE_THRESHOLD,
            lift_bits: DEFAULT_LIFT_BITS,
        }
    }
}

impl AvoidanceParams {
    pub fn new(m0: u32, horizon: u32, spike_threshold: u32) -> Self {
        Self {
            m0,
            horizon,
            spike_threshold,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_range("m0", self.m0, 1, MAX_M0)?;
        check_range("lift_bits", self.lift_bits, 1, MAX_LIFT_BITS)?;
        check_range("spike_threshold", self.spike_threshold, 1, MAX_SPIKE_THRESHOLD)?;
        check_range(
            "horizon",
            self.horizon,
            1,
            max_horizon_for(self.m0 + self.lift_bits),
        )?;
        Ok(())
    }

    /// Number of odd residues modulo `2^m0`.
    pub fn residue_count(&self) -> u64 {
        1u64 << (self.m0 - 1)
    }

    pub fn lift_count(&self) -> u64 {
        1u64 << self.lift_bits
    }
}

/// Parameters of the gate-cycle exclusion check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct GateCycleParams {
    /// Precision `m`: residues are odd values modulo `2^m`.
    pub m: u32,
    /// Lifts range over `0..2^lift_bits`; `F_m` reduces modulo `2^(m + lift_bits)`.
    pub lift_bits: u32,
}

impl Default for GateCycleParams {
    fn default() -> Self {
        Self {
            m: DEFAULT_GATE_PRECISION,
            lift_bits: DEFAULT_LIFT_BITS,
        }
    }
}

impl GateCycleParams {
    pub fn new(m: u32) -> Self {
        Self {
            m,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_range("m", self.m, 1, MAX_GATE_PRECISION)?;
        check_range("lift_bits", self.lift_bits, 1, MAX_LIFT_BITS)?;
        Ok(())
    }
}

/// Parameters of the truncated tower-graph survival check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct TowerParams {
    /// Base depth scale.
    pub s0: u32,
    /// Extra bits of lift robustness.
    pub alpha: u32,
}

impl Default for TowerParams {
    fn default() -> Self {
        Self {
            s0: DEFAULT_TOWER_S0,
            alpha: DEFAULT_TOWER_ALPHA,
        }
    }
}

impl TowerParams {
    pub fn new(s0: u32, alpha: u32) -> Self {
        Self { s0, alpha }
    }

    pub fn validate(&self) -> Result<()> {
        check_range("s0", self.s0, 1, MAX_TOWER_MODULUS_BITS)?;
        let bits = self.s0.saturating_add(self.alpha);
        if !(2..=MAX_TOWER_MODULUS_BITS).contains(&bits) {
            return Err(CertError::invalid(
                "alpha",
                u64::from(self.alpha),
                format!("s0 + alpha must be in 2..={MAX_TOWER_MODULUS_BITS}"),
            ));
        }
        Ok(())
    }

    /// `q` is kept modulo `2^modulus_bits`.
    pub fn modulus_bits(&self) -> u32 {
        self.s0 + self.alpha
    }
}
