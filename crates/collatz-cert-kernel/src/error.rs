//! Error types for certificate computations.
//!
//! A falsified certificate is not an error: survivors and gate re-entries
//! are reported through [`Verdict::Fail`] inside the check reports. Errors
//! are reserved for bad parameters and for arithmetic the dynamics cannot
//! carry out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that abort a verification run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertError {
    /// A run parameter is outside its admissible range.
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: u64,
        reason: String,
    },

    /// An intermediate value no longer fits the machine word.
    #[error("arithmetic overflow at x={value} ({context})")]
    ArithmeticOverflow { value: u64, context: String },

    /// The odd Collatz map was asked to step a value it is not defined on.
    #[error("odd step undefined at x={value}: {reason}")]
    NotOdd { value: u64, reason: String },

    /// A transition produced a state outside the finite state space.
    #[error("state ({residue}, {lift}) outside the state space: {reason}")]
    DomainViolation {
        residue: u64,
        lift: u64,
        reason: String,
    },

    /// Floyd's detector and the discovery-order trace disagree on an orbit.
    #[error(
        "cycle detectors disagree from ({residue}, {lift}): traced (μ={traced_mu}, λ={traced_lambda}), Floyd (μ={floyd_mu}, λ={floyd_lambda})"
    )]
    CycleMismatch {
        residue: u64,
        lift: u64,
        traced_mu: usize,
        traced_lambda: usize,
        floyd_mu: usize,
        floyd_lambda: usize,
    },
}

impl CertError {
    pub(crate) fn invalid(name: &'static str, value: u64, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CertError>;

/// Outcome of a finite check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn from_pass(pass: bool) -> Self {
        if pass { Self::Pass } else { Self::Fail }
    }

    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }

    /// Conjunction of two verdicts.
    pub fn and(self, other: Verdict) -> Self {
        Self::from_pass(self.is_pass() && other.is_pass())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}
