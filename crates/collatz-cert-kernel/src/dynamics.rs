//! The odd Collatz map `U(x) = (3x + 1) / 2^{v2(3x + 1)}`.
//!
//! Every check in this crate is built from this one step. Arithmetic is
//! checked: an overflowing trajectory is reported, never wrapped.

use crate::error::{CertError, Result};

/// 2-adic valuation of `n`. `n` must be non-zero.
pub fn v2(n: u64) -> u32 {
    debug_assert!(n != 0, "v2 is undefined at zero");
    n.trailing_zeros()
}

/// One application of the odd Collatz map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OddStep {
    /// `U(x)`, always odd.
    pub next: u64,
    /// `v2(3x + 1)`, the number of halvings taken.
    pub valuation: u32,
}

/// Compute `U(x)` together with `v2(3x + 1)`.
pub fn odd_step(x: u64) -> Result<OddStep> {
    if x & 1 == 0 {
        return Err(CertError::NotOdd {
            value: x,
            reason: "input must be odd".to_string(),
        });
    }
    let t = x
        .checked_mul(3)
        .and_then(|t| t.checked_add(1))
        .ok_or_else(|| CertError::ArithmeticOverflow {
            value: x,
            context: "3x + 1".to_string(),
        })?;
    let valuation = v2(t);
    Ok(OddStep {
        next: t >> valuation,
        valuation,
    })
}
