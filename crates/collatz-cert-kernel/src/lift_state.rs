//! Lift states and the lift-state map `F_m`.
//!
//! A lift state `(r, ℓ)` stands for the integer `x = r + ℓ·2^m` with `r` odd
//! below `2^m` and `ℓ < 2^lift_bits`. `F_m` applies the odd Collatz map to
//! `x`, reduces the result modulo `2^(m + lift_bits)` and splits it back
//! into a residue and a lift. The state space `V_m` is finite and `F_m` is
//! total on it, so every orbit is eventually periodic.

use crate::dynamics::odd_step;
use crate::error::{CertError, Result};
use crate::params::GateCycleParams;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A residue together with its lift label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LiftState {
    pub residue: u64,
    pub lift: u64,
}

impl LiftState {
    pub const fn new(residue: u64, lift: u64) -> Self {
        Self { residue, lift }
    }
}

impl fmt::Display for LiftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.residue, self.lift)
    }
}

/// A deterministic map on a finite state space.
///
/// Cycle detection is written against this trait so it can run on `F_m`
/// and on small hand-built maps alike.
pub trait TransitionMap {
    type State: Copy + Ord + fmt::Debug;

    /// The image of `state`. Errors when `state` or its image falls outside
    /// the state space.
    fn step(&self, state: Self::State) -> Result<Self::State>;
}

/// The lift-state map `F_m`.
#[derive(Debug, Clone, Copy)]
pub struct LiftStateMap {
    m: u32,
    lift_bits: u32,
}

impl LiftStateMap {
    pub fn new(params: &GateCycleParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            m: params.m,
            lift_bits: params.lift_bits,
        })
    }

    fn residue_mask(&self) -> u64 {
        (1u64 << self.m) - 1
    }

    fn lift_count(&self) -> u64 {
        1u64 << self.lift_bits
    }

    /// Number of states in `V_m`.
    pub fn state_count(&self) -> u64 {
        (1u64 << (self.m - 1)) << self.lift_bits
    }

    pub fn contains(&self, state: LiftState) -> bool {
        state.residue & 1 == 1
            && state.residue <= self.residue_mask()
            && state.lift < self.lift_count()
    }

    fn check_domain(&self, state: LiftState) -> Result<()> {
        if self.contains(state) {
            return Ok(());
        }
        let reason = if state.residue & 1 == 0 {
            "residue is even".to_string()
        } else if state.residue > self.residue_mask() {
            format!("residue exceeds 2^{}", self.m)
        } else {
            format!("lift exceeds 2^{}", self.lift_bits)
        };
        Err(CertError::DomainViolation {
            residue: state.residue,
            lift: state.lift,
            reason,
        })
    }

    /// The integer `r + ℓ·2^m` a state stands for.
    pub fn integer(&self, state: LiftState) -> u64 {
        (state.lift << self.m) | state.residue
    }

    /// Split an integer below `2^(m + lift_bits)` into a state.
    pub fn split(&self, x: u64) -> LiftState {
        LiftState {
            residue: x & self.residue_mask(),
            lift: x >> self.m,
        }
    }

    /// The gate set `I_m = {(2^m − 1, ℓ) : ℓ odd}`, ascending by lift.
    pub fn gate_states(&self) -> Vec<LiftState> {
        let residue = self.residue_mask();
        (1..self.lift_count())
            .step_by(2)
            .map(|lift| LiftState { residue, lift })
            .collect()
    }

    /// Whether `state` lies in `I_m`, i.e. `x ≡ −1 (mod 2^(m+1))`.
    pub fn is_gate(&self, state: LiftState) -> bool {
        state.residue == self.residue_mask() && state.lift & 1 == 1
    }
}

impl TransitionMap for LiftStateMap {
    type State = LiftState;

    fn step(&self, state: LiftState) -> Result<LiftState> {
        self.check_domain(state)?;
        let next = odd_step(self.integer(state))?.next;
        let reduced = next & ((1u64 << (self.m + self.lift_bits)) - 1);
        let image = self.split(reduced);
        self.check_domain(image)?;
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(m: u32) -> LiftStateMap {
        LiftStateMap::new(&GateCycleParams::new(m)).unwrap()
    }

    #[test]
    fn gate_set_has_eight_states_at_four_lift_bits() {
        let f = map(16);
        let gates = f.gate_states();
        assert_eq!(gates.len(), 8);
        assert_eq!(gates[0], LiftState::new(65_535, 1));
        assert_eq!(gates[7], LiftState::new(65_535, 15));
        for gate in &gates {
            assert!(f.is_gate(*gate));
            // x ≡ −1 (mod 2^17)
            assert_eq!((f.integer(*gate) + 1) % (1 << 17), 0);
        }
        assert!(!f.is_gate(LiftState::new(65_535, 0)));
    }

    #[test]
    fn fixed_point_at_one() {
        let f = map(16);
        let one = LiftState::new(1, 0);
        assert_eq!(f.step(one).unwrap(), one);
    }

    #[test]
    fn step_reduces_modulo_full_width() {
        let f = map(4);
        // x = 15 + 1·16 = 31, 3·31 + 1 = 94, U = 47 = 15 + 2·16.
        let image = f.step(LiftState::new(15, 1)).unwrap();
        assert_eq!(image, LiftState::new(15, 2));
        // x = 15 + 15·16 = 255, 3·255 + 1 = 766, U = 383 ≡ 127 (mod 256).
        let image = f.step(LiftState::new(15, 15)).unwrap();
        assert_eq!(image, LiftState::new(15, 7));
    }

    #[test]
    fn states_outside_the_space_are_rejected() {
        let f = map(4);
        let err = f.step(LiftState::new(2, 0)).unwrap_err();
        assert!(matches!(err, CertError::DomainViolation { residue: 2, .. }));
        let err = f.step(LiftState::new(3, 16)).unwrap_err();
        assert!(matches!(err, CertError::DomainViolation { lift: 16, .. }));
        let err = f.step(LiftState::new(17, 0)).unwrap_err();
        assert!(matches!(err, CertError::DomainViolation { residue: 17, .. }));
    }

    #[test]
    fn state_count_covers_odd_residues_and_lifts() {
        assert_eq!(map(16).state_count(), 32_768 * 16);
        assert_eq!(map(1).state_count(), 16);
    }
}
