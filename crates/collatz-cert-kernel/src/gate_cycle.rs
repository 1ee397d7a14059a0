//! Gate-cycle exclusion: no eventual cycle of `F_m` reached from the gate
//! set `I_m` contains a gate state.
//!
//! Each gate state's orbit is traced in discovery order (see
//! [`crate::cycle`]); a gate passes when its eventual cycle avoids `I_m`.

use crate::cycle::{EventualCycle, floyd_cycle, trace_eventual_cycle};
use crate::error::{CertError, Result, Verdict};
use crate::fingerprint::{CanonicalEncode, WitnessDigest, WitnessSink, fingerprint};
use crate::lift_state::{LiftState, LiftStateMap};
use crate::params::GateCycleParams;
use serde::{Deserialize, Serialize};

const GATE_RECORD_TAG: u8 = b'G';

/// The traced orbit of one gate state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateOutcome {
    pub gate: LiftState,
    pub transient_len: usize,
    pub cycle: Vec<LiftState>,
    /// Gate states lying on the eventual cycle; empty when the gate passes.
    pub gate_hits: Vec<LiftState>,
    pub verdict: Verdict,
    /// Full discovery-order orbit, kept for the witness stream.
    #[serde(skip)]
    pub orbit: Vec<LiftState>,
}

/// A trajectory length as written in a gate record.
fn record_len(len: usize, gate: LiftState) -> Result<u32> {
    u32::try_from(len).map_err(|_| CertError::ArithmeticOverflow {
        value: len as u64,
        context: format!("trajectory of gate {gate} exceeds the u32 length field"),
    })
}

impl GateOutcome {
    fn from_orbit(
        gate: LiftState,
        orbit: EventualCycle<LiftState>,
        map: &LiftStateMap,
    ) -> Result<Self> {
        record_len(orbit.visited.len(), gate)?;
        let gate_hits: Vec<LiftState> = orbit
            .cycle()
            .iter()
            .copied()
            .filter(|s| map.is_gate(*s))
            .collect();
        Ok(Self {
            gate,
            transient_len: orbit.cycle_start,
            cycle: orbit.cycle().to_vec(),
            verdict: Verdict::from_pass(gate_hits.is_empty()),
            gate_hits,
            orbit: orbit.visited,
        })
    }

    pub fn trajectory_len(&self) -> usize {
        self.orbit.len()
    }
}

/// Gate record: `'G' | gate | len: u32 | cycle_start: u32 | states...`.
///
/// `from_orbit` rejects trajectories longer than `u32::MAX`, and the cycle
/// start never exceeds the trajectory length.
impl CanonicalEncode for GateOutcome {
    fn encode(&self, sink: &mut dyn WitnessSink) {
        fn put_state(sink: &mut dyn WitnessSink, state: &LiftState) {
            sink.put_u64(state.residue);
            // lift_bits <= 8
            sink.put_u8(state.lift as u8);
        }
        sink.put_u8(GATE_RECORD_TAG);
        put_state(sink, &self.gate);
        sink.put_u32(self.orbit.len() as u32);
        sink.put_u32(self.transient_len as u32);
        for state in &self.orbit {
            put_state(sink, state);
        }
    }
}

impl CanonicalEncode for [GateOutcome] {
    fn encode(&self, sink: &mut dyn WitnessSink) {
        for outcome in self {
            outcome.encode(sink);
        }
    }
}

/// Result of the gate-cycle exclusion check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateCycleReport {
    pub params: GateCycleParams,
    pub gate_count: usize,
    pub outcomes: Vec<GateOutcome>,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<WitnessDigest>,
}

impl GateCycleReport {
    pub fn failing_gates(&self) -> impl Iterator<Item = &GateOutcome> {
        self.outcomes.iter().filter(|o| !o.verdict.is_pass())
    }
}

/// Trace every gate state of `I_m` and decide exclusion.
pub fn run_gate_cycle_check(params: &GateCycleParams, hash: bool) -> Result<GateCycleReport> {
    let map = LiftStateMap::new(params)?;
    let gates = map.gate_states();
    tracing::debug!(
        m = params.m,
        lift_bits = params.lift_bits,
        gates = gates.len(),
        "gate-cycle check started"
    );

    let mut outcomes = Vec::with_capacity(gates.len());
    for gate in gates {
        let orbit = trace_eventual_cycle(&map, gate)?;
        let outcome = GateOutcome::from_orbit(gate, orbit, &map)?;
        check_floyd(&map, &outcome)?;
        tracing::trace!(
            %gate,
            transient = outcome.transient_len,
            cycle = outcome.cycle.len(),
            "gate orbit traced"
        );
        if !outcome.verdict.is_pass() {
            tracing::warn!(%gate, hits = outcome.gate_hits.len(), "eventual cycle re-enters the gate");
        }
        outcomes.push(outcome);
    }

    let verdict = Verdict::from_pass(outcomes.iter().all(|o| o.verdict.is_pass()));
    let fingerprint = hash.then(|| fingerprint(outcomes.as_slice()));
    tracing::debug!(%verdict, "gate-cycle check finished");

    Ok(GateCycleReport {
        params: *params,
        gate_count: outcomes.len(),
        outcomes,
        verdict,
        fingerprint,
    })
}

/// Re-derive the gate's `(μ, λ)` with Floyd's algorithm; a disagreement
/// with the traced orbit is an internal error.
fn check_floyd(map: &LiftStateMap, outcome: &GateOutcome) -> Result<()> {
    let (floyd_mu, floyd_lambda) = floyd_cycle(map, outcome.gate)?;
    if (floyd_mu, floyd_lambda) == (outcome.transient_len, outcome.cycle.len()) {
        return Ok(());
    }
    Err(CertError::CycleMismatch {
        residue: outcome.gate.residue,
        lift: outcome.gate.lift,
        traced_mu: outcome.transient_len,
        traced_lambda: outcome.cycle.len(),
        floyd_mu,
        floyd_lambda,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_precision_gates_fall_into_the_fixed_point() {
        let report = run_gate_cycle_check(&GateCycleParams::new(3), true).unwrap();
        assert_eq!(report.gate_count, 8);
        assert_eq!(report.verdict, Verdict::Pass);
        let lens: Vec<usize> = report.outcomes.iter().map(|o| o.trajectory_len()).collect();
        assert_eq!(lens, vec![6, 13, 12, 8, 10, 7, 13, 9]);
        for outcome in &report.outcomes {
            assert_eq!(outcome.cycle, vec![LiftState::new(1, 0)]);
            assert!(outcome.gate_hits.is_empty());
        }
        assert_eq!(
            report.fingerprint.unwrap().as_str(),
            "c7d8fd9098df8800c3d921b12efc68ed2bf172dbe4b2168311b96d0d2d8eee62"
        );
    }

    #[test]
    fn floyd_cross_check_is_clean() {
        let params = GateCycleParams::new(5);
        let report = run_gate_cycle_check(&params, false).unwrap();
        assert!(report.fingerprint.is_none());
        let map = LiftStateMap::new(&params).unwrap();
        for outcome in &report.outcomes {
            check_floyd(&map, outcome).unwrap();
        }
    }

    #[test]
    fn floyd_disagreement_is_an_error() {
        let params = GateCycleParams::new(3);
        let report = run_gate_cycle_check(&params, false).unwrap();
        let map = LiftStateMap::new(&params).unwrap();
        let mut outcome = report.outcomes[0].clone();
        outcome.transient_len += 1;
        let err = check_floyd(&map, &outcome).unwrap_err();
        assert_eq!(
            err,
            CertError::CycleMismatch {
                residue: 7,
                lift: 1,
                traced_mu: 6,
                traced_lambda: 1,
                floyd_mu: 5,
                floyd_lambda: 1,
            }
        );
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn trajectory_longer_than_the_length_field_is_rejected() {
        let gate = LiftState::new(7, 1);
        assert_eq!(record_len(u32::MAX as usize, gate).unwrap(), u32::MAX);
        let err = record_len(u32::MAX as usize + 1, gate).unwrap_err();
        assert!(matches!(
            err,
            CertError::ArithmeticOverflow { value, .. } if value == 1 << 32
        ));
    }

    #[test]
    fn cycle_through_a_gate_fails() {
        let map = LiftStateMap::new(&GateCycleParams::new(2)).unwrap();
        let gate = LiftState::new(3, 1);
        let orbit = EventualCycle {
            visited: vec![gate, LiftState::new(1, 0)],
            cycle_start: 0,
        };
        let outcome = GateOutcome::from_orbit(gate, orbit, &map).unwrap();
        assert_eq!(outcome.verdict, Verdict::Fail);
        assert_eq!(outcome.gate_hits, vec![gate]);
    }

    #[test]
    fn altering_one_orbit_state_changes_the_fingerprint() {
        let report = run_gate_cycle_check(&GateCycleParams::new(4), true).unwrap();
        let mut outcomes = report.outcomes.clone();
        assert_eq!(fingerprint(outcomes.as_slice()), report.fingerprint.clone().unwrap());
        outcomes[3].orbit[1].lift ^= 1;
        assert_ne!(fingerprint(outcomes.as_slice()), report.fingerprint.unwrap());
    }
}
