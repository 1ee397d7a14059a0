//! Avoidance-set exhaustion: `A_{m0} = ∅`.
//!
//! `A_{m0}` is the set of odd residues `r mod 2^m0` such that for every lift
//! `ℓ` and every step `j < J`, the odd Collatz orbit of `x_0 = r + ℓ·2^m0`
//! has `v2(3x_j + 1) < K`. The certificate holds when every residue has a
//! spike witness `(ℓ, j, b)` with `b >= K`.
//!
//! Residues are scanned in ascending order, lifts ascending within a
//! residue, steps ascending within a lift. The witness recorded for a
//! residue is the first spike in that order; the fingerprint hashes those
//! witnesses in residue order.

use crate::dynamics::odd_step;
use crate::error::{CertError, Result, Verdict};
use crate::fingerprint::{CanonicalEncode, StreamHasher, WitnessDigest, WitnessSink};
use crate::params::AvoidanceParams;
use serde::{Deserialize, Serialize};

/// A spike observed on the orbit of `r + lift·2^m0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpikeWitness {
    pub residue: u64,
    pub lift: u8,
    /// Step index `j` at which the spike fires.
    pub step: u8,
    /// `v2(3x_j + 1)`.
    pub valuation: u8,
}

/// Width of the residue field in an avoidance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidueWidth {
    U16,
    U32,
}

impl ResidueWidth {
    pub fn for_m0(m0: u32) -> Self {
        if m0 <= 16 { Self::U16 } else { Self::U32 }
    }
}

/// One avoidance record: `residue | lift | step | valuation`, little-endian.
#[derive(Debug, Clone, Copy)]
pub struct AvoidanceRecord {
    pub witness: SpikeWitness,
    pub width: ResidueWidth,
}

impl CanonicalEncode for AvoidanceRecord {
    fn encode(&self, sink: &mut dyn WitnessSink) {
        // Residues are below 2^m0, so the narrowing is exact for the width
        // picked by `ResidueWidth::for_m0`.
        match self.width {
            ResidueWidth::U16 => sink.put_u16(self.witness.residue as u16),
            ResidueWidth::U32 => sink.put_u32(self.witness.residue as u32),
        }
        sink.put_u8(self.witness.lift);
        sink.put_u8(self.witness.step);
        sink.put_u8(self.witness.valuation);
    }
}

/// A complete avoidance witness stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvoidanceStream {
    pub m0: u32,
    pub witnesses: Vec<SpikeWitness>,
}

impl CanonicalEncode for AvoidanceStream {
    fn encode(&self, sink: &mut dyn WitnessSink) {
        let width = ResidueWidth::for_m0(self.m0);
        for witness in &self.witnesses {
            AvoidanceRecord {
                witness: *witness,
                width,
            }
            .encode(sink);
        }
    }
}

/// How a run is carried out and what it keeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvoidanceOptions {
    /// Hash the witness stream while scanning.
    pub fingerprint: bool,
    /// Stop at the first survivor.
    pub fail_fast: bool,
    /// Keep at most this many witnesses (in scan order) in the report.
    pub retain_witnesses: usize,
}

impl AvoidanceOptions {
    pub fn with_fingerprint(mut self) -> Self {
        self.fingerprint = true;
        self
    }

    pub fn retain_all(mut self) -> Self {
        self.retain_witnesses = usize::MAX;
        self
    }
}

/// Classification of one residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueScan {
    /// First spike in lift-major order, `None` for a survivor.
    pub witness: Option<SpikeWitness>,
    /// Spike with the smallest step over all lifts (smallest lift on ties).
    pub best: Option<SpikeWitness>,
}

impl ResidueScan {
    pub fn is_survivor(&self) -> bool {
        self.witness.is_none()
    }
}

/// Result of the exhaustion check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvoidanceReport {
    pub params: AvoidanceParams,
    pub residues_checked: u64,
    pub witnesses_found: u64,
    pub survivors: Vec<u64>,
    /// Largest best-hit step over all residues, and the first residue
    /// attaining it.
    pub hardest: Option<SpikeWitness>,
    pub halted_early: bool,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub witnesses: Vec<SpikeWitness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<WitnessDigest>,
}

impl AvoidanceReport {
    pub fn survivor_count(&self) -> usize {
        self.survivors.len()
    }
}

/// First step `j < horizon` on the orbit of `x0` with `v2(3x_j + 1) >= threshold`.
fn first_spike(x0: u64, horizon: u32, threshold: u32) -> Result<Option<(u8, u8)>> {
    let mut x = x0;
    for j in 0..horizon {
        let step = odd_step(x)?;
        if step.valuation >= threshold {
            // horizon <= 255 and valuations of u64 values are < 64.
            return Ok(Some((j as u8, step.valuation as u8)));
        }
        x = step.next;
    }
    Ok(None)
}

/// Scan every lift of odd residue `r` for spikes.
pub fn scan_residue(r: u64, params: &AvoidanceParams) -> Result<ResidueScan> {
    if r & 1 == 0 || r >> params.m0 != 0 {
        return Err(CertError::DomainViolation {
            residue: r,
            lift: 0,
            reason: format!("residue must be odd and below 2^{}", params.m0),
        });
    }

    let mut witness = None;
    let mut best: Option<SpikeWitness> = None;
    for lift in 0..params.lift_count() {
        let x0 = (lift << params.m0) | r;
        let Some((step, valuation)) = first_spike(x0, params.horizon, params.spike_threshold)
            .map_err(|err| match err {
                CertError::ArithmeticOverflow { value, context } => {
                    CertError::ArithmeticOverflow {
                        value,
                        context: format!("{context} on orbit of r={r}, lift={lift}"),
                    }
                }
                other => other,
            })?
        else {
            continue;
        };
        let hit = SpikeWitness {
            residue: r,
            lift: lift as u8,
            step,
            valuation,
        };
        if witness.is_none() {
            witness = Some(hit);
        }
        if best.is_none_or(|b| hit.step < b.step) {
            best = Some(hit);
        }
        if step == 0 {
            break;
        }
    }
    Ok(ResidueScan { witness, best })
}

/// Exhaustively check every odd residue modulo `2^m0`.
pub fn run_avoidance_check(
    params: &AvoidanceParams,
    options: &AvoidanceOptions,
) -> Result<AvoidanceReport> {
    params.validate()?;
    tracing::debug!(
        m0 = params.m0,
        horizon = params.horizon,
        spike_threshold = params.spike_threshold,
        lifts = params.lift_count(),
        "avoidance check started"
    );

    let width = ResidueWidth::for_m0(params.m0);
    let mut hasher = options.fingerprint.then(StreamHasher::new);
    let mut residues_checked = 0u64;
    let mut witnesses_found = 0u64;
    let mut survivors = Vec::new();
    let mut witnesses = Vec::new();
    let mut hardest: Option<SpikeWitness> = None;
    let mut halted_early = false;

    let modulus = 1u64 << params.m0;
    for r in (1..modulus).step_by(2) {
        residues_checked += 1;
        let scan = scan_residue(r, params)?;

        let Some(witness) = scan.witness else {
            tracing::debug!(residue = r, "survivor");
            survivors.push(r);
            if options.fail_fast {
                halted_early = true;
                break;
            }
            continue;
        };

        witnesses_found += 1;
        if let Some(hasher) = hasher.as_mut() {
            AvoidanceRecord { witness, width }.encode(hasher);
        }
        if witnesses.len() < options.retain_witnesses {
            witnesses.push(witness);
        }
        if let Some(best) = scan.best
            && hardest.is_none_or(|h| best.step > h.step)
        {
            hardest = Some(best);
        }
    }

    let verdict = Verdict::from_pass(survivors.is_empty() && !halted_early);
    if verdict.is_pass() {
        tracing::debug!(residues_checked, witnesses_found, "avoidance check passed");
    } else {
        tracing::warn!(
            residues_checked,
            survivors = survivors.len(),
            halted_early,
            "avoidance set is non-empty"
        );
    }

    Ok(AvoidanceReport {
        params: *params,
        residues_checked,
        witnesses_found,
        survivors,
        hardest,
        halted_early,
        verdict,
        witnesses,
        fingerprint: hasher.map(StreamHasher::finish),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{canonical_bytes, fingerprint};

    #[test]
    fn single_residue_boundary() {
        let params = AvoidanceParams::new(1, 16, 4);
        let report = run_avoidance_check(&params, &AvoidanceOptions::default().retain_all())
            .unwrap();
        assert_eq!(report.residues_checked, 1);
        assert!(report.survivors.is_empty());
        assert_eq!(report.verdict, Verdict::Pass);
        // Lift 0 sits on the fixed point 1 (b = 2 forever); lift 1 reaches
        // 5 after one step and 3*5 + 1 = 16.
        assert_eq!(
            report.witnesses,
            vec![SpikeWitness {
                residue: 1,
                lift: 1,
                step: 1,
                valuation: 4
            }]
        );
        assert_eq!(
            report.hardest,
            Some(SpikeWitness {
                residue: 1,
                lift: 2,
                step: 0,
                valuation: 4
            })
        );
    }

    #[test]
    fn scan_keeps_first_witness_and_best_hit_apart() {
        let params = AvoidanceParams::new(3, 16, 4);
        let scan = scan_residue(7, &params).unwrap();
        assert_eq!(
            scan.witness,
            Some(SpikeWitness {
                residue: 7,
                lift: 0,
                step: 4,
                valuation: 4
            })
        );
        assert_eq!(scan.best.map(|b| b.step), Some(2));
        assert!(!scan.is_survivor());
    }

    #[test]
    fn short_horizon_leaves_survivors() {
        let params = AvoidanceParams::new(8, 2, 4);
        let report = run_avoidance_check(&params, &AvoidanceOptions::default()).unwrap();
        assert_eq!(report.residues_checked, 128);
        assert_eq!(report.survivor_count(), 98);
        assert_eq!(&report.survivors[..5], &[1, 7, 9, 11, 15]);
        assert_eq!(report.witnesses_found, 30);
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn fail_fast_stops_at_first_survivor() {
        let params = AvoidanceParams::new(8, 2, 4);
        let options = AvoidanceOptions {
            fail_fast: true,
            ..AvoidanceOptions::default()
        };
        let report = run_avoidance_check(&params, &options).unwrap();
        assert!(report.halted_early);
        assert_eq!(report.survivors, vec![1]);
        assert_eq!(report.residues_checked, 1);
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn streamed_fingerprint_matches_offline_stream() {
        let params = AvoidanceParams::new(4, 16, 4);
        let options = AvoidanceOptions::default().with_fingerprint().retain_all();
        let report = run_avoidance_check(&params, &options).unwrap();
        let stream = AvoidanceStream {
            m0: params.m0,
            witnesses: report.witnesses.clone(),
        };
        assert_eq!(report.fingerprint, Some(fingerprint(&stream)));
        assert_eq!(
            report.fingerprint.unwrap().as_str(),
            "6610c91b4b4f682a08687e535b39c972459db0fc92f7bda27199f26d81f39133"
        );
    }

    #[test]
    fn record_layout_widens_past_sixteen_bits() {
        let witness = SpikeWitness {
            residue: 0x0001_0203,
            lift: 4,
            step: 5,
            valuation: 6,
        };
        let narrow = AvoidanceStream {
            m0: 16,
            witnesses: vec![SpikeWitness {
                residue: 0x0203,
                ..witness
            }],
        };
        let wide = AvoidanceStream {
            m0: 17,
            witnesses: vec![witness],
        };
        assert_eq!(canonical_bytes(&narrow), vec![0x03, 0x02, 4, 5, 6]);
        assert_eq!(canonical_bytes(&wide), vec![0x03, 0x02, 0x01, 0x00, 4, 5, 6]);
    }

    #[test]
    fn widest_admissible_orbits_fit_in_u64() {
        // 2^40 - 1 only halves once per step, the fastest-growing start.
        let params = AvoidanceParams {
            m0: 32,
            horizon: 39,
            spike_threshold: 63,
            lift_bits: 8,
        };
        params.validate().unwrap();
        let scan = scan_residue(u64::from(u32::MAX), &params).unwrap();
        assert!(scan.is_survivor());
    }

    #[test]
    fn even_residue_is_a_domain_violation() {
        let params = AvoidanceParams::default();
        let err = scan_residue(4, &params).unwrap_err();
        assert!(matches!(err, CertError::DomainViolation { residue: 4, .. }));
    }

    #[test]
    fn invalid_parameters_fail_before_scanning() {
        let params = AvoidanceParams::new(0, 16, 4);
        let err = run_avoidance_check(&params, &AvoidanceOptions::default()).unwrap_err();
        assert!(matches!(err, CertError::InvalidParameter { name: "m0", .. }));
    }
}
