//! The finite certificate: every requested check, one verdict.

use crate::avoidance::{AvoidanceOptions, AvoidanceReport, run_avoidance_check};
use crate::error::{Result, Verdict};
use crate::gate_cycle::{GateCycleReport, run_gate_cycle_check};
use crate::params::{AvoidanceParams, GateCycleParams, TowerParams};
use crate::tower::{TowerReport, run_tower_check};
use serde::{Deserialize, Serialize};

/// Parameters for a certificate run. The tower check runs only when
/// `tower` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CertificateParams {
    pub avoidance: AvoidanceParams,
    pub gate_cycle: GateCycleParams,
    pub tower: Option<TowerParams>,
}

impl CertificateParams {
    pub fn validate(&self) -> Result<()> {
        self.avoidance.validate()?;
        self.gate_cycle.validate()?;
        if let Some(tower) = &self.tower {
            tower.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateReport {
    pub avoidance: AvoidanceReport,
    pub gate_cycle: GateCycleReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tower: Option<TowerReport>,
    pub verdict: Verdict,
}

/// Run the certificate. All parameters are validated before any check
/// starts.
pub fn run_certificate(
    params: &CertificateParams,
    avoidance_options: &AvoidanceOptions,
) -> Result<CertificateReport> {
    params.validate()?;

    let avoidance = run_avoidance_check(&params.avoidance, avoidance_options)?;
    let gate_cycle = run_gate_cycle_check(&params.gate_cycle, avoidance_options.fingerprint)?;
    let tower = params.tower.as_ref().map(run_tower_check).transpose()?;

    let mut verdict = avoidance.verdict.and(gate_cycle.verdict);
    if let Some(tower) = &tower {
        verdict = verdict.and(tower.verdict);
    }
    tracing::info!(%verdict, "certificate decided");

    Ok(CertificateReport {
        avoidance,
        gate_cycle,
        tower,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CertError;

    #[test]
    fn small_certificate_passes_with_both_fingerprints() {
        let params = CertificateParams {
            avoidance: AvoidanceParams::new(4, 16, 4),
            gate_cycle: GateCycleParams::new(3),
            tower: Some(TowerParams::new(4, 2)),
        };
        let report =
            run_certificate(&params, &AvoidanceOptions::default().with_fingerprint()).unwrap();
        assert_eq!(report.verdict, Verdict::Pass);
        assert!(report.avoidance.fingerprint.is_some());
        assert!(report.gate_cycle.fingerprint.is_some());
        assert!(report.tower.is_some());
    }

    #[test]
    fn one_failing_check_fails_the_certificate() {
        let params = CertificateParams {
            avoidance: AvoidanceParams::new(8, 2, 4),
            gate_cycle: GateCycleParams::new(3),
            tower: None,
        };
        let report = run_certificate(&params, &AvoidanceOptions::default()).unwrap();
        assert_eq!(report.gate_cycle.verdict, Verdict::Pass);
        assert_eq!(report.verdict, Verdict::Fail);
        assert!(report.tower.is_none());
    }

    #[test]
    fn bad_tower_parameters_are_caught_up_front() {
        let params = CertificateParams {
            tower: Some(TowerParams::new(30, 0)),
            ..CertificateParams::default()
        };
        let err = run_certificate(&params, &AvoidanceOptions::default()).unwrap_err();
        assert!(matches!(err, CertError::InvalidParameter { name: "s0", .. }));
    }
}
