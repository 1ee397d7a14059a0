//! # Collatz certificate kernel
//!
//! Exhaustive, deterministic checks of the finite predicates in the
//! reduction of the Collatz conjecture, at fixed precision.
//!
//! ## Architecture
//!
//! ```text
//! dynamics        ← odd Collatz step U(x), 2-adic valuation
//!     │
//! avoidance       ← A_{m0} exhaustion over residues × lifts × horizon
//!     │
//! lift_state      ← V_m, the lift-state map F_m, the gate set I_m
//!     │
//! cycle           ← eventual-cycle detection (discovery order, Floyd)
//!     │
//! gate_cycle      ← no eventual cycle from I_m re-enters I_m
//!     │
//! tower           ← truncated (T, q) tower graph, dead-end pruning
//!     │
//! fingerprint     ← canonical witness encoding + SHA-256
//!     │
//! certificate     ← all checks, one verdict
//! ```
//!
//! A falsified predicate is a [`Verdict::Fail`] inside a report; only bad
//! parameters and impossible arithmetic are [`CertError`]s.

pub mod avoidance;
pub mod certificate;
pub mod cycle;
pub mod dynamics;
pub mod error;
pub mod fingerprint;
pub mod gate_cycle;
pub mod lift_state;
pub mod params;
pub mod tower;

pub use avoidance::{
    AvoidanceOptions, AvoidanceReport, AvoidanceStream, SpikeWitness, run_avoidance_check,
};
pub use certificate::{CertificateParams, CertificateReport, run_certificate};
pub use cycle::{EventualCycle, floyd_cycle, trace_eventual_cycle};
pub use error::{CertError, Verdict};
pub use fingerprint::{WitnessDigest, canonical_bytes, fingerprint};
pub use gate_cycle::{GateCycleReport, GateOutcome, run_gate_cycle_check};
pub use lift_state::{LiftState, LiftStateMap, TransitionMap};
pub use params::{AvoidanceParams, GateCycleParams, TowerParams};
pub use tower::{TowerReport, run_tower_check};
