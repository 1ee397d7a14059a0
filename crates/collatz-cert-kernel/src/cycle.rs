//! Eventual-cycle detection for deterministic maps on finite state spaces.
//!
//! [`trace_eventual_cycle`] records every state in discovery order. The
//! first state seen twice closes the orbit: the states from its discovery
//! index onward form the eventual cycle, the states before it the
//! transient. [`floyd_cycle`] computes the same `(μ, λ)` shape in constant
//! memory and is used as an independent cross-check.

use crate::error::Result;
use crate::lift_state::TransitionMap;
use std::collections::BTreeMap;

/// The orbit of a start state, split into transient and cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventualCycle<S> {
    /// Every distinct state in discovery order; `visited[0]` is the start.
    pub visited: Vec<S>,
    /// Discovery index of the first cycle state (`μ`).
    pub cycle_start: usize,
}

impl<S> EventualCycle<S> {
    pub fn transient(&self) -> &[S] {
        &self.visited[..self.cycle_start]
    }

    pub fn cycle(&self) -> &[S] {
        &self.visited[self.cycle_start..]
    }

    /// `(μ, λ)`: transient length and cycle length.
    pub fn shape(&self) -> (usize, usize) {
        (self.cycle_start, self.visited.len() - self.cycle_start)
    }
}

/// Iterate `map` from `start` until a state repeats.
///
/// Terminates on every finite state space since `map` is deterministic.
pub fn trace_eventual_cycle<M: TransitionMap>(
    map: &M,
    start: M::State,
) -> Result<EventualCycle<M::State>> {
    let mut discovered: BTreeMap<M::State, usize> = BTreeMap::new();
    let mut visited = Vec::new();
    let mut state = start;
    loop {
        if let Some(&index) = discovered.get(&state) {
            return Ok(EventualCycle {
                visited,
                cycle_start: index,
            });
        }
        discovered.insert(state, visited.len());
        visited.push(state);
        state = map.step(state)?;
    }
}

/// Floyd's tortoise and hare: `(μ, λ)` of the orbit of `start`.
pub fn floyd_cycle<M: TransitionMap>(map: &M, start: M::State) -> Result<(usize, usize)> {
    let mut tortoise = map.step(start)?;
    let mut hare = map.step(map.step(start)?)?;
    while tortoise != hare {
        tortoise = map.step(tortoise)?;
        hare = map.step(map.step(hare)?)?;
    }

    let mut mu = 0;
    tortoise = start;
    while tortoise != hare {
        tortoise = map.step(tortoise)?;
        hare = map.step(hare)?;
        mu += 1;
    }

    let mut lambda = 1;
    hare = map.step(tortoise)?;
    while tortoise != hare {
        hare = map.step(hare)?;
        lambda += 1;
    }
    Ok((mu, lambda))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CertError;

    /// `0 → 1 → 2 → 3 → 4 → 5 → 3`, plus `6 → 7 → 7`.
    struct TableMap(Vec<usize>);

    impl TransitionMap for TableMap {
        type State = usize;

        fn step(&self, state: usize) -> Result<usize> {
            self.0
                .get(state)
                .copied()
                .ok_or_else(|| CertError::DomainViolation {
                    residue: state as u64,
                    lift: 0,
                    reason: "no such state".to_string(),
                })
        }
    }

    fn table() -> TableMap {
        TableMap(vec![1, 2, 3, 4, 5, 3, 7, 7])
    }

    #[test]
    fn reports_exactly_the_cyclic_states() {
        let orbit = trace_eventual_cycle(&table(), 0).unwrap();
        assert_eq!(orbit.transient(), &[0, 1, 2]);
        assert_eq!(orbit.cycle(), &[3, 4, 5]);
        assert_eq!(orbit.shape(), (3, 3));
    }

    #[test]
    fn start_on_the_cycle_has_no_transient() {
        let orbit = trace_eventual_cycle(&table(), 4).unwrap();
        assert!(orbit.transient().is_empty());
        assert_eq!(orbit.cycle(), &[4, 5, 3]);
    }

    #[test]
    fn fixed_point_cycle() {
        let orbit = trace_eventual_cycle(&table(), 6).unwrap();
        assert_eq!(orbit.transient(), &[6]);
        assert_eq!(orbit.cycle(), &[7]);
    }

    #[test]
    fn floyd_agrees_with_discovery_order() {
        let map = table();
        for start in 0..map.0.len() {
            let orbit = trace_eventual_cycle(&map, start).unwrap();
            assert_eq!(floyd_cycle(&map, start).unwrap(), orbit.shape(), "start {start}");
        }
    }

    #[test]
    fn map_errors_propagate() {
        let broken = TableMap(vec![1, 9]);
        let err = trace_eventual_cycle(&broken, 0).unwrap_err();
        assert!(matches!(err, CertError::DomainViolation { residue: 9, .. }));
    }
}
