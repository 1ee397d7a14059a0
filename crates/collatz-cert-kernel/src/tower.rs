//! Truncated tower-graph survival.
//!
//! States are pairs `(T, q)` with `T` in the window `2..=KQ+2` and `q` odd
//! modulo `2^KQ`, restricted to the minimal-exit condition
//! `v2(3^T·q − 1) = 1`, i.e. `3^T·q ≡ 3 (mod 4)`. Each state has at most one
//! successor: with `u = 3^T·q mod 2^KQ`, the re-entry depth is
//! `T' = v2(u + 1) − 1` and `q' = (u + 1) / 2^(T'+1)`.
//!
//! The survival set is what remains after repeatedly deleting states with
//! no live successor. The predicate holds when it is empty.

use crate::error::{Result, Verdict};
use crate::params::TowerParams;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const T_MIN: u32 = 2;

/// A truncated tower state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerState {
    pub t: u32,
    pub q: u64,
}

/// The tower graph over one precision window.
#[derive(Debug, Clone)]
pub struct TowerGraph {
    bits: u32,
    pow3: Vec<u64>,
    successors: Vec<Option<u32>>,
}

impl TowerGraph {
    pub fn build(params: &TowerParams) -> Result<Self> {
        params.validate()?;
        let bits = params.modulus_bits();
        let mask = (1u64 << bits) - 1;
        let t_max = bits + 2;

        let mut pow3 = vec![1u64; (t_max + 1) as usize];
        for e in 1..pow3.len() {
            pow3[e] = (pow3[e - 1] * 3) & mask;
        }

        let mut graph = Self {
            bits,
            pow3,
            successors: Vec::new(),
        };
        let count = graph.vertex_count();
        graph.successors = (0..count)
            .map(|index| graph.successor_of(graph.state(index)))
            .collect();
        Ok(graph)
    }

    fn mask(&self) -> u64 {
        (1u64 << self.bits) - 1
    }

    fn t_max(&self) -> u32 {
        self.bits + 2
    }

    /// Vertices per depth: odd `q` in the one residue class mod 4 allowed
    /// by the minimal-exit condition.
    fn per_depth(&self) -> usize {
        1usize << (self.bits - 2)
    }

    /// The class of `q mod 4` that satisfies `3^T·q ≡ 3 (mod 4)`.
    fn exit_class(t: u32) -> u64 {
        if t % 2 == 0 { 3 } else { 1 }
    }

    pub fn vertex_count(&self) -> usize {
        (self.t_max() - T_MIN + 1) as usize * self.per_depth()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().filter(|s| s.is_some()).count()
    }

    /// The state stored at `index`, depth-major then ascending `q`.
    pub fn state(&self, index: usize) -> TowerState {
        let per_depth = self.per_depth();
        let t = T_MIN + (index / per_depth) as u32;
        let q = (((index % per_depth) as u64) << 2) | Self::exit_class(t);
        TowerState { t, q }
    }

    pub fn index_of(&self, state: TowerState) -> Option<usize> {
        if state.t < T_MIN || state.t > self.t_max() || state.q > self.mask() {
            return None;
        }
        if state.q & 3 != Self::exit_class(state.t) {
            return None;
        }
        let depth = (state.t - T_MIN) as usize;
        Some(depth * self.per_depth() + (state.q >> 2) as usize)
    }

    fn successor_of(&self, state: TowerState) -> Option<u32> {
        let u = (self.pow3[state.t as usize] * state.q) & self.mask();
        let s = (u + 1) & self.mask();
        if s == 0 {
            return None;
        }
        let t_plus = s.trailing_zeros();
        if t_plus < T_MIN + 1 {
            return None;
        }
        let next = TowerState {
            t: t_plus - 1,
            q: s >> t_plus,
        };
        self.index_of(next).map(|i| i as u32)
    }

    pub fn successor(&self, index: usize) -> Option<usize> {
        self.successors[index].map(|i| i as usize)
    }

    pub fn successors(&self) -> &[Option<u32>] {
        &self.successors
    }
}

/// Repeatedly delete vertices with no live successor.
///
/// `successors[v]` is the unique out-neighbour of `v`, if any. Returns the
/// liveness of every vertex after pruning.
pub fn prune_dead_ends(successors: &[Option<u32>]) -> Vec<bool> {
    let n = successors.len();

    // Reverse adjacency in compressed form.
    let mut offsets = vec![0usize; n + 1];
    for &s in successors.iter().flatten() {
        offsets[s as usize + 1] += 1;
    }
    for i in 0..n {
        offsets[i + 1] += offsets[i];
    }
    let mut fill = offsets.clone();
    let mut predecessors = vec![0u32; offsets[n]];
    for (v, s) in successors.iter().enumerate() {
        if let Some(s) = *s {
            predecessors[fill[s as usize]] = v as u32;
            fill[s as usize] += 1;
        }
    }

    let mut alive = vec![true; n];
    let mut out_degree: Vec<u8> = successors.iter().map(|s| u8::from(s.is_some())).collect();
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| out_degree[v] == 0).collect();
    while let Some(v) = queue.pop_front() {
        if !alive[v] {
            continue;
        }
        alive[v] = false;
        for &p in &predecessors[offsets[v]..offsets[v + 1]] {
            let p = p as usize;
            if !alive[p] {
                continue;
            }
            out_degree[p] -= 1;
            if out_degree[p] == 0 {
                queue.push_back(p);
            }
        }
    }
    alive
}

/// A surviving state and its live successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerWitness {
    pub state: TowerState,
    pub successor: TowerState,
}

/// Result of the tower-graph survival check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerReport {
    pub params: TowerParams,
    pub t_window: (u32, u32),
    pub modulus_bits: u32,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub pruned: usize,
    pub survivors: usize,
    pub witness: Option<TowerWitness>,
    pub verdict: Verdict,
}

pub fn run_tower_check(params: &TowerParams) -> Result<TowerReport> {
    let graph = TowerGraph::build(params)?;
    tracing::debug!(
        s0 = params.s0,
        alpha = params.alpha,
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "tower graph built"
    );

    let alive = prune_dead_ends(graph.successors());
    let survivors = alive.iter().filter(|&&a| a).count();
    let witness = alive.iter().position(|&a| a).and_then(|v| {
        let next = graph.successor(v).filter(|&s| alive[s])?;
        Some(TowerWitness {
            state: graph.state(v),
            successor: graph.state(next),
        })
    });

    let verdict = Verdict::from_pass(survivors == 0);
    if !verdict.is_pass() {
        tracing::warn!(survivors, "tower survival set is non-empty");
    }

    Ok(TowerReport {
        params: *params,
        t_window: (T_MIN, graph.t_max()),
        modulus_bits: graph.bits,
        vertex_count: graph.vertex_count(),
        edge_count: graph.edge_count(),
        pruned: graph.vertex_count() - survivors,
        survivors,
        witness,
        verdict,
    })
}
