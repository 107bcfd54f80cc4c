use super::{no_paths, PathLoads, Strategy};
use crate::agent::Agent;
use crate::error::SimError;
use crate::topology::{Path, Topology};
use rand::rngs::StdRng;
use std::collections::HashMap;

/// Cycles through paths in topology order, one step per call. Counters are
/// keyed by agent id and owned by the strategy instance, so runs stay
/// independent of each other.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counters: HashMap<u32, usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for RoundRobin {
    fn select<'t>(
        &mut self,
        agent: &Agent,
        topology: &'t Topology,
        _loads: &PathLoads,
        _rng: &mut StdRng,
    ) -> Result<&'t Path, SimError> {
        let paths = topology.paths();
        if paths.is_empty() {
            return Err(no_paths());
        }
        let counter = self.counters.entry(agent.id).or_insert(0);
        let index = *counter % paths.len();
        *counter += 1;
        Ok(&paths[index])
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct WrrState {
    index: usize,
    counter: u32,
}

/// Round robin where a path is served `weight` consecutive calls. The call
/// that finds the counter exhausted advances the index AND returns the path
/// at the new index in the same call; reference behavior, pinned below.
#[derive(Debug, Default)]
pub struct WeightedRoundRobin {
    state: HashMap<u32, WrrState>,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for WeightedRoundRobin {
    fn select<'t>(
        &mut self,
        agent: &Agent,
        topology: &'t Topology,
        _loads: &PathLoads,
        _rng: &mut StdRng,
    ) -> Result<&'t Path, SimError> {
        let paths = topology.paths();
        if paths.is_empty() {
            return Err(no_paths());
        }
        let state = self.state.entry(agent.id).or_default();
        let index = state.index % paths.len();
        let current = &paths[index];

        if state.counter < current.weight {
            state.counter += 1;
            Ok(current)
        } else {
            state.index = (index + 1) % paths.len();
            state.counter = 1;
            Ok(&paths[state.index])
        }
    }

    fn name(&self) -> &'static str {
        "weighted_round_robin"
    }
}
