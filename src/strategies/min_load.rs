use super::{first_min_by, load_of, no_paths, random_path, PathLoads, Strategy};
use crate::agent::Agent;
use crate::error::SimError;
use crate::topology::{Path, Topology};
use rand::rngs::StdRng;

/// The path with the smallest entry in the load snapshot. With the shared
/// per-timestep snapshot this herds every MinLoad agent onto the same path
/// within a step; that is the intended simultaneous-decision model and it
/// self-corrects the following step.
#[derive(Debug, Default, Clone)]
pub struct MinLoad;

impl Strategy for MinLoad {
    fn select<'t>(
        &mut self,
        _agent: &Agent,
        topology: &'t Topology,
        loads: &PathLoads,
        rng: &mut StdRng,
    ) -> Result<&'t Path, SimError> {
        if loads.is_empty() {
            // documented fallback: no snapshot yet, pick uniformly
            return random_path(topology.paths(), rng).ok_or_else(no_paths);
        }
        first_min_by(topology.paths(), |p| load_of(loads, &p.id)).ok_or_else(no_paths)
    }

    fn name(&self) -> &'static str {
        "min_load"
    }
}
