use super::{first_min_by, no_paths, PathLoads, Strategy};
use crate::agent::Agent;
use crate::error::SimError;
use crate::topology::{Path, Topology};
use rand::rngs::StdRng;

/// Always the path with the lowest base RTT. A stand-in for measured RTT;
/// the fluid model has no per-packet timing to measure.
#[derive(Debug, Default, Clone)]
pub struct MinRtt;

impl Strategy for MinRtt {
    fn select<'t>(
        &mut self,
        _agent: &Agent,
        topology: &'t Topology,
        _loads: &PathLoads,
        _rng: &mut StdRng,
    ) -> Result<&'t Path, SimError> {
        first_min_by(topology.paths(), |p| p.base_rtt_ms).ok_or_else(no_paths)
    }

    fn name(&self) -> &'static str {
        "min_rtt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn deterministic_global_minimum() {
        let topology = Topology::new(vec![
            Path::new("a", 100.0, 50.0),
            Path::new("b", 200.0, 100.0),
            Path::new("c", 80.0, 50.0),
        ])
        .unwrap();
        let agent = Agent::new(0, "b", 2.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut strategy = MinRtt;

        // ties on 50ms break to the first path in topology order, every call
        for _ in 0..10 {
            let chosen = strategy
                .select(&agent, &topology, &HashMap::new(), &mut rng)
                .unwrap();
            assert_eq!(chosen.id, "a");
        }
    }
}
