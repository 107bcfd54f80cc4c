use super::{first_min_by, no_paths, random_path, PathLoads, Strategy};
use crate::agent::Agent;
use crate::error::SimError;
use crate::topology::{Path, Topology};
use rand::rngs::StdRng;

/// Min-RTT restricted to paths not tagged "high-cost". When every path
/// carries the tag the policy gives up and picks uniformly among all of
/// them; an explicit fallback, not an accident.
#[derive(Debug, Default, Clone)]
pub struct AttributeAware;

impl Strategy for AttributeAware {
    fn select<'t>(
        &mut self,
        _agent: &Agent,
        topology: &'t Topology,
        _loads: &PathLoads,
        rng: &mut StdRng,
    ) -> Result<&'t Path, SimError> {
        let compliant = topology.paths().iter().filter(|p| !p.is_high_cost());
        match first_min_by(compliant, |p| p.base_rtt_ms) {
            Some(path) => Ok(path),
            None => random_path(topology.paths(), rng).ok_or_else(no_paths),
        }
    }

    fn name(&self) -> &'static str {
        "attribute_aware"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::HIGH_COST_TAG;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn tagged(id: &str, rtt: f64) -> Path {
        Path::new(id, 100.0, rtt).with_attributes(vec![HIGH_COST_TAG.to_string()])
    }

    #[test]
    fn avoids_high_cost_even_when_faster() {
        let topology = Topology::new(vec![
            tagged("expensive_fast", 10.0),
            Path::new("cheap_slow", 100.0, 80.0),
            Path::new("cheap_fast", 100.0, 40.0),
        ])
        .unwrap();
        let agent = Agent::new(0, "cheap_slow", 2.0);
        let mut rng = StdRng::seed_from_u64(0);

        for _ in 0..10 {
            let chosen = AttributeAware
                .select(&agent, &topology, &HashMap::new(), &mut rng)
                .unwrap();
            assert_eq!(chosen.id, "cheap_fast");
        }
    }

    #[test]
    fn all_tagged_falls_back_to_any_path() {
        let topology =
            Topology::new(vec![tagged("x", 10.0), tagged("y", 20.0), tagged("z", 30.0)]).unwrap();
        let agent = Agent::new(0, "x", 2.0);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            let chosen = AttributeAware
                .select(&agent, &topology, &HashMap::new(), &mut rng)
                .unwrap();
            assert!(topology.contains(&chosen.id));
        }
    }
}
