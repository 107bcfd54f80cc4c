use crate::error::SimError;
use crate::strategies::{PathLoads, Strategy};
use crate::topology::Topology;
use rand::rngs::StdRng;
use rand::Rng;

/// cwnd never drops below this, no matter how many congested steps in a row.
pub const CWND_FLOOR: f64 = 1.0;
/// Cold-start window after a path switch. A policy choice, not derived.
pub const CWND_SWITCH_RESET: f64 = 2.0;

/// One simulated flow. Holds its congestion window and the id of the path
/// it is currently assigned to; the live `Path` is re-resolved against the
/// topology whenever it is needed.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: u32,
    pub current_path: String,
    pub cwnd: f64,
}

impl Agent {
    pub fn new(id: u32, initial_path: impl Into<String>, cwnd: f64) -> Self {
        Self {
            id,
            current_path: initial_path.into(),
            cwnd,
        }
    }

    /// Create an agent on a uniformly random path with a small randomized
    /// starting window in [1.0, 5.0), drawn from the run's seeded stream.
    pub fn spawn(id: u32, topology: &Topology, rng: &mut StdRng) -> Self {
        let paths = topology.paths();
        let initial = &paths[rng.gen_range(0..paths.len())];
        let cwnd = rng.gen_range(1.0..5.0);
        Self::new(id, initial.id.clone(), cwnd)
    }

    /// AIMD: halve on congestion, add one otherwise, then clamp to the floor.
    pub fn update_cwnd(&mut self, congested: bool) {
        if congested {
            self.cwnd *= 0.5;
        } else {
            self.cwnd += 1.0;
        }
        self.cwnd = self.cwnd.max(CWND_FLOOR);
    }

    /// Run the bound strategy against this timestep's load snapshot. A switch
    /// resets cwnd to the cold-start value before the new path is assigned.
    /// Always called after `update_cwnd` within a timestep.
    pub fn choose_new_path(
        &mut self,
        strategy: &mut dyn Strategy,
        topology: &Topology,
        loads: &PathLoads,
        rng: &mut StdRng,
    ) -> Result<(), SimError> {
        let new_path = strategy.select(self, topology, loads, rng)?;
        if new_path.id != self.current_path {
            self.cwnd = CWND_SWITCH_RESET;
            self.current_path = new_path.id.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::StrategyKind;
    use crate::topology::Path;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn aimd_increase_and_decrease() {
        let mut agent = Agent::new(0, "p", 4.0);
        agent.update_cwnd(false);
        assert_eq!(agent.cwnd, 5.0);
        agent.update_cwnd(true);
        assert_eq!(agent.cwnd, 2.5);
    }

    #[test]
    fn halving_clamps_at_floor() {
        let mut agent = Agent::new(0, "p", 1.2);
        agent.update_cwnd(true);
        assert_eq!(agent.cwnd, CWND_FLOOR);
        agent.update_cwnd(true);
        assert_eq!(agent.cwnd, CWND_FLOOR);
    }

    #[test]
    fn switching_resets_cwnd_to_cold_start() {
        let topology = Topology::new(vec![
            Path::new("slow", 100.0, 90.0),
            Path::new("fast", 100.0, 10.0),
        ])
        .unwrap();
        let mut strategy = StrategyKind::MinRtt.build(0.1);
        let mut rng = StdRng::seed_from_u64(7);

        let mut agent = Agent::new(0, "slow", 37.5);
        agent
            .choose_new_path(strategy.as_mut(), &topology, &HashMap::new(), &mut rng)
            .unwrap();
        assert_eq!(agent.current_path, "fast");
        assert_eq!(agent.cwnd, CWND_SWITCH_RESET);

        // staying put leaves cwnd alone
        agent.cwnd = 9.0;
        agent
            .choose_new_path(strategy.as_mut(), &topology, &HashMap::new(), &mut rng)
            .unwrap();
        assert_eq!(agent.current_path, "fast");
        assert_eq!(agent.cwnd, 9.0);
    }

    proptest! {
        #[test]
        fn cwnd_never_falls_below_floor(
            start in 1.0f64..5.0,
            congestion in proptest::collection::vec(any::<bool>(), 0..256),
        ) {
            let mut agent = Agent::new(0, "p", start);
            for congested in congestion {
                agent.update_cwnd(congested);
                prop_assert!(agent.cwnd >= CWND_FLOOR);
            }
        }
    }
}
