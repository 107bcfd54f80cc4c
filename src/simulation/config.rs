use crate::error::SimError;
use crate::strategies::epsilon_greedy::DEFAULT_EPSILON;
use serde::{Deserialize, Serialize};

/// Run parameters for one simulation. Duration is a fixed timestep count,
/// not a wall-clock time; the loop never terminates early.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Experiment label, used in result file names and metadata.
    pub name: String,
    pub strategy_name: String,
    pub num_agents: u32,
    pub duration: u64,
    /// Seed for the run's single rng stream. None draws from entropy;
    /// reproducible runs always set it.
    pub seed: Option<u64>,
    /// Exploration probability, only read by epsilon_greedy.
    pub epsilon: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: "default_sim".to_string(),
            strategy_name: "min_rtt".to_string(),
            num_agents: 100,
            duration: 300,
            seed: None,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl SimConfig {
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy_name = strategy.into();
        self
    }

    pub fn with_agents(mut self, num_agents: u32) -> Self {
        self.num_agents = num_agents;
        self
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_agents < 1 {
            return Err(SimError::config("num_agents must be >= 1"));
        }
        if self.duration < 1 {
            return Err(SimError::config("duration must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(SimError::config("epsilon must be within [0, 1]"));
        }
        Ok(())
    }
}
