pub mod analyzer;
pub mod logger;

use serde::{Deserialize, Serialize};

/// One agent's state at the end of a timestep. cwnd is rounded to two
/// decimals for the record, matching the result-log precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSample {
    pub id: u32,
    pub path: String,
    pub cwnd: f64,
}

/// The simulator's output unit: one of these per timestep, in timestep
/// order. Loads and losses are the stage-1/stage-2 values for the step
/// (pre-update assignment); agent samples are post-update, post-reselect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestepRecord {
    pub timestep: u64,
    pub total_throughput: f64,
    pub agents: Vec<AgentSample>,
    /// (path id, load) in topology order, rounded to 2 decimals.
    pub path_loads: Vec<(String, f64)>,
    /// (path id, loss) in topology order, rounded to 2 decimals.
    pub path_loss: Vec<(String, f64)>,
    pub total_loss: f64,
}

/// Sidecar metadata written next to each result log so the reporting side
/// can correlate output with configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub strategy: String,
    pub agents: u32,
    pub duration: u64,
    pub topology: String,
    pub experiment: String,
    pub seed: Option<u64>,
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_behaves() {
        assert_eq!(round2(1.005 + 0.001), 1.01);
        assert_eq!(round2(7.0), 7.0);
        assert_eq!(round2(12.3449), 12.34);
        assert_eq!(round2(0.0), 0.0);
    }
}
