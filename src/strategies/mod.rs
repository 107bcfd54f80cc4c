pub mod attribute_aware;
pub mod blest;
pub mod epsilon_greedy;
pub mod min_load;
pub mod min_rtt;
pub mod round_robin;

pub use attribute_aware::AttributeAware;
pub use blest::Blest;
pub use epsilon_greedy::EpsilonGreedy;
pub use min_load::MinLoad;
pub use min_rtt::MinRtt;
pub use round_robin::{RoundRobin, WeightedRoundRobin};

use crate::agent::Agent;
use crate::error::SimError;
use crate::topology::{Path, Topology};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Per-path load snapshot for the current timestep, keyed by path id.
/// Every agent in a timestep sees the same snapshot.
pub type PathLoads = HashMap<String, f64>;

/// A path selection policy. Must always return a path from the topology.
///
/// Selection is pure for most variants; the round-robin family keeps
/// per-agent counters keyed by agent id, scoped to the owning run. The rng
/// is the run's single seeded stream, used only for the documented random
/// fallbacks and exploration draws.
pub trait Strategy: fmt::Debug + Send {
    fn select<'t>(
        &mut self,
        agent: &Agent,
        topology: &'t Topology,
        loads: &PathLoads,
        rng: &mut StdRng,
    ) -> Result<&'t Path, SimError>;

    fn name(&self) -> &'static str;
}

/// Closed set of strategy kinds. Configuration names map onto this at
/// construction time; unknown names fail before any timestep runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MinRtt,
    MinLoad,
    AttributeAware,
    RoundRobin,
    WeightedRoundRobin,
    EpsilonGreedy,
    Blest,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::MinRtt,
        StrategyKind::MinLoad,
        StrategyKind::AttributeAware,
        StrategyKind::RoundRobin,
        StrategyKind::WeightedRoundRobin,
        StrategyKind::EpsilonGreedy,
        StrategyKind::Blest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::MinRtt => "min_rtt",
            StrategyKind::MinLoad => "min_load",
            StrategyKind::AttributeAware => "attribute_aware",
            StrategyKind::RoundRobin => "round_robin",
            StrategyKind::WeightedRoundRobin => "weighted_round_robin",
            StrategyKind::EpsilonGreedy => "epsilon_greedy",
            StrategyKind::Blest => "blest",
        }
    }

    /// Fresh strategy state for one run. `epsilon` only feeds EpsilonGreedy.
    pub fn build(self, epsilon: f64) -> Box<dyn Strategy> {
        match self {
            StrategyKind::MinRtt => Box::new(MinRtt),
            StrategyKind::MinLoad => Box::new(MinLoad),
            StrategyKind::AttributeAware => Box::new(AttributeAware),
            StrategyKind::RoundRobin => Box::new(RoundRobin::new()),
            StrategyKind::WeightedRoundRobin => Box::new(WeightedRoundRobin::new()),
            StrategyKind::EpsilonGreedy => Box::new(EpsilonGreedy::new(epsilon)),
            StrategyKind::Blest => Box::new(Blest),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, SimError> {
        match s.to_lowercase().as_str() {
            "min_rtt" => Ok(StrategyKind::MinRtt),
            "min_load" => Ok(StrategyKind::MinLoad),
            "attribute_aware" => Ok(StrategyKind::AttributeAware),
            "round_robin" => Ok(StrategyKind::RoundRobin),
            "weighted_round_robin" => Ok(StrategyKind::WeightedRoundRobin),
            "epsilon_greedy" => Ok(StrategyKind::EpsilonGreedy),
            "blest" => Ok(StrategyKind::Blest),
            other => Err(SimError::Config(format!("unknown strategy: {other}"))),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First element with the minimal key, in iteration order. Strict `<` keeps
/// the first minimum on ties; insertion order from the configuration is the
/// documented tie-break for all strategies.
pub(crate) fn first_min_by<'t, I, F>(paths: I, key: F) -> Option<&'t Path>
where
    I: IntoIterator<Item = &'t Path>,
    F: Fn(&Path) -> f64,
{
    let mut iter = paths.into_iter();
    let mut best = iter.next()?;
    for p in iter {
        if key(p) < key(best) {
            best = p;
        }
    }
    Some(best)
}

pub(crate) fn random_path<'t>(paths: &'t [Path], rng: &mut StdRng) -> Option<&'t Path> {
    if paths.is_empty() {
        None
    } else {
        Some(&paths[rng.gen_range(0..paths.len())])
    }
}

pub(crate) fn random_pick<'t>(paths: &[&'t Path], rng: &mut StdRng) -> Option<&'t Path> {
    if paths.is_empty() {
        None
    } else {
        Some(paths[rng.gen_range(0..paths.len())])
    }
}

pub(crate) fn load_of(loads: &PathLoads, id: &str) -> f64 {
    loads.get(id).copied().unwrap_or(0.0)
}

pub(crate) fn no_paths() -> SimError {
    SimError::config("topology has no paths")
}
