pub mod agent;
pub mod error;
pub mod metrics;
pub mod simulation;
pub mod strategies;
pub mod topology;

pub use agent::Agent;
pub use error::SimError;
pub use simulation::{SimConfig, Simulator};
pub use strategies::{Strategy, StrategyKind};
pub use topology::{Path, Topology};

pub mod prelude {
    pub use crate::agent::Agent;
    pub use crate::error::SimError;
    pub use crate::metrics::TimestepRecord;
    pub use crate::simulation::{SimConfig, Simulator};
    pub use crate::strategies::{PathLoads, Strategy, StrategyKind};
    pub use crate::topology::{Path, Topology};
}
