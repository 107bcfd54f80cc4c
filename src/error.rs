use thiserror::Error;

/// Errors the simulation core can produce. Everything here is fatal: a run
/// either starts from valid input or not at all, and a mid-run failure means
/// a logic defect, not a transient condition.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown path id: {0}")]
    PathNotFound(String),

    #[error("failed to read topology: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
