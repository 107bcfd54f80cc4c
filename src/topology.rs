use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path as FsPath;

pub const HIGH_COST_TAG: &str = "high-cost";

/// One network path. Immutable once the topology is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    pub id: String,
    pub capacity_mbps: f64,
    pub base_rtt_ms: f64,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl Path {
    pub fn new(id: impl Into<String>, capacity_mbps: f64, base_rtt_ms: f64) -> Self {
        Self {
            id: id.into(),
            capacity_mbps,
            base_rtt_ms,
            attributes: Vec::new(),
            weight: 1,
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn is_high_cost(&self) -> bool {
        self.attributes.iter().any(|a| a == HIGH_COST_TAG)
    }
}

/// On-disk topology document: `{"paths": [...]}`, field names matching the
/// experiment configs ("capacity_mbps", "base_rtt_ms", optional "weight").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub paths: Vec<Path>,
}

/// The set of candidate paths for a run. Built once, read-only afterwards.
/// Iteration order is insertion order from the configuration; every
/// "first minimum" tie-break in the strategies leans on that.
#[derive(Debug, Clone)]
pub struct Topology {
    paths: Vec<Path>,
    index: HashMap<String, usize>,
}

impl Topology {
    pub fn new(paths: Vec<Path>) -> Result<Self, SimError> {
        if paths.is_empty() {
            return Err(SimError::config("topology has no paths"));
        }

        let mut index = HashMap::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            if path.id.is_empty() {
                return Err(SimError::config("path with empty id"));
            }
            if !(path.capacity_mbps > 0.0) {
                return Err(SimError::Config(format!(
                    "path '{}': capacity_mbps must be > 0, got {}",
                    path.id, path.capacity_mbps
                )));
            }
            if !(path.base_rtt_ms >= 0.0) {
                return Err(SimError::Config(format!(
                    "path '{}': base_rtt_ms must be >= 0, got {}",
                    path.id, path.base_rtt_ms
                )));
            }
            if path.weight < 1 {
                return Err(SimError::Config(format!(
                    "path '{}': weight must be >= 1",
                    path.id
                )));
            }
            if index.insert(path.id.clone(), i).is_some() {
                return Err(SimError::Config(format!("duplicate path id '{}'", path.id)));
            }
        }

        Ok(Self { paths, index })
    }

    pub fn from_config(config: TopologyConfig) -> Result<Self, SimError> {
        Self::new(config.paths)
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: TopologyConfig = serde_json::from_str(json)
            .map_err(|e| SimError::Config(format!("malformed topology: {e}")))?;
        Self::from_config(config)
    }

    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, SimError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Lookup by id. Fails explicitly on an unknown id; callers must never
    /// rely on a silent fallback here.
    pub fn get(&self, id: &str) -> Result<&Path, SimError> {
        self.index
            .get(id)
            .map(|&i| &self.paths[i])
            .ok_or_else(|| SimError::PathNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Paths in configuration order. Guaranteed non-empty.
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
