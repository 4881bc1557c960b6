use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::coordinator::ReservationError;
use crate::directory::{InMemoryRequesterDirectory, InMemoryResourceDirectory};
use crate::model::{Requester, Resource};

/// Process configuration, read from `ROOMLOCK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub metrics_port: Option<u16>,
    pub sweep_interval: Duration,
    pub seed_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics_port: None,
            sweep_interval: Duration::from_secs(60),
            seed_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let metrics_port = lookup("ROOMLOCK_METRICS_PORT").and_then(|s| s.parse().ok());
        let sweep_interval = lookup("ROOMLOCK_SWEEP_INTERVAL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.sweep_interval);
        let seed_file = lookup("ROOMLOCK_SEED_FILE")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        Self {
            metrics_port,
            sweep_interval,
            seed_file,
        }
    }
}

/// Initial directory contents, loaded from JSON:
///
/// ```json
/// { "resources": [{ "id": "R1", "name": "Fjord", "capacity": 8, "location": "Floor 2" }],
///   "requesters": [{ "id": "E1", "name": "Ada", "contact": "ada@example.com" }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub resources: Vec<Resource>,
    pub requesters: Vec<Requester>,
}

impl Seed {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn apply(
        self,
        resources: &InMemoryResourceDirectory,
        requesters: &InMemoryRequesterDirectory,
    ) -> Result<(), ReservationError> {
        for resource in self.resources {
            resources.insert(resource)?;
        }
        for requester in self.requesters {
            requesters.insert(requester)?;
        }
        Ok(())
    }
}
