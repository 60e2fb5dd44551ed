//! Configuration persisted as JSON in the user's config directory

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::estimation::{CachePolicy, DEFAULT_CACHE_CAPACITY, DEFAULT_EVICTION_BATCH};

/// Configuration for osu-score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Score simulation service
    pub simulation: SimulationConfig,
    /// Estimation caching and mode
    pub estimation: EstimationConfig,
}

/// Where and how to reach the score simulation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_delay_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    /// Scores kept in the simulation cache before eviction
    pub cache_capacity: usize,
    /// Oldest entries dropped at once when the cache overflows
    pub eviction_batch: usize,
    /// Derive hit statistics from accuracy instead of the raw counts
    pub use_accuracy: bool,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            eviction_batch: DEFAULT_EVICTION_BATCH,
            use_accuracy: false,
        }
    }
}

impl EstimationConfig {
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            capacity: self.cache_capacity,
            eviction_batch: self.eviction_batch,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("osu-score").join("config.json"))
    }

    /// Load config from disk, falling back to defaults if missing or unreadable
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    /// Load and validate config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| Error::Config("no config directory on this system".to_string()))?;
        self.save_to(&path)
    }

    /// Save config to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.simulation.base_url.trim().is_empty() {
            return Err(Error::Config("simulation.base_url must not be empty".to_string()));
        }

        let estimation = &self.estimation;
        if estimation.cache_capacity == 0 {
            return Err(Error::Config(
                "estimation.cache_capacity must be at least 1".to_string(),
            ));
        }
        if estimation.eviction_batch == 0 || estimation.eviction_batch > estimation.cache_capacity
        {
            return Err(Error::Config(format!(
                "estimation.eviction_batch must be between 1 and {}, got {}",
                estimation.cache_capacity, estimation.eviction_batch
            )));
        }

        Ok(())
    }
}
