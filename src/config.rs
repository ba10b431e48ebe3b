//! Engine configuration
//!
//! Every field has a default, so an empty TOML document (or no file at all) gives a
//! working engine: Gaussian noise of 0.05, no artificial latency and one worker per
//! CPU on each stream.

use crate::core_modules::sentiment::DEFAULT_NOISE_STD_DEV;
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sentiment: SentimentConfig,
    pub latency: LatencyConfig,
    pub workers: WorkerConfig,
}

/// Sentiment classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Standard deviation of the Gaussian noise; 0 disables it.
    pub noise_std_dev: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            noise_std_dev: DEFAULT_NOISE_STD_DEV,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyMode {
    #[default]
    None,
    Simulated,
}

/// Simulated processing delay per stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub mode: LatencyMode,
    pub face_min_ms: u64,
    pub face_jitter_ms: u64,
    pub team_min_ms: u64,
    pub team_jitter_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            mode: LatencyMode::None,
            face_min_ms: 2000,
            face_jitter_ms: 2000,
            team_min_ms: 3000,
            team_jitter_ms: 2000,
        }
    }
}

/// Worker pool sizing and progress logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Workers per stream; 0 means one per CPU.
    pub per_stream: usize,
    /// Log a progress line every this many processed payloads.
    pub log_every: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            per_stream: 0,
            log_every: 10,
        }
    }
}

impl WorkerConfig {
    /// The effective number of workers per stream.
    pub fn worker_count(&self) -> usize {
        if self.per_stream == 0 {
            num_cpus::get().max(1)
        } else {
            self.per_stream
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VisionError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| VisionError::io(format!("Failed to read config file: {:?}", path), e))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges serde cannot express
    pub fn validate(&self) -> Result<()> {
        let std_dev = self.sentiment.noise_std_dev;
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(VisionError::Config(format!(
                "sentiment.noise_std_dev must be a finite, non-negative number (got {std_dev})"
            )));
        }

        if self.workers.log_every == 0 {
            return Err(VisionError::Config(
                "workers.log_every must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
