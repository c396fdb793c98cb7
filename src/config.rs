// src/config.rs

//! Defines the configuration structures for the curvature engine.
//!
//! Configuration is read once from the JSON file named by the
//! `CORE_CURVATURE_CONFIG` environment variable and exposed through
//! [`CONFIG`]. Every field has a default, so a partial file (or no file at
//! all) is always usable.

use anyhow::Context;
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the path of the JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "CORE_CURVATURE_CONFIG";

/// Process-wide configuration, loaded on first use.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration for the curvature engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct Config {
    /// Resource limits applied before and during a computation.
    pub limits: LimitsConfig,
    /// How tensor entries are evaluated.
    pub compute: ComputeConfig,
    /// Checks performed on metrics before any tensor is computed.
    pub validation: ValidationConfig,
}

impl Config {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("Failed to parse curvature configuration JSON")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], falling back to defaults
    /// (with a warning) when it is unset or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Config::default();
        };
        match Self::from_file(Path::new(&path)) {
            Ok(config) => {
                info!("Loaded configuration from {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                warn!("{:#}; using default configuration", e);
                Config::default()
            }
        }
    }
}

// --- Limits ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest metric dimension accepted. The Riemann tensor has `n^4`
    /// entries, so this bounds the work per invocation.
    pub max_dimension: usize,
    /// Wall-clock budget per manifold, in milliseconds. `None` disables it.
    pub deadline_ms: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_dimension: 8,
            deadline_ms: None,
        }
    }
}

impl LimitsConfig {
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

// --- Compute ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ComputeConfig {
    /// Evaluate independent tensor entries on the rayon pool.
    pub parallel: bool,
    /// Tensors with fewer entries than this are always evaluated serially.
    pub min_parallel_entries: usize,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        ComputeConfig {
            parallel: true,
            min_parallel_entries: 16,
        }
    }
}

// --- Validation ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject metrics whose matrix is not symmetric after simplification.
    pub check_symmetry: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            check_symmetry: true,
        }
    }
}
