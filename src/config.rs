//! TOML configuration for analysis and measurement
//!
//! Every section is optional; missing keys fall back to defaults.
//!
//! ```toml
//! [analysis]
//! window_size = 3
//! jump_scale = 1.4
//! scan_direction = "ascending"
//!
//! [sweep]
//! max_ways = 24
//! repeats = 2000000
//!
//! [levels]
//! max_bytes = 33554432
//! ```

use crate::harness::{LevelSweepConfig, SweepConfig};
use crate::inference::AnalysisConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub sweep: SweepConfig,
    pub levels: LevelSweepConfig,
}

impl Config {
    /// Load and validate a configuration file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid TOML, or holds
    /// out-of-range values.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.sweep.validate().context("Invalid [sweep] section")?;
        self.levels.validate().context("Invalid [levels] section")?;
        Ok(())
    }
}
