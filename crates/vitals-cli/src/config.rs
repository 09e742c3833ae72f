//! CLI configuration

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vitals_anomaly::EngineConfig;

/// CLI configuration
///
/// ```toml
/// [engine]
/// edge_guard = 5
///
/// [engine.thresholds]
/// anchor_sigma = 2.5
///
/// [engine.scan_policy]
/// mode = "skip_ahead"
/// positions = 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    /// Detection engine settings
    pub engine: EngineConfig,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => match Self::default_config_path() {
                Some(p) => p,
                None => return Ok(CliConfig::default()),
            },
        };

        let config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::parse(&contents)?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            CliConfig::default()
        };
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn parse(contents: &str) -> CliResult<Self> {
        let config: CliConfig =
            toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))?;
        config
            .engine
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Get the default configuration file path
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vitals").join("config.toml"))
    }
}
