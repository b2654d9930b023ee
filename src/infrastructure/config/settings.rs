//! Application settings: loading, validation and conversion into engine
//! settings.
//!
//! Every section is optional; a missing file section takes the defaults
//! below.
//!
//! ```toml
//! [engine]
//! fee_bps = 150
//!
//! [resolution]
//! tie_break = "yes"
//! empty_winning_side = "forfeit"
//!
//! [resolution.stale_value]
//! policy = "void"
//! grace_secs = 86400
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```
//!
//! # Example
//!
//! ```
//! use lmsr_markets::infrastructure::config::Config;
//!
//! let config = Config::parse_toml("[engine]\nfee_bps = 200\n").unwrap();
//! assert_eq!(config.engine_settings().fee_bps, 200);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::application::{
    EmptyWinningSide, EngineSettings, ResolutionPolicy, StaleValuePolicy, TieBreak,
};
use crate::domain::{BPS_DENOMINATOR, DEFAULT_FEE_BPS};
use crate::error::{ConfigError, Result};

use super::logging::LoggingConfig;

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub resolution: ResolutionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Platform fee in basis points, applied to markets created afterwards.
    pub fee_bps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_bps: DEFAULT_FEE_BPS,
        }
    }
}

/// `[resolution]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolutionConfig {
    pub tie_break: TieBreak,
    pub empty_winning_side: EmptyWinningSide,
    pub stale_value: StaleValueConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_confidence_bps: Option<u32>,
}

/// Kind of stale-value handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicyKind {
    #[default]
    Fail,
    Void,
}

/// `[resolution.stale_value]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StaleValueConfig {
    pub policy: StalePolicyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_secs: Option<u64>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range value.
    pub fn validate(&self) -> Result<()> {
        if self.engine.fee_bps > BPS_DENOMINATOR {
            return Err(ConfigError::InvalidValue {
                field: "engine.fee_bps",
                reason: format!("must be at most {BPS_DENOMINATOR}"),
            }
            .into());
        }
        if self.resolution.max_confidence_bps == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "resolution.max_confidence_bps",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.resolution.stale_value.policy == StalePolicyKind::Void {
            match self.resolution.stale_value.grace_secs {
                None => {
                    return Err(ConfigError::MissingField {
                        field: "resolution.stale_value.grace_secs",
                    }
                    .into());
                }
                Some(0) => {
                    return Err(ConfigError::InvalidValue {
                        field: "resolution.stale_value.grace_secs",
                        reason: "must be greater than 0 for the void policy".to_string(),
                    }
                    .into());
                }
                Some(_) => {}
            }
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "logging.level",
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Resolution policy described by the `[resolution]` section.
    #[must_use]
    pub fn resolution_policy(&self) -> ResolutionPolicy {
        let stale_value = match self.resolution.stale_value.policy {
            StalePolicyKind::Fail => StaleValuePolicy::Fail,
            StalePolicyKind::Void => StaleValuePolicy::Void {
                grace_secs: self.resolution.stale_value.grace_secs.unwrap_or_default(),
            },
        };
        ResolutionPolicy {
            tie_break: self.resolution.tie_break,
            empty_winning_side: self.resolution.empty_winning_side,
            stale_value,
            max_confidence_bps: self.resolution.max_confidence_bps,
        }
    }

    /// Engine settings for [`MarketEngine::new`](crate::application::MarketEngine::new).
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            fee_bps: self.engine.fee_bps,
            resolution: self.resolution_policy(),
        }
    }

    /// Initialize the global tracing subscriber.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
