//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::PricerError;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "PRICER_";

/// Application configuration loaded from `PRICER_*` environment variables.
///
/// Command-line arguments override these values in `main`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Quantity every sweep tries to fill (`PRICER_TARGET_SIZE`).
    #[serde(default)]
    pub target_size: Option<u32>,

    /// Read events from this file instead of stdin (`PRICER_INPUT`).
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Emit logs as JSON (`PRICER_LOG_JSON`).
    #[serde(default)]
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX).from_env()
    }

    /// Build configuration from explicit key/value pairs (unprefixed keys).
    pub fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }

    /// Replace the target size when one is given.
    pub fn with_target_size(mut self, target_size: Option<u32>) -> Self {
        if target_size.is_some() {
            self.target_size = target_size;
        }
        self
    }

    /// Replace the input path when one is given.
    pub fn with_input(mut self, input: Option<PathBuf>) -> Self {
        if input.is_some() {
            self.input = input;
        }
        self
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        match self.target_size {
            None => Err("target size is required (argument or PRICER_TARGET_SIZE)".to_string()),
            Some(0) => Err("target size must be positive".to_string()),
            Some(_) => Ok(()),
        }
    }

    /// Validate and return the configuration, or the unified error.
    pub fn validated(self) -> Result<Self, PricerError> {
        self.validate().map_err(PricerError::InvalidConfig)?;
        Ok(self)
    }
}
