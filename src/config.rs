//! Configuration for [`LocationServices`](crate::LocationServices).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geofence::IdentifierStrategy;
use crate::location::PositionOptions;

/// Error type for configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration JSON could not be parsed.
    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the services cannot use.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings applied by the location services facade.
///
/// Every field has a default, so an empty JSON object is a valid
/// configuration.
///
/// # Example
///
/// ```
/// use geowatch_core::config::LocationServicesConfig;
/// use geowatch_core::geofence::IdentifierStrategy;
///
/// let config = LocationServicesConfig::from_json(
///     r#"{"default_options": {"enableHighAccuracy": true}, "identifier_strategy": "sequential"}"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.default_options.enable_high_accuracy, Some(true));
/// assert_eq!(config.identifier_strategy, IdentifierStrategy::Sequential);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationServicesConfig {
    /// Options used when a position request or watch supplies none.
    #[serde(default)]
    pub default_options: PositionOptions,

    /// How identifiers are generated for geofences registered without one.
    #[serde(default)]
    pub identifier_strategy: IdentifierStrategy,
}

impl LocationServicesConfig {
    /// Parses and validates a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Converts this configuration to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (extremely rare).
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Checks that the configuration can be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the default options are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_options
            .validate()
            .map_err(|reason| ConfigError::Invalid(format!("default_options: {reason}")))
    }
}
