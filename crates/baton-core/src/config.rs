//! Queue configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_QUEUE_NAME: &str = "serial";

pub const DEFAULT_INITIAL_CAPACITY: usize = 128;

/// Settings for one `SerialQueue`.
///
/// Every field has a default, so `{}` is a valid JSON config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Name used in logs and in the worker span.
    pub name: String,

    /// Backlog capacity allocated up front. The backlog still grows past it.
    pub initial_capacity: usize,
}

impl QueueConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: QueueConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_QUEUE_NAME.to_string(),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_json_uses_defaults() {
        let config = QueueConfig::from_json_str("{}").unwrap();
        assert_eq!(config, QueueConfig::default());
        assert_eq!(config.name, "serial");
        assert_eq!(config.initial_capacity, 128);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = QueueConfig::from_json_str(r#"{"name": "io"}"#).unwrap();
        assert_eq!(config.name, "io");
        assert_eq!(config.initial_capacity, DEFAULT_INITIAL_CAPACITY);
    }

    #[rstest]
    #[case(r#"{"name": ""}"#)]
    #[case(r#"{"name": "   "}"#)]
    #[case(r#"{"initial_capacity": 0}"#)]
    #[case(r#"{"capacity": 4}"#)]
    #[case("not json")]
    fn invalid_configs_are_rejected(#[case] json: &str) {
        assert!(QueueConfig::from_json_str(json).is_err());
    }

    #[test]
    fn zero_capacity_reports_variant() {
        let config = QueueConfig {
            initial_capacity: 0,
            ..QueueConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroCapacity)));
    }
}
