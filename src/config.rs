use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Generator configuration with validation.
///
/// Controls how aliases are spelled in the generated SQL. The shape of the
/// query does not depend on any of these settings.
#[derive(Clone, Debug, PartialEq, Eq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Maximum number of characters of the readable suffix appended to an alias
    #[validate(range(
        min = 1,
        max = 64,
        message = "Name hint length must be between 1 and 64"
    ))]
    pub max_name_hint_length: usize,

    /// Zero-padded width of the per-kind alias counter
    #[validate(range(
        min = 1,
        max = 10,
        message = "Alias counter width must be between 1 and 10"
    ))]
    pub alias_counter_width: usize,

    /// Whether aliases carry a readable suffix derived from table/column names
    pub name_hints: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_name_hint_length: 20,
            alias_counter_width: 4,
            name_hints: true,
        }
    }
}

impl GeneratorConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_name_hint_length: parse_env_var("AGGREGATE_SQL_MAX_NAME_HINT_LENGTH", "20")?,
            alias_counter_width: parse_env_var("AGGREGATE_SQL_ALIAS_COUNTER_WIDTH", "4")?,
            name_hints: parse_env_var("AGGREGATE_SQL_NAME_HINTS", "true")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from a YAML document; missing fields take their defaults
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content.to_string(),
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        Self::from_yaml_str(&content)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
