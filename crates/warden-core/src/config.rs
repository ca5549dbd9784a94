//! TOML configuration for a WARDEN deployment.
//!
//! ```toml
//! [generator]
//! endpoint = "http://localhost:8080/v1/policies/generate"
//! timeout_secs = 30
//! api_key_env = "WARDEN_GENERATOR_API_KEY"
//!
//! [vocabulary]
//! namespace = "Warden"
//! actions = ["read", "trade", "transfer"]
//! resources = ["account/*", "portfolio/*"]
//! ```
//!
//! Every field has a default, so an empty document is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use warden_contracts::{
    error::{WardenError, WardenResult},
    generation::PolicyVocabulary,
};

/// Where and how to reach the external policy generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// URL the generation request is POSTed to.
    pub endpoint: String,

    /// Upper bound on one generator call, in seconds. Must be non-zero.
    pub timeout_secs: u64,

    /// Name of the environment variable holding a bearer token, if the
    /// generator requires one.
    pub api_key_env: Option<String>,
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/v1/policies/generate".to_string(),
            timeout_secs: 30,
            api_key_env: None,
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub generator: GeneratorConfig,
    pub vocabulary: PolicyVocabulary,
}

impl WardenConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `WardenError::ConfigError` if the TOML is malformed, does not
    /// match the expected schema, or sets an empty endpoint or zero timeout.
    pub fn from_toml_str(s: &str) -> WardenResult<Self> {
        let config: WardenConfig = toml::from_str(s).map_err(|e| WardenError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> WardenResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| WardenError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> WardenResult<()> {
        if self.generator.endpoint.trim().is_empty() {
            return Err(WardenError::ConfigError {
                reason: "generator.endpoint must not be empty".to_string(),
            });
        }
        if self.generator.timeout_secs == 0 {
            return Err(WardenError::ConfigError {
                reason: "generator.timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
