//! `PolicyGenerator` backed by an HTTP endpoint.

use async_trait::async_trait;
use jsonschema::Validator;
use tracing::{debug, warn};

use warden_contracts::{
    error::{WardenError, WardenResult},
    generation::{GeneratedPolicy, GenerationRequest},
};
use warden_core::{traits::PolicyGenerator, GeneratorConfig};

use crate::response::{compile_response_schema, decode_response};

/// POSTs each `GenerationRequest` as JSON to a fixed endpoint and validates
/// the reply before handing it to the adapter.
pub struct HttpPolicyGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    validator: Validator,
}

impl HttpPolicyGenerator {
    /// Build a generator from deployment configuration.
    ///
    /// When `api_key_env` is set, the named environment variable must exist;
    /// its value is sent as a bearer token. Returns `ConfigError` otherwise.
    pub fn from_config(config: &GeneratorConfig) -> WardenResult<Self> {
        let api_key = match &config.api_key_env {
            Some(name) => Some(std::env::var(name).map_err(|_| WardenError::ConfigError {
                reason: format!("generator API key variable '{}' is not set", name),
            })?),
            None => None,
        };
        Self::new(config, api_key)
    }

    /// Build a generator with an explicit bearer token.
    pub fn new(config: &GeneratorConfig, api_key: Option<String>) -> WardenResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| WardenError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            validator: compile_response_schema()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PolicyGenerator for HttpPolicyGenerator {
    async fn generate(&self, request: &GenerationRequest) -> WardenResult<GeneratedPolicy> {
        debug!(agent_id = %request.agent_id, endpoint = %self.endpoint, "requesting policy");

        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| WardenError::GenerationFailed {
            reason: format!("generator unreachable: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(agent_id = %request.agent_id, %status, "generator returned an error status");
            return Err(WardenError::GenerationFailed {
                reason: format!("generator returned HTTP {}: {}", status, error_text),
            });
        }

        let body = response.text().await.map_err(|e| WardenError::GenerationFailed {
            reason: format!("failed to read generator response: {e}"),
        })?;

        decode_response(&body, &self.validator)
    }
}
