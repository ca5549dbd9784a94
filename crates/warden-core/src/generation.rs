//! Policy generation adapter.
//!
//! `GenerationAdapter` is the seam to the external policy generator:
//!
//!   agent context → GenerationRequest → [generator, time-bounded] → PolicyStore::put_generated
//!
//! A generator error or timeout surfaces as `WardenError::GenerationFailed`
//! and leaves the store untouched, so the agent keeps its last-known-good
//! policy (or stays unpolicied and fails closed). No fallback policy is
//! synthesized and nothing is retried here; retries belong to the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use warden_contracts::{
    agent::{AuthenticationLevel, SourceContext},
    audit::{AuditEntry, AuditEntryKind},
    error::{WardenError, WardenResult},
    generation::{GenerationRequest, PolicyVocabulary},
};

use crate::{
    config::WardenConfig, record::AgentPolicyRecord, store::PolicyStore, traits::PolicyGenerator,
};

/// Obtains policies from a `PolicyGenerator` and registers them in a
/// `PolicyStore`.
pub struct GenerationAdapter {
    store: Arc<PolicyStore>,
    generator: Arc<dyn PolicyGenerator>,
    vocabulary: PolicyVocabulary,
    timeout: Duration,
}

impl GenerationAdapter {
    /// Upper bound on a single generator call unless configured otherwise.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create an adapter with the default vocabulary and timeout.
    pub fn new(store: Arc<PolicyStore>, generator: Arc<dyn PolicyGenerator>) -> Self {
        Self {
            store,
            generator,
            vocabulary: PolicyVocabulary::default(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Create an adapter using the vocabulary and timeout from `config`.
    pub fn from_config(
        store: Arc<PolicyStore>,
        generator: Arc<dyn PolicyGenerator>,
        config: &WardenConfig,
    ) -> Self {
        Self::new(store, generator)
            .with_vocabulary(config.vocabulary.clone())
            .with_timeout(config.generator.timeout())
    }

    pub fn with_vocabulary(mut self, vocabulary: PolicyVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<PolicyStore> {
        &self.store
    }

    /// Ask the generator for a policy for `agent_id` and make it active.
    ///
    /// # Errors
    ///
    /// - `GenerationFailed` if the generator errors or does not answer within
    ///   the timeout. The in-flight call is dropped and the store is unchanged.
    /// - `InvalidPolicy` if the returned text has no permit/forbid statement;
    ///   the store is unchanged.
    /// - `AuditWriteFailed` if the registration cannot be audited.
    pub async fn request_policy(
        &self,
        agent_id: &str,
        task: &str,
        authentication_level: AuthenticationLevel,
        roles: Vec<String>,
    ) -> WardenResult<Arc<AgentPolicyRecord>> {
        let request = GenerationRequest {
            agent_id: agent_id.to_string(),
            task: task.to_string(),
            authentication_level,
            roles,
            vocabulary: self.vocabulary.clone(),
        };

        let generated =
            match tokio::time::timeout(self.timeout, self.generator.generate(&request)).await {
                Ok(Ok(generated)) => generated,
                Ok(Err(WardenError::GenerationFailed { reason })) => {
                    return Err(self.failed(agent_id, reason))
                }
                Ok(Err(other)) => return Err(self.failed(agent_id, other.to_string())),
                Err(_elapsed) => {
                    return Err(self.failed(
                        agent_id,
                        format!("generator did not respond within {:?}", self.timeout),
                    ))
                }
            };

        info!(
            agent_id = %agent_id,
            risk_tier = %generated.risk_tier,
            "policy generated"
        );

        let source_context =
            SourceContext::new(request.task, request.authentication_level, request.roles);
        self.store.put_generated(agent_id, generated, source_context)
    }

    /// Log and audit a failed generation, returning the error to surface.
    fn failed(&self, agent_id: &str, reason: String) -> WardenError {
        warn!(agent_id = %agent_id, reason = %reason, "policy generation failed");

        let entry = AuditEntry::now(AuditEntryKind::GenerationFailed {
            agent_id: agent_id.to_string(),
            reason: reason.clone(),
        });
        if let Err(e) = self.store.audit(&entry) {
            error!(agent_id = %agent_id, error = %e, "generation failure could not be audited");
        }

        WardenError::GenerationFailed { reason }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
