//! The agent policy store.
//!
//! `PolicyStore` maps agent ids to their active `AgentPolicyRecord`. It is the
//! only shared mutable state in WARDEN.
//!
//! Records are built outside the lock and swapped in with a single insert, so
//! a concurrent evaluation sees either the whole old record or the whole new
//! one. Evaluation clones the record's `Arc` under a read lock and runs the
//! combinator after releasing it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use warden_contracts::{
    agent::SourceContext,
    audit::{AuditEntry, AuditEntryKind},
    error::{WardenError, WardenResult},
    generation::{GeneratedPolicy, PolicyProvenance},
    request::{AuthorizationRequest, Decision},
};
use warden_policy::{contains_opening_token, explain, parse_report, Evaluation};

use crate::{record::AgentPolicyRecord, traits::AuditSink};

/// Owned map from agent id to active policy.
///
/// Construct one per process (or per test) and pass it explicitly to the
/// code that needs it.
#[derive(Default)]
pub struct PolicyStore {
    records: RwLock<HashMap<String, Arc<AgentPolicyRecord>>>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl PolicyStore {
    /// Create an empty store with no audit sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that records every registration and evaluation
    /// to `sink`.
    pub fn with_audit(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            records: RwLock::default(),
            audit: Some(sink),
        }
    }

    /// Parse `raw_text` and make it `agent_id`'s active policy.
    ///
    /// Returns `WardenError::InvalidPolicy` if the text contains no `permit(`
    /// or `forbid(` token at all; in that case any prior record for the agent
    /// stays active. A document that has the token but yields no usable rules
    /// is accepted and denies everything.
    pub fn put(
        &self,
        agent_id: impl Into<String>,
        raw_text: impl Into<String>,
        source_context: SourceContext,
    ) -> WardenResult<Arc<AgentPolicyRecord>> {
        self.insert(
            agent_id.into(),
            raw_text.into(),
            source_context,
            PolicyProvenance::Registered,
        )
    }

    /// Store a generator-produced policy, keeping its rationale and risk tier
    /// as opaque provenance.
    pub fn put_generated(
        &self,
        agent_id: impl Into<String>,
        generated: GeneratedPolicy,
        source_context: SourceContext,
    ) -> WardenResult<Arc<AgentPolicyRecord>> {
        let provenance = PolicyProvenance::Generated {
            rationale: generated.rationale,
            risk_tier: generated.risk_tier,
        };
        self.insert(agent_id.into(), generated.policy, source_context, provenance)
    }

    /// Return `agent_id`'s active record, if any.
    pub fn get(&self, agent_id: &str) -> Option<Arc<AgentPolicyRecord>> {
        self.read().get(agent_id).cloned()
    }

    /// Decide `request` against `agent_id`'s policy.
    ///
    /// An agent with no registered policy is denied; this is not an error.
    pub fn evaluate(&self, agent_id: &str, request: &AuthorizationRequest) -> Decision {
        self.explain(agent_id, request).decision
    }

    /// Like [`evaluate`](Self::evaluate), but also reports which rules matched.
    ///
    /// If an audit sink is configured and cannot record the evaluation, the
    /// result is downgraded to a default denial.
    pub fn explain(&self, agent_id: &str, request: &AuthorizationRequest) -> Evaluation {
        let evaluation = match self.get(agent_id) {
            Some(record) => explain(&record.rules, request),
            None => {
                warn!(
                    agent_id = %agent_id,
                    principal = %request.principal,
                    action = %request.action,
                    "no policy registered for agent; denying"
                );
                Evaluation::default()
            }
        };

        debug!(
            agent_id = %agent_id,
            decision = %evaluation.decision,
            determining_rule = ?evaluation.determining_rule,
            "request evaluated"
        );

        let entry = AuditEntry::now(AuditEntryKind::Evaluated {
            agent_id: agent_id.to_string(),
            request: request.clone(),
            decision: evaluation.decision,
            determining_rule: evaluation.determining_rule.clone(),
        });
        if let Err(e) = self.audit(&entry) {
            error!(
                agent_id = %agent_id,
                error = %e,
                "evaluation could not be audited; denying"
            );
            return Evaluation::default();
        }

        evaluation
    }

    /// Ids of every agent with an active policy, sorted.
    pub fn agent_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Forward `entry` to the audit sink, if one is configured.
    pub(crate) fn audit(&self, entry: &AuditEntry) -> WardenResult<()> {
        match &self.audit {
            Some(sink) => sink.record(entry),
            None => Ok(()),
        }
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn insert(
        &self,
        agent_id: String,
        raw_text: String,
        source_context: SourceContext,
        provenance: PolicyProvenance,
    ) -> WardenResult<Arc<AgentPolicyRecord>> {
        if !contains_opening_token(&raw_text) {
            warn!(agent_id = %agent_id, "rejecting policy without permit/forbid statements");
            return Err(WardenError::InvalidPolicy {
                reason: format!(
                    "policy for agent '{}' contains no permit( or forbid( statement",
                    agent_id
                ),
            });
        }

        let report = parse_report(&raw_text);
        if report.rules.is_empty() {
            warn!(
                agent_id = %agent_id,
                discarded = report.discarded.len(),
                "policy has no usable rules; agent will be denied every request"
            );
        }

        let record = Arc::new(AgentPolicyRecord {
            agent_id: agent_id.clone(),
            rules: report.rules,
            raw_text,
            created_at: Utc::now(),
            source_context,
            provenance,
        });

        // The write lock is held across the audit append and the swap, so the
        // last registration in the trail is always the active record. An
        // unauditable registration never takes effect.
        let mut records = self.write();
        self.audit(&AuditEntry::now(AuditEntryKind::PolicyRegistered {
            agent_id: agent_id.clone(),
            rule_count: record.rules.len(),
            provenance: record.provenance.clone(),
        }))?;
        let replaced = records.insert(agent_id.clone(), Arc::clone(&record));
        drop(records);

        info!(
            agent_id = %agent_id,
            rule_count = record.rules.len(),
            discarded = report.discarded.len(),
            replaced = replaced.is_some(),
            "policy registered"
        );

        Ok(record)
    }

    // The map is only ever changed by a single `insert`, so a panic in another
    // thread cannot leave it half-updated; recover from poisoning.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<AgentPolicyRecord>>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<AgentPolicyRecord>>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
