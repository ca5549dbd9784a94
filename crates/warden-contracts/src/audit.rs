//! Audit entry types.
//!
//! The store and generation adapter emit one `AuditEntry` per registration,
//! evaluation, and failed generation. Sinks append them; entries are never
//! modified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    generation::PolicyProvenance,
    request::{AuthorizationRequest, Decision},
};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEntryKind {
    /// A policy was stored for an agent, replacing any prior one.
    PolicyRegistered {
        agent_id: String,
        rule_count: usize,
        provenance: PolicyProvenance,
    },

    /// A request was decided.
    Evaluated {
        /// The agent whose policy was consulted.
        agent_id: String,
        request: AuthorizationRequest,
        decision: Decision,
        /// Id of the rule that fixed the decision; absent for default denials.
        determining_rule: Option<String>,
    },

    /// The generator failed; the agent's previous policy stays active.
    GenerationFailed { agent_id: String, reason: String },
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub kind: AuditEntryKind,
    /// Wall-clock time the entry was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Stamp `kind` with the current time.
    pub fn now(kind: AuditEntryKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }
}
