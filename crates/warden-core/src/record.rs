//! The per-agent policy record held by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_contracts::{agent::SourceContext, generation::PolicyProvenance};
use warden_policy::Rule;

/// An agent's active policy.
///
/// Created when a policy is registered or generated, owned by the
/// `PolicyStore`, and replaced wholesale when a new policy arrives for the
/// same agent. Records are shared as `Arc`s and never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPolicyRecord {
    pub agent_id: String,

    /// Parsed rules, in document order.
    pub rules: Vec<Rule>,

    /// The document the rules were parsed from.
    pub raw_text: String,

    pub created_at: DateTime<Utc>,

    pub source_context: SourceContext,

    /// Registration vs. generation metadata. Never consulted when deciding.
    pub provenance: PolicyProvenance,
}
