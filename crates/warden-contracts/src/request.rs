//! Authorization request and decision types.
//!
//! The evaluator consumes an `AuthorizationRequest` and produces a `Decision`.
//! WARDEN is deny-by-default: `Decision::default()` is `Deny`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single authorization question: may `principal` perform `action` on
/// `resource`, under the policy registered for `agent_id`?
///
/// Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    /// The action name, compared case-sensitively against rule actions.
    pub action: String,
    /// The principal string, e.g. `"authenticated-agent42"`.
    pub principal: String,
    /// The target resource. Accepted but never consulted when matching.
    pub resource: String,
    /// Selects which agent's policy decides the request.
    pub agent_id: String,
}

impl AuthorizationRequest {
    pub fn new(
        agent_id: impl Into<String>,
        principal: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            principal: principal.into(),
            resource: resource.into(),
            agent_id: agent_id.into(),
        }
    }
}

/// The final outcome of evaluating an `AuthorizationRequest`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Permit,
    /// Also the value before any rule is considered.
    #[default]
    Deny,
}

impl Decision {
    pub fn is_permit(self) -> bool {
        self == Decision::Permit
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Permit => f.write_str("Permit"),
            Decision::Deny => f.write_str("Deny"),
        }
    }
}

/// Wire shape returned to the API layer: `{"decision": "Permit"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub decision: Decision,
}

impl From<Decision> for DecisionResponse {
    fn from(decision: Decision) -> Self {
        Self { decision }
    }
}
