//! Contracts with the external policy generator.
//!
//! The generator is an untrusted text-generation oracle. WARDEN sends it a
//! `GenerationRequest` and receives a `GeneratedPolicy` whose `policy` text is
//! parsed like any other document. `rationale` and `risk_tier` are opaque
//! metadata: they flow into audit records and nothing else.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::AuthenticationLevel;

/// The fixed vocabulary the generator may draw on when writing rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyVocabulary {
    /// Namespace token the generator should qualify entities with.
    pub namespace: String,
    /// Recognized action names.
    pub actions: Vec<String>,
    /// Recognized resource name patterns.
    pub resources: Vec<String>,
}

impl Default for PolicyVocabulary {
    fn default() -> Self {
        Self {
            namespace: "Warden".to_string(),
            actions: vec![
                "read".to_string(),
                "trade".to_string(),
                "transfer".to_string(),
            ],
            resources: vec!["account/*".to_string(), "portfolio/*".to_string()],
        }
    }
}

/// Outbound payload sent to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub agent_id: String,
    pub task: String,
    pub authentication_level: AuthenticationLevel,
    pub roles: Vec<String>,
    pub vocabulary: PolicyVocabulary,
}

/// Qualitative risk assessment attached by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Inbound payload returned by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPolicy {
    /// Candidate policy document. Untrusted.
    pub policy: String,
    pub rationale: String,
    pub risk_tier: RiskTier,
}

/// Where a stored policy came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PolicyProvenance {
    /// Supplied directly by the API layer or an operator.
    Registered,
    /// Produced by the external generator.
    Generated { rationale: String, risk_tier: RiskTier },
}
