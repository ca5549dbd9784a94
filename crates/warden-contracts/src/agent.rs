//! Agent context types.
//!
//! A `SourceContext` describes the agent a policy was registered or generated
//! for. WARDEN stores it alongside the policy but never inspects it when
//! deciding requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WardenError;

/// How strongly the agent's caller was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticationLevel {
    Anonymous,
    Basic,
    #[serde(rename = "oauth")]
    OAuth,
    Mfa,
}

impl AuthenticationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthenticationLevel::Anonymous => "anonymous",
            AuthenticationLevel::Basic => "basic",
            AuthenticationLevel::OAuth => "oauth",
            AuthenticationLevel::Mfa => "mfa",
        }
    }
}

impl fmt::Display for AuthenticationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthenticationLevel {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anonymous" => Ok(AuthenticationLevel::Anonymous),
            "basic" => Ok(AuthenticationLevel::Basic),
            "oauth" => Ok(AuthenticationLevel::OAuth),
            "mfa" => Ok(AuthenticationLevel::Mfa),
            other => Err(WardenError::ConfigError {
                reason: format!(
                    "unknown authentication level '{other}' (expected anonymous, basic, oauth, or mfa)"
                ),
            }),
        }
    }
}

/// The context a policy was created for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContext {
    /// Free-text description of what the agent is meant to do.
    pub task: String,
    pub authentication_level: AuthenticationLevel,
    pub roles: Vec<String>,
}

impl SourceContext {
    pub fn new(
        task: impl Into<String>,
        authentication_level: AuthenticationLevel,
        roles: Vec<String>,
    ) -> Self {
        Self {
            task: task.into(),
            authentication_level,
            roles,
        }
    }
}
