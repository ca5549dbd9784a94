//! Built-in reference scenarios.
//!
//! Each scenario wires a real `PolicyStore` to an `InMemoryAuditTrail`,
//! registers a document, and checks the decisions it produces. The last one
//! drives the `GenerationAdapter` with canned generators so it runs offline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use warden_audit::InMemoryAuditTrail;
use warden_contracts::{
    agent::{AuthenticationLevel, SourceContext},
    error::{WardenError, WardenResult},
    generation::{GeneratedPolicy, GenerationRequest, RiskTier},
    request::{AuthorizationRequest, Decision},
};
use warden_core::{traits::PolicyGenerator, GenerationAdapter, PolicyStore};

// ── Documents ─────────────────────────────────────────────────────────────────

const AUTHENTICATED_TRADE: &str = r#"
permit(
    principal in Warden::Client::"authenticated",
    action == Warden::Action::"trade",
    resource
);
"#;

const FORBID_EVERYTHING: &str = "forbid(principal, action, resource);";

const ACTION_SET: &str = r#"
permit(
    principal,
    action in [Warden::Action::"read", Warden::Action::"trade"],
    resource
);
"#;

/// One expected decision.
struct Check {
    principal: &'static str,
    action: &'static str,
    expected: Decision,
}

/// Outcome of one scenario.
pub struct ScenarioResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

// ── Canned generators ─────────────────────────────────────────────────────────

/// Returns a read-only policy for any request.
struct ReadOnlyGenerator;

#[async_trait]
impl PolicyGenerator for ReadOnlyGenerator {
    async fn generate(&self, request: &GenerationRequest) -> WardenResult<GeneratedPolicy> {
        Ok(GeneratedPolicy {
            policy: format!(
                r#"permit(principal, action == {}::Action::"read", resource);"#,
                request.vocabulary.namespace
            ),
            rationale: format!("task '{}' only needs to read", request.task),
            risk_tier: RiskTier::Low,
        })
    }
}

/// Always fails, as an unreachable endpoint would.
struct OfflineGenerator;

#[async_trait]
impl PolicyGenerator for OfflineGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> WardenResult<GeneratedPolicy> {
        Err(WardenError::GenerationFailed {
            reason: "generator offline".to_string(),
        })
    }
}

// ── Runners ───────────────────────────────────────────────────────────────────

/// Run every scenario in order.
pub async fn run_all() -> Vec<ScenarioResult> {
    vec![
        run_document(
            "1. category principal permits trade",
            AUTHENTICATED_TRADE,
            &[Check {
                principal: "authenticated-x",
                action: "trade",
                expected: Decision::Permit,
            }],
        ),
        run_document(
            "2. other category is denied",
            AUTHENTICATED_TRADE,
            &[Check {
                principal: "unauthenticated-y",
                action: "trade",
                expected: Decision::Deny,
            }],
        ),
        run_document(
            "3. unconstrained forbid denies everything",
            FORBID_EVERYTHING,
            &[
                Check {
                    principal: "authenticated-x",
                    action: "trade",
                    expected: Decision::Deny,
                },
                Check {
                    principal: "anyone",
                    action: "read",
                    expected: Decision::Deny,
                },
            ],
        ),
        run_document(
            "4. action set membership",
            ACTION_SET,
            &[
                Check {
                    principal: "anyone",
                    action: "read",
                    expected: Decision::Permit,
                },
                Check {
                    principal: "anyone",
                    action: "transfer",
                    expected: Decision::Deny,
                },
            ],
        ),
        run_generation().await,
    ]
}

fn run_document(name: &'static str, document: &str, checks: &[Check]) -> ScenarioResult {
    let trail = Arc::new(InMemoryAuditTrail::new(name));
    let store = PolicyStore::with_audit(trail.clone());
    let context = SourceContext::new(name, AuthenticationLevel::Basic, vec![]);

    if let Err(e) = store.put("scenario-agent", document, context) {
        return ScenarioResult {
            name,
            passed: false,
            detail: format!("registration failed: {}", e),
        };
    }

    let mut failures = Vec::new();
    for check in checks {
        let request =
            AuthorizationRequest::new("scenario-agent", check.principal, check.action, "r");
        let actual = store.evaluate("scenario-agent", &request);
        if actual != check.expected {
            failures.push(format!(
                "{} {} → {} (expected {})",
                check.principal, check.action, actual, check.expected
            ));
        }
    }

    if !trail.verify_integrity() {
        failures.push("audit chain failed verification".to_string());
    }

    ScenarioResult {
        name,
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!("{} decision(s), {} audit event(s)", checks.len(), trail.len())
        } else {
            failures.join("; ")
        },
    }
}

/// A generated policy is registered; a later failed generation leaves it in
/// place.
async fn run_generation() -> ScenarioResult {
    let name = "5. failed regeneration keeps the previous policy";
    let trail = Arc::new(InMemoryAuditTrail::new(name));
    let store = Arc::new(PolicyStore::with_audit(trail.clone()));
    let timeout = Duration::from_secs(1);

    let good = GenerationAdapter::new(store.clone(), Arc::new(ReadOnlyGenerator))
        .with_timeout(timeout);
    let offline = GenerationAdapter::new(store.clone(), Arc::new(OfflineGenerator))
        .with_timeout(timeout);

    let roles = vec!["analyst".to_string()];
    if let Err(e) = good
        .request_policy("agent-7", "summarize balances", AuthenticationLevel::OAuth, roles.clone())
        .await
    {
        return ScenarioResult {
            name,
            passed: false,
            detail: format!("first generation failed: {}", e),
        };
    }

    let second = offline
        .request_policy("agent-7", "move funds", AuthenticationLevel::OAuth, roles)
        .await;
    let read = AuthorizationRequest::new("agent-7", "analyst", "read", "account/1");
    let transfer = AuthorizationRequest::new("agent-7", "analyst", "transfer", "account/1");

    let passed = matches!(second, Err(WardenError::GenerationFailed { .. }))
        && store.evaluate("agent-7", &read) == Decision::Permit
        && store.evaluate("agent-7", &transfer) == Decision::Deny
        && trail.verify_integrity();

    ScenarioResult {
        name,
        passed,
        detail: format!("{} audit event(s)", trail.len()),
    }
}
