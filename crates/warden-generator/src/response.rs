//! Decoding and structural validation of generator responses.
//!
//! Generators backed by a language model often wrap their JSON in a Markdown
//! code fence. The fence is stripped, the remainder is parsed as JSON and
//! checked against [`response_schema`] before it is deserialized.

use jsonschema::Validator;
use serde_json::{json, Value};
use tracing::warn;

use warden_contracts::{
    error::{WardenError, WardenResult},
    generation::GeneratedPolicy,
};

/// JSON Schema every generator response must satisfy.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "required": ["policy", "rationale", "riskTier"],
        "properties": {
            "policy": { "type": "string", "minLength": 1 },
            "rationale": { "type": "string" },
            "riskTier": { "enum": ["LOW", "MEDIUM", "HIGH", "CRITICAL"] }
        }
    })
}

/// Compile [`response_schema`].
pub fn compile_response_schema() -> WardenResult<Validator> {
    jsonschema::validator_for(&response_schema()).map_err(|e| WardenError::ConfigError {
        reason: format!("invalid generator response schema: {e}"),
    })
}

/// Remove a surrounding Markdown code fence, if present.
///
/// The opening fence may carry an info string (```` ```json ````). Text
/// without a leading fence is returned trimmed and otherwise unchanged.
pub fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string on the opening line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => return "",
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Turn a raw response body into a `GeneratedPolicy`.
///
/// Every failure is reported as `WardenError::GenerationFailed`; schema
/// violations are listed together in one reason.
pub fn decode_response(body: &str, validator: &Validator) -> WardenResult<GeneratedPolicy> {
    let payload: Value =
        serde_json::from_str(strip_code_fence(body)).map_err(|e| WardenError::GenerationFailed {
            reason: format!("generator response is not JSON: {e}"),
        })?;

    let violations: Vec<String> = validator
        .iter_errors(&payload)
        .map(|error| format!("{} at '{}'", error, error.instance_path))
        .collect();
    if !violations.is_empty() {
        warn!(count = violations.len(), "generator response failed schema validation");
        return Err(WardenError::GenerationFailed {
            reason: format!("generator response violates schema: {}", violations.join("; ")),
        });
    }

    serde_json::from_value(payload).map_err(|e| WardenError::GenerationFailed {
        reason: format!("generator response could not be decoded: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use warden_contracts::{error::WardenError, generation::RiskTier};

    use super::{compile_response_schema, decode_response, strip_code_fence};

    const BODY: &str = r#"{
        "policy": "permit(principal, action == Action::\"read\", resource);",
        "rationale": "read-only task",
        "riskTier": "LOW"
    }"#;

    // ── 1. fence stripping ────────────────────────────────────────────────────

    #[test]
    fn plain_body_is_only_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn fence_with_info_string_is_removed() {
        let fenced = "```json\n{\"a\": 1}\n```\n";
        assert_eq!(strip_code_fence(fenced), "{\"a\": 1}");
    }

    #[test]
    fn bare_fence_is_removed() {
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
    }

    #[test]
    fn unterminated_fence_keeps_the_body() {
        assert_eq!(strip_code_fence("```json\n{}"), "{}");
    }

    // ── 2. decoding ───────────────────────────────────────────────────────────

    #[test]
    fn valid_body_decodes() {
        let validator = compile_response_schema().unwrap();
        let generated = decode_response(BODY, &validator).unwrap();

        assert!(generated.policy.starts_with("permit("));
        assert_eq!(generated.rationale, "read-only task");
        assert_eq!(generated.risk_tier, RiskTier::Low);
    }

    #[test]
    fn fenced_body_decodes() {
        let validator = compile_response_schema().unwrap();
        let fenced = format!("```json\n{BODY}\n```");

        assert!(decode_response(&fenced, &validator).is_ok());
    }

    #[test]
    fn prose_is_generation_failure() {
        let validator = compile_response_schema().unwrap();
        let result = decode_response("Sure! Here is your policy.", &validator);

        match result {
            Err(WardenError::GenerationFailed { reason }) => assert!(reason.contains("not JSON")),
            other => panic!("expected GenerationFailed, got {:?}", other),
        }
    }

    #[test]
    fn unknown_risk_tier_violates_schema() {
        let validator = compile_response_schema().unwrap();
        let body = r#"{"policy": "permit(principal, action, resource);", "rationale": "", "riskTier": "EXTREME"}"#;

        match decode_response(body, &validator) {
            Err(WardenError::GenerationFailed { reason }) => assert!(reason.contains("schema")),
            other => panic!("expected GenerationFailed, got {:?}", other),
        }
    }

    #[test]
    fn missing_policy_violates_schema() {
        let validator = compile_response_schema().unwrap();
        let body = r#"{"rationale": "x", "riskTier": "HIGH"}"#;

        assert!(matches!(
            decode_response(body, &validator),
            Err(WardenError::GenerationFailed { .. })
        ));
    }
}
