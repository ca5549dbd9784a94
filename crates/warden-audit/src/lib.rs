//! # warden-audit
//!
//! Append-only, SHA-256 hash-chained decision audit trail for WARDEN.
//!
//! ## Overview
//!
//! Every entry the store or generation adapter records is wrapped in an
//! `AuditEvent` that links to the previous event via its SHA-256 hash.
//! Changing any recorded byte breaks the chain, and `verify_chain` reports it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warden_audit::InMemoryAuditTrail;
//! use warden_core::PolicyStore;
//!
//! let trail = Arc::new(InMemoryAuditTrail::new("session-001"));
//! let store = PolicyStore::with_audit(trail.clone());
//! store.put("agent-42", policy_text, context)?;
//! store.evaluate("agent-42", &request);
//!
//! assert!(trail.verify_integrity());
//! let log = trail.export_log()?;
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditTrail;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use warden_contracts::{
        agent::{AuthenticationLevel, SourceContext},
        audit::{AuditEntry, AuditEntryKind},
        request::{AuthorizationRequest, Decision},
    };
    use warden_core::{traits::AuditSink, PolicyStore};

    use super::{verify_chain, AuditEvent, InMemoryAuditTrail};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn failure(agent_id: &str, reason: &str) -> AuditEntry {
        AuditEntry::now(AuditEntryKind::GenerationFailed {
            agent_id: agent_id.to_string(),
            reason: reason.to_string(),
        })
    }

    fn context() -> SourceContext {
        SourceContext::new("rebalance portfolio", AuthenticationLevel::Mfa, vec![])
    }

    // ── 1. chain integrity ────────────────────────────────────────────────────

    #[test]
    fn sequential_writes_form_a_valid_chain() {
        let trail = InMemoryAuditTrail::new("trail-integrity");
        trail.record(&failure("a", "first")).unwrap();
        trail.record(&failure("b", "second")).unwrap();
        trail.record(&failure("c", "third")).unwrap();

        assert_eq!(trail.len(), 3);
        assert!(trail.verify_integrity(), "chain must be valid after sequential writes");
    }

    #[test]
    fn empty_trail_is_valid() {
        let trail = InMemoryAuditTrail::new("trail-empty");

        assert!(trail.is_empty());
        assert!(trail.verify_integrity());
        assert_eq!(trail.export_log().unwrap().terminal_hash, "");
    }

    // ── 2. tamper detection ───────────────────────────────────────────────────

    #[test]
    fn mutating_an_entry_breaks_the_chain() {
        let trail = InMemoryAuditTrail::new("trail-tamper");
        trail.record(&failure("a", "timeout")).unwrap();
        trail.record(&failure("b", "timeout")).unwrap();

        {
            let mut state = trail.state.lock().unwrap();
            state.events[0].entry.kind = AuditEntryKind::GenerationFailed {
                agent_id: "a".to_string(),
                reason: "TAMPERED".to_string(),
            };
        }

        assert!(!trail.verify_integrity(), "chain must detect tampering with a stored entry");
    }

    #[test]
    fn dropping_an_event_breaks_the_linkage() {
        let trail = InMemoryAuditTrail::new("trail-gap");
        trail.record(&failure("a", "1")).unwrap();
        trail.record(&failure("b", "2")).unwrap();
        trail.record(&failure("c", "3")).unwrap();

        let mut events = trail.export_log().unwrap().events;
        events.remove(1);

        assert!(!verify_chain(&events));
    }

    // ── 3. genesis and sequencing ─────────────────────────────────────────────

    #[test]
    fn first_event_links_to_genesis() {
        let trail = InMemoryAuditTrail::new("trail-genesis");
        trail.record(&failure("a", "first")).unwrap();

        let log = trail.export_log().unwrap();
        assert_eq!(log.events[0].prev_hash, AuditEvent::GENESIS_HASH);
        assert_eq!(log.terminal_hash, log.events[0].this_hash);
        assert_eq!(log.trail_id, "trail-genesis");
    }

    #[test]
    fn sequence_numbers_have_no_gaps() {
        let trail = InMemoryAuditTrail::new("trail-seq");
        for reason in ["a", "b", "c", "d"] {
            trail.record(&failure("agent", reason)).unwrap();
        }

        let log = trail.export_log().unwrap();
        for (idx, event) in log.events.iter().enumerate() {
            assert_eq!(event.sequence, idx as u64);
        }
    }

    // ── 4. store integration ──────────────────────────────────────────────────

    #[test]
    fn store_records_registration_and_decisions() {
        let trail = Arc::new(InMemoryAuditTrail::new("trail-store"));
        let store = PolicyStore::with_audit(trail.clone());

        store
            .put(
                "agent-42",
                r#"permit(principal, action == Action::"read", resource);"#,
                context(),
            )
            .unwrap();
        let request = AuthorizationRequest::new("agent-42", "mfa", "read", "account/1");
        assert_eq!(store.evaluate("agent-42", &request), Decision::Permit);
        let request = AuthorizationRequest::new("agent-42", "mfa", "trade", "account/1");
        assert_eq!(store.evaluate("agent-42", &request), Decision::Deny);

        let log = trail.export_log().unwrap();
        assert_eq!(log.events.len(), 3);
        assert!(matches!(
            log.events[0].entry.kind,
            AuditEntryKind::PolicyRegistered { rule_count: 1, .. }
        ));
        match &log.events[2].entry.kind {
            AuditEntryKind::Evaluated {
                decision,
                determining_rule,
                ..
            } => {
                assert_eq!(*decision, Decision::Deny);
                assert!(determining_rule.is_none());
            }
            other => panic!("expected Evaluated, got {:?}", other),
        }
        assert!(trail.verify_integrity());
    }

    #[test]
    fn exported_log_serializes_to_json() {
        let trail = InMemoryAuditTrail::new("trail-json");
        trail.record(&failure("a", "unreachable")).unwrap();

        let json = serde_json::to_value(trail.export_log().unwrap()).unwrap();
        assert_eq!(json["events"][0]["entry"]["kind"]["kind"], "generation_failed");
        assert_eq!(json["events"][0]["entry"]["kind"]["agent_id"], "a");
    }
}
