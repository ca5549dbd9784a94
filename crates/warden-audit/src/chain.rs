//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Every field that contributes to an event's hash is listed explicitly so
//! nothing is accidentally omitted.
//!
//! Hash input layout (bytes, in order):
//!   1. trail_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of entry (serde_json with no pretty-printing)

use sha2::{Digest, Sha256};

use warden_contracts::{
    audit::AuditEntry,
    error::{WardenError, WardenResult},
};

use crate::event::AuditEvent;

/// Compute the SHA-256 hash for a single audit event.
///
/// Returns a lowercase 64-character hex string, or `AuditWriteFailed` if the
/// entry cannot be serialized.
pub fn hash_event(
    trail_id: &str,
    sequence: u64,
    entry: &AuditEntry,
    prev_hash: &str,
) -> WardenResult<String> {
    let entry_json = serde_json::to_vec(entry).map_err(|e| WardenError::AuditWriteFailed {
        reason: format!("audit entry is not serializable: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(trail_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&entry_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Returns `true` when:
///
/// 1. **Prev-hash linkage**: each event's `prev_hash` equals the
///    `this_hash` of the preceding event (or `GENESIS_HASH` for event 0).
/// 2. **Hash correctness**: each event's `this_hash` matches the value
///    recomputed from its own fields.
///
/// An empty chain is valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev = AuditEvent::GENESIS_HASH.to_string();

    for event in events {
        if event.prev_hash != expected_prev {
            return false;
        }

        match hash_event(&event.trail_id, event.sequence, &event.entry, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
