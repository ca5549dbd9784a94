//! Audit event and log types.
//!
//! `AuditEvent` wraps an `AuditEntry` with sequence numbering and the SHA-256
//! hashes that make tampering detectable. `AuditLog` is the sealed export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_contracts::audit::AuditEntry;

/// A single link in the hash chain.
///
/// Modifying any field, including those of the embedded `entry`, invalidates
/// `this_hash` and every later `prev_hash`; `verify_chain` detects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// The trail this event belongs to.
    pub trail_id: String,

    pub entry: AuditEntry,

    /// Hash of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// Hash over (trail_id, sequence, prev_hash, canonical JSON of entry).
    pub this_hash: String,
}

impl AuditEvent {
    /// The `prev_hash` of the first event in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed snapshot of a trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub trail_id: String,

    /// All events in chain order.
    pub events: Vec<AuditEvent>,

    pub finalized_at: DateTime<Utc>,

    /// `this_hash` of the last event; empty when the log is empty.
    pub terminal_hash: String,
}
