//! In-memory implementation of `AuditSink`.
//!
//! `InMemoryAuditTrail` keeps all events in a `Vec` behind a `Mutex`, so the
//! store can record from any thread. Use `export_log()` to obtain a sealed
//! `AuditLog` and `verify_integrity()` to confirm the chain is intact.

use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;

use warden_contracts::{
    audit::AuditEntry,
    error::{WardenError, WardenResult},
};
use warden_core::traits::AuditSink;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

/// The mutable interior of an `InMemoryAuditTrail`.
pub(crate) struct TrailState {
    /// All events written so far, in append order.
    pub(crate) events: Vec<AuditEvent>,

    /// The `this_hash` of the last event, or `GENESIS_HASH` before any write.
    pub(crate) last_hash: String,
}

/// An append-only audit trail backed by a SHA-256 hash chain.
pub struct InMemoryAuditTrail {
    trail_id: String,
    pub(crate) state: Mutex<TrailState>,
}

impl InMemoryAuditTrail {
    pub fn new(trail_id: impl Into<String>) -> Self {
        Self {
            trail_id: trail_id.into(),
            state: Mutex::new(TrailState {
                events: Vec::new(),
                last_hash: AuditEvent::GENESIS_HASH.to_string(),
            }),
        }
    }

    /// Export a sealed `AuditLog` containing every event written so far.
    pub fn export_log(&self) -> WardenResult<AuditLog> {
        let state = self.lock()?;
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        Ok(AuditLog {
            trail_id: self.trail_id.clone(),
            events: state.events.clone(),
            finalized_at: Utc::now(),
            terminal_hash,
        })
    }

    /// Return true if the in-memory chain has not been tampered with.
    ///
    /// A poisoned lock counts as a failed check.
    pub fn verify_integrity(&self) -> bool {
        self.lock().map(|state| verify_chain(&state.events)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|state| state.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> WardenResult<std::sync::MutexGuard<'_, TrailState>> {
        self.state.lock().map_err(|e| WardenError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })
    }
}

impl AuditSink for InMemoryAuditTrail {
    /// Append one entry to the hash chain.
    fn record(&self, entry: &AuditEntry) -> WardenResult<()> {
        let mut state = self.lock()?;

        let sequence = state.events.len() as u64;
        let prev_hash = state.last_hash.clone();
        let this_hash = hash_event(&self.trail_id, sequence, entry, &prev_hash)?;

        debug!(
            trail_id = %self.trail_id,
            sequence,
            hash = %this_hash,
            "audit entry appended"
        );

        state.events.push(AuditEvent {
            sequence,
            trail_id: self.trail_id.clone(),
            entry: entry.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.last_hash = this_hash;

        Ok(())
    }
}
