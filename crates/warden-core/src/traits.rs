//! Trait seams to WARDEN's collaborators.
//!
//! - `PolicyGenerator` — untrusted oracle (may be backed by an LLM)
//! - `AuditSink`       — trusted sink (records every registration and decision)
//!
//! The store and the generation adapter are written against these traits so
//! tests and hosting applications can plug in their own implementations.

use async_trait::async_trait;

use warden_contracts::{
    audit::AuditEntry,
    error::WardenResult,
    generation::{GeneratedPolicy, GenerationRequest},
};

/// The external policy generator.
///
/// Implementations are **untrusted**: whatever text they return is parsed
/// like any other policy document and must clear the store's opening-token
/// floor. Implementations should report transport and payload failures as
/// `WardenError::GenerationFailed`. The adapter bounds every call with a
/// timeout, so implementations need not enforce one themselves.
#[async_trait]
pub trait PolicyGenerator: Send + Sync {
    /// Produce a candidate policy for the agent described by `request`.
    async fn generate(&self, request: &GenerationRequest) -> WardenResult<GeneratedPolicy>;
}

/// Append-only sink for audit entries.
///
/// A failed write is surfaced to the caller: a registration that cannot be
/// audited is not stored, and an evaluation that cannot be audited is denied.
pub trait AuditSink: Send + Sync {
    /// Append one entry. Entries written here are never modified.
    fn record(&self, entry: &AuditEntry) -> WardenResult<()>;
}
