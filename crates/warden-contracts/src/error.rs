//! Error types for the WARDEN evaluator.
//!
//! Only the storage and generation boundaries produce observable failures.
//! Parsing and matching never fail: malformed rule blocks are discarded and an
//! unknown agent simply evaluates to `Deny`.

use thiserror::Error;

/// The unified error type for the WARDEN crates.
#[derive(Debug, Error)]
pub enum WardenError {
    /// The supplied text contains no `permit(` or `forbid(` opening token.
    ///
    /// Raised by the policy store; the prior policy for the agent, if any, is
    /// left in place.
    #[error("invalid policy: {reason}")]
    InvalidPolicy { reason: String },

    /// The external policy generator was unreachable, timed out, or returned a
    /// payload that does not have the expected structure.
    #[error("policy generation failed: {reason}")]
    GenerationFailed { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The audit sink could not record an entry.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },
}

/// Convenience alias used throughout the WARDEN crates.
pub type WardenResult<T> = Result<T, WardenError>;
