//! # warden-contracts
//!
//! Shared types, errors, and generator contracts for the WARDEN authorization
//! evaluator.
//!
//! All crates in the workspace import from here. No decision logic lives in
//! this crate, only data definitions and error types.

pub mod agent;
pub mod audit;
pub mod error;
pub mod generation;
pub mod request;
