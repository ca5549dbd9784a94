//! # warden-core
//!
//! The agent policy store and generation adapter for WARDEN.
//!
//! This crate provides:
//! - The collaborator traits (`PolicyGenerator`, `AuditSink`)
//! - `PolicyStore`, the owned agent → policy map that decides requests
//! - `GenerationAdapter`, which fetches policies from a generator under a
//!   timeout and registers them
//! - `WardenConfig`, the TOML deployment configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warden_core::{GenerationAdapter, PolicyStore};
//!
//! let store = Arc::new(PolicyStore::new());
//! let adapter = GenerationAdapter::new(store.clone(), Arc::new(my_generator));
//! adapter.request_policy("agent-42", "rebalance portfolio", level, roles).await?;
//! let decision = store.evaluate("agent-42", &request);
//! ```

pub mod config;
pub mod generation;
pub mod record;
pub mod store;
pub mod traits;

pub use config::{GeneratorConfig, WardenConfig};
pub use generation::GenerationAdapter;
pub use record::AgentPolicyRecord;
pub use store::PolicyStore;
