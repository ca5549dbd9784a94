//! # warden-generator
//!
//! HTTP client for the external policy generator.
//!
//! `HttpPolicyGenerator` implements `warden_core::traits::PolicyGenerator`.
//! Whatever the endpoint returns is treated as untrusted: the body must be
//! JSON (optionally inside a Markdown code fence) and must satisfy the
//! response schema before the policy text reaches the store, which then
//! parses it like any other document.
//!
//! ```rust,ignore
//! let config = WardenConfig::from_file(Path::new("warden.toml"))?;
//! let generator = Arc::new(HttpPolicyGenerator::from_config(&config.generator)?);
//! let adapter = GenerationAdapter::from_config(store, generator, &config);
//! ```

pub mod client;
pub mod response;

pub use client::HttpPolicyGenerator;
pub use response::{decode_response, response_schema, strip_code_fence};
