//! # warden-policy
//!
//! Permit/forbid policy parser and deny-by-default decision combinator.
//!
//! ## Overview
//!
//! A policy document is a sequence of Cedar-style statements:
//!
//! ```text
//! permit(
//!     principal in NS::Client::"authenticated",
//!     action in [NS::Action::"read", NS::Action::"trade"],
//!     resource
//! );
//! ```
//!
//! [`parse`] turns the text into ordered [`Rule`]s, discarding blocks it
//! cannot understand. [`evaluate`] folds the rules into one [`Decision`]:
//! deny by default, a matching permit allows, a matching forbid always wins.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use warden_policy::RuleSet;
//!
//! let rules = RuleSet::parse(&std::fs::read_to_string("agent.policy")?);
//! let decision = rules.evaluate(&request);
//! ```
//!
//! ## Limitations
//!
//! Resource clauses are accepted syntactically but never matched, and
//! `when`/`unless` conditions are not supported (statements carrying them
//! are discarded).
//!
//! [`Decision`]: warden_contracts::request::Decision

pub mod engine;
pub mod parser;
pub mod rule;

pub use engine::{evaluate, explain, Evaluation, RuleSet};
pub use parser::{
    contains_opening_token, parse, parse_report, DiscardReason, DiscardedBlock, ParseReport,
};
pub use rule::{matches, ActionConstraint, Effect, PrincipalConstraint, Rule};

// ── Tests ─────────────────────────────────────────────────────────────────────
