//! Parsed rule types and the rule matcher.
//!
//! A `Rule` is the structured form of one `permit(...)` / `forbid(...)`
//! statement. Matching consults only the principal and action constraints;
//! resource clauses are accepted by the parser but never evaluated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use warden_contracts::request::AuthorizationRequest;

/// Characters that may separate a category name from a per-identity suffix,
/// e.g. `"authenticated-agent42"` or `"authenticated:agent42"`.
pub const CATEGORY_SEPARATORS: [char; 3] = ['-', ':', '/'];

/// Whether a matching rule grants or blocks the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Permit,
    Forbid,
}

/// Constraint on the request's principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PrincipalConstraint {
    /// Bare `principal`: matches any principal.
    Unconstrained,
    /// `principal in NS::Client::"C"`: the principal belongs to category `C`.
    CategoryMatch(String),
    /// `principal == NS::Client::"I"`: the principal is exactly `I`.
    ExactMatch(String),
}

impl PrincipalConstraint {
    /// Return true if `principal` satisfies this constraint.
    ///
    /// Category membership is structural: `principal` belongs to category `C`
    /// if it equals `C`, or starts with `C` immediately followed by one of
    /// [`CATEGORY_SEPARATORS`]. `"unauthenticated-user"` is therefore not in
    /// `"authenticated"`.
    pub fn matches(&self, principal: &str) -> bool {
        match self {
            PrincipalConstraint::Unconstrained => true,
            PrincipalConstraint::ExactMatch(identity) => principal == identity,
            PrincipalConstraint::CategoryMatch(category) => {
                match principal.strip_prefix(category.as_str()) {
                    Some("") => true,
                    Some(rest) => rest.starts_with(CATEGORY_SEPARATORS),
                    None => false,
                }
            }
        }
    }
}

/// Constraint on the request's action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ActionConstraint {
    /// Bare `action`: matches any action.
    Unconstrained,
    /// `action == NS::Action::"N"` or `action in NS::Action::"N"`.
    SingleAction(String),
    /// `action in [NS::Action::"A", NS::Action::"B"]`.
    ActionSet(BTreeSet<String>),
}

impl ActionConstraint {
    /// Return true if `action` satisfies this constraint (case-sensitive).
    pub fn matches(&self, action: &str) -> bool {
        match self {
            ActionConstraint::Unconstrained => true,
            ActionConstraint::SingleAction(name) => name == action,
            ActionConstraint::ActionSet(names) => names.contains(action),
        }
    }
}

/// One parsed permit/forbid statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier used in audit records and explanations. Taken from
    /// an `@id("...")` annotation, otherwise `policy<N>` by position.
    pub id: String,

    pub effect: Effect,

    pub principal: PrincipalConstraint,

    pub action: ActionConstraint,

    /// 1-based line on which the statement opened.
    pub line: usize,
}

impl Rule {
    /// Return true if this rule applies to `request`.
    ///
    /// Both the principal and the action constraint must hold. The request's
    /// resource is never consulted.
    pub fn matches(&self, request: &AuthorizationRequest) -> bool {
        self.principal.matches(&request.principal) && self.action.matches(&request.action)
    }
}

/// Free-function form of [`Rule::matches`].
pub fn matches(rule: &Rule, request: &AuthorizationRequest) -> bool {
    rule.matches(request)
}
