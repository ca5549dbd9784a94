//! Decision combinator.
//!
//! Evaluation algorithm:
//!
//! 1. Start from `Deny`.
//! 2. Scan rules in document order.
//! 3. A matching `permit` sets the decision to `Permit` and the scan goes on,
//!    since a later `forbid` may still override it.
//! 4. A matching `forbid` sets the decision to `Deny` and stops the scan.
//! 5. No match (or no rules) leaves the decision at `Deny`.
//!
//! The result is implicit deny, explicit permit, and explicit forbid always
//! winning once it is reached.

use serde::{Deserialize, Serialize};
use tracing::debug;

use warden_contracts::request::{AuthorizationRequest, Decision};

use crate::{
    parser::{self, ParseReport},
    rule::{Effect, Rule},
};

/// A decision together with the rules that produced it.
///
/// `Evaluation::default()` is a default denial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub decision: Decision,

    /// The forbid that stopped the scan, or the first matching permit.
    /// `None` for a default denial.
    pub determining_rule: Option<String>,

    /// Ids of every rule that matched before the scan ended, in order.
    pub matched: Vec<String>,
}

/// Decide `request` against `rules` with forbid-overrides-permit semantics.
pub fn evaluate(rules: &[Rule], request: &AuthorizationRequest) -> Decision {
    explain(rules, request).decision
}

/// Like [`evaluate`], but also reports which rules matched.
pub fn explain(rules: &[Rule], request: &AuthorizationRequest) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for rule in rules {
        if !rule.matches(request) {
            continue;
        }

        debug!(
            rule_id = %rule.id,
            effect = ?rule.effect,
            principal = %request.principal,
            action = %request.action,
            "rule matched"
        );
        evaluation.matched.push(rule.id.clone());

        match rule.effect {
            Effect::Permit => {
                evaluation.decision = Decision::Permit;
                if evaluation.determining_rule.is_none() {
                    evaluation.determining_rule = Some(rule.id.clone());
                }
            }
            Effect::Forbid => {
                evaluation.decision = Decision::Deny;
                evaluation.determining_rule = Some(rule.id.clone());
                return evaluation;
            }
        }
    }

    if evaluation.matched.is_empty() {
        debug!(
            agent_id = %request.agent_id,
            principal = %request.principal,
            action = %request.action,
            "no rule matched; denying by default"
        );
    }
    evaluation
}

/// An ordered, parsed rule sequence.
///
/// ```rust,ignore
/// use warden_policy::RuleSet;
///
/// let rules = RuleSet::parse(r#"permit(principal, action == NS::Action::"read", resource);"#);
/// let decision = rules.evaluate(&request);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parse `document`, dropping malformed blocks.
    pub fn parse(document: &str) -> Self {
        Self::new(parser::parse(document))
    }

    /// Parse `document`, returning the rule set and the full parse report.
    pub fn parse_with_report(document: &str) -> (Self, ParseReport) {
        let report = parser::parse_report(document);
        (Self::new(report.rules.clone()), report)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn evaluate(&self, request: &AuthorizationRequest) -> Decision {
        evaluate(&self.rules, request)
    }

    pub fn explain(&self, request: &AuthorizationRequest) -> Evaluation {
        explain(&self.rules, request)
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}
