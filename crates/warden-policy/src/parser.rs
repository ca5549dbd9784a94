//! Line-oriented policy document parser.
//!
//! The parser is a small explicit state machine fed one line at a time:
//!
//! ```text
//!   Outside ──permit( / forbid(──▶ Scope ──)──▶ Trailer ──;──▶ Outside
//!      ▲                            │              │
//!      └──── new opener / EOF ──────┴──────────────┘   (statement discarded)
//! ```
//!
//! Inside `Scope` the body text is accumulated until the `)` that closes the
//! statement's scope; the body is then split on top-level commas into
//! `principal`, `action`, and `resource` clauses.
//!
//! Parsing never fails. Blocks that cannot be understood are discarded and
//! reported in [`ParseReport::discarded`]; the rest of the document still
//! takes effect. Emitted rules keep document order exactly, which the
//! decision combinator depends on.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::rule::{ActionConstraint, Effect, PrincipalConstraint, Rule};

/// Why a statement block was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DiscardReason {
    /// The block never reached its closing `);`.
    Unterminated,
    /// A string literal, list, or parenthesis was left open.
    Unbalanced,
    /// Neither a principal nor an action clause was recognized.
    NoConstraints,
    /// A clause could not be understood; carries the clause text.
    MalformedClause(String),
    /// Text such as `when { ... }` appeared between `)` and `;`.
    UnsupportedConditions(String),
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::Unterminated => f.write_str("statement is missing its closing ');'"),
            DiscardReason::Unbalanced => {
                f.write_str("statement leaves a string literal, list, or parenthesis open")
            }
            DiscardReason::NoConstraints => {
                f.write_str("statement has no recognizable principal or action clause")
            }
            DiscardReason::MalformedClause(clause) => {
                write!(f, "unrecognized clause '{clause}'")
            }
            DiscardReason::UnsupportedConditions(tail) => {
                write!(f, "conditions are not supported: '{tail}'")
            }
        }
    }
}

/// A statement block the parser dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardedBlock {
    /// 1-based line on which the statement opened.
    pub line: usize,
    pub reason: DiscardReason,
}

/// Everything the parser produced for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    /// Accepted rules, in document order.
    pub rules: Vec<Rule>,
    /// Dropped blocks, in document order.
    pub discarded: Vec<DiscardedBlock>,
}

/// Parse `document` into an ordered rule sequence.
///
/// Never fails: an empty document yields no rules, and malformed blocks are
/// silently discarded. Use [`parse_report`] to see what was dropped.
pub fn parse(document: &str) -> Vec<Rule> {
    parse_report(document).rules
}

/// Parse `document`, returning both the accepted rules and the discarded
/// blocks.
pub fn parse_report(document: &str) -> ParseReport {
    let mut parser = Parser::default();
    for (idx, line) in document.lines().enumerate() {
        parser.feed_line(idx + 1, line);
    }
    parser.finish()
}

/// Return true if `text` contains a `permit(` or `forbid(` opening token
/// anywhere (whitespace is allowed before the parenthesis).
pub fn contains_opening_token(text: &str) -> bool {
    ["permit", "forbid"].iter().any(|kw| {
        text.match_indices(kw)
            .any(|(i, _)| text[i + kw.len()..].trim_start().starts_with('('))
    })
}

// ── State machine ─────────────────────────────────────────────────────────────

/// A statement that has been opened but not yet emitted.
#[derive(Debug)]
struct OpenStatement {
    effect: Effect,
    line: usize,
    id: Option<String>,
    body: String,
    tail: String,
    brackets: usize,
    parens: usize,
    quoted: bool,
    escaped: bool,
    /// Set when a line ended inside a string literal.
    unbalanced: bool,
}

impl OpenStatement {
    fn new(effect: Effect, line: usize, id: Option<String>) -> Self {
        Self {
            effect,
            line,
            id,
            body: String::new(),
            tail: String::new(),
            brackets: 0,
            parens: 0,
            quoted: false,
            escaped: false,
            unbalanced: false,
        }
    }

    /// Consume `text` into the body until the `)` that closes the scope.
    ///
    /// Returns the remainder after that `)`, or `None` if the scope is still
    /// open at the end of `text`.
    fn scan_scope<'a>(&mut self, text: &'a str) -> Option<&'a str> {
        for (i, c) in text.char_indices() {
            if self.quoted {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.quoted = false;
                }
                self.body.push(c);
                continue;
            }

            match c {
                '"' => self.quoted = true,
                '[' => self.brackets += 1,
                ']' => self.brackets = self.brackets.saturating_sub(1),
                '(' => self.parens += 1,
                ')' if self.parens > 0 => self.parens -= 1,
                ')' if self.brackets == 0 => return Some(&text[i + 1..]),
                _ => {}
            }
            self.body.push(c);
        }
        None
    }

    /// String literals never span lines; one still open at a line break
    /// marks the statement as unbalanced and is closed here.
    fn end_line(&mut self) {
        if self.quoted {
            self.unbalanced = true;
            self.quoted = false;
            self.escaped = false;
        }
    }

    /// True when no literal, list, or nested parenthesis is left open.
    fn is_balanced(&self) -> bool {
        !self.unbalanced && !self.quoted && self.brackets == 0 && self.parens == 0
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Outside,
    Scope(OpenStatement),
    Trailer(OpenStatement),
}

#[derive(Debug, Default)]
struct Parser {
    state: State,
    pending_id: Option<String>,
    report: ParseReport,
}

impl Parser {
    fn feed_line(&mut self, line_no: usize, raw: &str) {
        let mut rest = strip_comment(raw);
        if rest.trim().is_empty() {
            return;
        }

        // A fresh opener at the start of a line always abandons an
        // unterminated statement.
        if opener(rest.trim_start()).is_some() {
            if let State::Scope(stmt) | State::Trailer(stmt) = std::mem::take(&mut self.state) {
                self.discard(stmt.line, DiscardReason::Unterminated);
            }
        }

        // A line that is exactly `);` always ends the statement, even when a
        // literal or list inside it was never closed.
        if rest.trim() == ");" {
            if let State::Scope(stmt) = &self.state {
                if !stmt.is_balanced() {
                    if let State::Scope(stmt) = std::mem::take(&mut self.state) {
                        self.discard(stmt.line, DiscardReason::Unbalanced);
                    }
                    return;
                }
            }
        }

        loop {
            match std::mem::take(&mut self.state) {
                State::Outside => {
                    let trimmed = rest.trim_start();
                    if trimmed.is_empty() {
                        return;
                    }
                    if let Some((effect, after)) = opener(trimmed) {
                        trace!(line = line_no, ?effect, "statement opened");
                        let id = self.pending_id.take();
                        self.state = State::Scope(OpenStatement::new(effect, line_no, id));
                        rest = after;
                        continue;
                    }
                    if let Some(id) = annotation_id(trimmed) {
                        self.pending_id = Some(id);
                    } else {
                        trace!(line = line_no, "ignoring text outside a statement");
                    }
                    return;
                }

                State::Scope(mut stmt) => match stmt.scan_scope(rest) {
                    Some(after) => {
                        self.state = State::Trailer(stmt);
                        rest = after;
                    }
                    None => {
                        stmt.end_line();
                        stmt.body.push('\n');
                        self.state = State::Scope(stmt);
                        return;
                    }
                },

                State::Trailer(mut stmt) => match rest.find(';') {
                    Some(i) => {
                        stmt.tail.push_str(&rest[..i]);
                        self.close(stmt);
                        rest = &rest[i + 1..];
                    }
                    None => {
                        stmt.tail.push_str(rest);
                        stmt.tail.push('\n');
                        self.state = State::Trailer(stmt);
                        return;
                    }
                },
            }
        }
    }

    fn finish(mut self) -> ParseReport {
        if let State::Scope(stmt) | State::Trailer(stmt) = std::mem::take(&mut self.state) {
            self.discard(stmt.line, DiscardReason::Unterminated);
        }
        self.report
    }

    /// Turn a fully delimited statement into a rule, or discard it.
    fn close(&mut self, stmt: OpenStatement) {
        if stmt.unbalanced {
            self.discard(stmt.line, DiscardReason::Unbalanced);
            return;
        }

        let tail = stmt.tail.trim();
        if !tail.is_empty() {
            self.discard(stmt.line, DiscardReason::UnsupportedConditions(tail.to_string()));
            return;
        }

        let mut principal = None;
        let mut action = None;

        for clause in split_top_level(&stmt.body) {
            match classify(clause) {
                Clause::Principal(Some(c)) => principal = Some(c),
                Clause::Action(Some(c)) => action = Some(c),
                Clause::Resource => {}
                Clause::Principal(None) | Clause::Action(None) | Clause::Unknown => {
                    self.discard(stmt.line, DiscardReason::MalformedClause(clause.to_string()));
                    return;
                }
            }
        }

        if principal.is_none() && action.is_none() {
            self.discard(stmt.line, DiscardReason::NoConstraints);
            return;
        }

        let rule = Rule {
            id: stmt
                .id
                .unwrap_or_else(|| format!("policy{}", self.report.rules.len())),
            effect: stmt.effect,
            principal: principal.unwrap_or(PrincipalConstraint::Unconstrained),
            action: action.unwrap_or(ActionConstraint::Unconstrained),
            line: stmt.line,
        };

        debug!(
            rule_id = %rule.id,
            line = rule.line,
            effect = ?rule.effect,
            principal = ?rule.principal,
            action = ?rule.action,
            "rule parsed"
        );
        self.report.rules.push(rule);
    }

    fn discard(&mut self, line: usize, reason: DiscardReason) {
        warn!(line, %reason, "discarding policy statement");
        self.report.discarded.push(DiscardedBlock { line, reason });
    }
}

// ── Clause recognition ────────────────────────────────────────────────────────

enum Clause {
    /// `None` when the clause names the principal but cannot be understood.
    Principal(Option<PrincipalConstraint>),
    Action(Option<ActionConstraint>),
    Resource,
    Unknown,
}

fn classify(clause: &str) -> Clause {
    if let Some(rest) = keyword(clause, "principal") {
        return Clause::Principal(principal_constraint(rest));
    }
    if let Some(rest) = keyword(clause, "action") {
        return Clause::Action(action_constraint(rest));
    }
    if keyword(clause, "resource").is_some() {
        return Clause::Resource;
    }
    Clause::Unknown
}

fn principal_constraint(rest: &str) -> Option<PrincipalConstraint> {
    if rest.is_empty() {
        return Some(PrincipalConstraint::Unconstrained);
    }
    if let Some(target) = rest.strip_prefix("==") {
        return entity_id(target).map(PrincipalConstraint::ExactMatch);
    }
    if let Some(target) = keyword(rest, "in") {
        return entity_id(target).map(PrincipalConstraint::CategoryMatch);
    }
    None
}

fn action_constraint(rest: &str) -> Option<ActionConstraint> {
    if rest.is_empty() {
        return Some(ActionConstraint::Unconstrained);
    }
    if let Some(target) = rest.strip_prefix("==") {
        return entity_id(target).map(ActionConstraint::SingleAction);
    }
    let target = keyword(rest, "in")?;
    match target.strip_prefix('[') {
        Some(list) => {
            let inner = list.trim_end().strip_suffix(']')?;
            let names = split_top_level(inner)
                .into_iter()
                .map(entity_id)
                .collect::<Option<BTreeSet<String>>>()?;
            Some(ActionConstraint::ActionSet(names))
        }
        None => entity_id(target).map(ActionConstraint::SingleAction),
    }
}

/// If `text` starts with the keyword `kw` as a whole word, return the trimmed
/// remainder.
fn keyword<'a>(text: &'a str, kw: &str) -> Option<&'a str> {
    let rest = text.trim_start().strip_prefix(kw)?;
    let boundary = rest
        .chars()
        .next()
        .map_or(true, |c| c.is_whitespace() || c == '=' || c == '[' || c == '"');
    boundary.then(|| rest.trim())
}

/// Extract the quoted id from an entity reference such as
/// `NS::Client::"authenticated"`. The namespace path is stripped; at least
/// one path segment is required and nothing may follow the literal.
fn entity_id(text: &str) -> Option<String> {
    let text = text.trim();
    let quote = text.find('"')?;
    let path = text[..quote].trim_end().strip_suffix("::")?;
    let well_formed = path.split("::").all(|segment| {
        let segment = segment.trim();
        !segment.is_empty() && segment.chars().all(|c| c.is_alphanumeric() || c == '_')
    });
    if !well_formed {
        return None;
    }
    let (id, after) = string_literal(&text[quote..])?;
    after.trim().is_empty().then_some(id)
}

/// Parse a double-quoted literal at the start of `text`, returning its value
/// and the remainder after the closing quote.
fn string_literal(text: &str) -> Option<(String, &str)> {
    let body = text.strip_prefix('"')?;
    let mut value = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, &body[i + 1..])),
            '\\' => match chars.next()?.1 {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                other => value.push(other),
            },
            other => value.push(other),
        }
    }
    None
}

/// Split on commas that are outside string literals and `[...]` lists.
/// Pieces are trimmed; empty pieces (e.g. after a trailing comma) are dropped.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if quoted {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                quoted = false;
            }
            continue;
        }
        match c {
            '"' => quoted = true,
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Drop a trailing `//` comment that is not inside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    let mut prev_slash = false;

    for (i, c) in line.char_indices() {
        if quoted {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                quoted = false;
            }
            continue;
        }
        match c {
            '"' => {
                quoted = true;
                prev_slash = false;
            }
            '/' if prev_slash => return &line[..i - 1],
            '/' => prev_slash = true,
            _ => prev_slash = false,
        }
    }
    line
}

/// Recognize `permit(` / `forbid(` at the start of `text`.
fn opener(text: &str) -> Option<(Effect, &str)> {
    [("permit", Effect::Permit), ("forbid", Effect::Forbid)]
        .into_iter()
        .find_map(|(kw, effect)| {
            let after = text.strip_prefix(kw)?.trim_start().strip_prefix('(')?;
            Some((effect, after))
        })
}

/// Recognize an `@id("name")` annotation.
fn annotation_id(text: &str) -> Option<String> {
    let args = text.strip_prefix("@id")?.trim_start().strip_prefix('(')?;
    let (id, after) = string_literal(args.trim_start())?;
    after.trim_start().starts_with(')').then_some(id)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(names: &[&str]) -> ActionConstraint {
        ActionConstraint::ActionSet(names.iter().map(|s| s.to_string()).collect())
    }

    // ── 1. grammar forms ──────────────────────────────────────────────────────

    #[test]
    fn parses_multi_line_category_permit() {
        let doc = r#"
permit(
    principal in Trading::Client::"authenticated",
    action in Trading::Action::"trade",
    resource
);
"#;
        let rules = parse(doc);

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.effect, Effect::Permit);
        assert_eq!(rule.principal, PrincipalConstraint::CategoryMatch("authenticated".into()));
        assert_eq!(rule.action, ActionConstraint::SingleAction("trade".into()));
        assert_eq!(rule.line, 2);
        assert_eq!(rule.id, "policy0");
    }

    #[test]
    fn parses_exact_principal_and_action_list() {
        let doc = r#"
forbid(
    principal == NS::Client::"mallory",
    action in [NS::Action::"A", NS::Action::"B"],
    resource
);
"#;
        let rules = parse(doc);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].effect, Effect::Forbid);
        assert_eq!(rules[0].principal, PrincipalConstraint::ExactMatch("mallory".into()));
        assert_eq!(rules[0].action, actions(&["A", "B"]));
    }

    #[test]
    fn in_and_eq_are_equivalent_for_single_actions() {
        let doc = r#"
permit(principal, action in NS::Action::"trade", resource);
permit(principal, action == NS::Action::"trade", resource);
"#;
        let rules = parse(doc);

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].action, rules[1].action);
    }

    #[test]
    fn parses_single_line_statements() {
        let doc = r#"permit(principal in NS::Client::"authenticated", action == NS::Action::"trade", resource);"#;
        let rules = parse(doc);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].principal, PrincipalConstraint::CategoryMatch("authenticated".into()));
        assert_eq!(rules[0].action, ActionConstraint::SingleAction("trade".into()));
    }

    #[test]
    fn bare_statement_is_explicitly_unconstrained() {
        let rules = parse("forbid(principal, action, resource);");

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].effect, Effect::Forbid);
        assert_eq!(rules[0].principal, PrincipalConstraint::Unconstrained);
        assert_eq!(rules[0].action, ActionConstraint::Unconstrained);
    }

    #[test]
    fn action_list_may_span_lines() {
        let doc = r#"
permit(
    principal,
    action in [
        NS::Action::"read",
        NS::Action::"trade",
    ],
    resource
);
"#;
        let rules = parse(doc);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].action, actions(&["read", "trade"]));
    }

    #[test]
    fn namespace_paths_of_any_depth_are_stripped() {
        let rules = parse(r#"permit(principal in Acme::Trading::Client::"desk", action, resource);"#);

        assert_eq!(rules[0].principal, PrincipalConstraint::CategoryMatch("desk".into()));
    }

    #[test]
    fn resource_constraints_are_accepted_and_ignored() {
        let rules = parse(
            r#"permit(principal, action == NS::Action::"read", resource in NS::Account::"acct-1");"#,
        );

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].action, ActionConstraint::SingleAction("read".into()));
    }

    #[test]
    fn last_occurrence_of_a_slot_wins() {
        let doc = r#"
permit(
    action == NS::Action::"read",
    principal,
    action == NS::Action::"trade",
    resource
);
"#;
        let rules = parse(doc);

        assert_eq!(rules[0].action, ActionConstraint::SingleAction("trade".into()));
    }

    // ── 2. comments, garbage, annotations ─────────────────────────────────────

    #[test]
    fn comments_blank_lines_and_garbage_are_skipped() {
        let doc = r#"
// Generated for agent-42
Here is the policy you asked for:

permit(
    // only signed-in clients
    principal in NS::Client::"authenticated", // trailing comment
    action == NS::Action::"read",
    resource
);

Let me know if you need anything else.
"#;
        let report = parse_report(doc);

        assert_eq!(report.rules.len(), 1);
        assert!(report.discarded.is_empty());
    }

    #[test]
    fn comment_markers_inside_literals_are_kept() {
        let rules = parse(r#"permit(principal == NS::Client::"https://idp/x", action, resource);"#);

        assert_eq!(rules[0].principal, PrincipalConstraint::ExactMatch("https://idp/x".into()));
    }

    #[test]
    fn id_annotation_names_the_next_statement() {
        let doc = r#"
@id("allow-reads")
permit(principal, action == NS::Action::"read", resource);
permit(principal, action == NS::Action::"list", resource);
"#;
        let rules = parse(doc);

        assert_eq!(rules[0].id, "allow-reads");
        assert_eq!(rules[1].id, "policy1");
    }

    // ── 3. malformed blocks ───────────────────────────────────────────────────

    #[test]
    fn unterminated_block_before_good_rule_is_discarded() {
        let doc = r#"
permit(
    principal in NS::Client::"guest",
    action == NS::Action::"trade",
permit(
    principal in NS::Client::"authenticated",
    action == NS::Action::"read",
    resource
);
"#;
        let report = parse_report(doc);

        assert_eq!(report.rules.len(), 1);
        assert_eq!(
            report.rules[0].principal,
            PrincipalConstraint::CategoryMatch("authenticated".into())
        );
        assert_eq!(
            report.discarded,
            vec![DiscardedBlock { line: 2, reason: DiscardReason::Unterminated }]
        );
    }

    #[test]
    fn unclosed_quote_does_not_swallow_later_forbid() {
        let doc = r#"
permit(principal, action == NS::Action::"trade", resource);
permit(
    principal == NS::Client::"x,
    action == NS::Action::"read",
    resource
);
forbid(principal, action == NS::Action::"trade", resource);
"#;
        let report = parse_report(doc);

        assert_eq!(report.rules.len(), 2);
        assert_eq!(report.rules[1].effect, Effect::Forbid);
        assert_eq!(
            report.discarded,
            vec![DiscardedBlock { line: 3, reason: DiscardReason::Unbalanced }]
        );
    }

    #[test]
    fn unclosed_list_does_not_swallow_later_forbid() {
        let doc = r#"
permit(principal, action == NS::Action::"trade", resource);
permit(
    principal,
    action in [NS::Action::"read", NS::Action::"list",
    resource
);
forbid(principal, action == NS::Action::"trade", resource);
"#;
        let report = parse_report(doc);

        assert_eq!(report.rules.len(), 2);
        assert_eq!(report.rules[1].effect, Effect::Forbid);
        assert_eq!(report.discarded[0].reason, DiscardReason::Unbalanced);
    }

    #[test]
    fn unclosed_quote_without_terminator_is_abandoned_by_next_opener() {
        let doc = r#"
permit(
    principal == NS::Client::"x,
forbid(principal, action, resource);
"#;
        let report = parse_report(doc);

        assert_eq!(report.rules.len(), 1);
        assert_eq!(report.rules[0].effect, Effect::Forbid);
        assert_eq!(report.discarded[0].reason, DiscardReason::Unterminated);
    }

    #[test]
    fn unterminated_block_at_end_is_discarded() {
        let doc = r#"
permit(principal in NS::Client::"authenticated", action == NS::Action::"read", resource);
forbid(
    principal,
    action == NS::Action::"trade"
"#;
        let report = parse_report(doc);

        assert_eq!(report.rules.len(), 1);
        assert_eq!(report.rules[0].effect, Effect::Permit);
        assert_eq!(report.discarded.len(), 1);
        assert_eq!(report.discarded[0].reason, DiscardReason::Unterminated);
    }

    #[test]
    fn missing_semicolon_is_unterminated() {
        let doc = "permit(principal, action, resource)\nforbid(principal, action, resource);";
        let report = parse_report(doc);

        assert_eq!(report.rules.len(), 1);
        assert_eq!(report.rules[0].effect, Effect::Forbid);
        assert_eq!(report.discarded[0].reason, DiscardReason::Unterminated);
    }

    #[test]
    fn statement_without_principal_or_action_is_discarded() {
        let report = parse_report("permit(resource);\npermit();");

        assert!(report.rules.is_empty());
        assert_eq!(report.discarded.len(), 2);
        assert!(report
            .discarded
            .iter()
            .all(|d| d.reason == DiscardReason::NoConstraints));
    }

    #[test]
    fn garbled_principal_discards_whole_block() {
        let report = parse_report(
            r#"permit(principal in authenticated, action == NS::Action::"trade", resource);"#,
        );

        assert!(report.rules.is_empty());
        assert!(matches!(
            report.discarded[0].reason,
            DiscardReason::MalformedClause(ref c) if c.contains("principal in authenticated")
        ));
    }

    #[test]
    fn garbled_action_list_discards_whole_block() {
        let report = parse_report(
            r#"permit(principal, action in [NS::Action::"A", B], resource);"#,
        );

        assert!(report.rules.is_empty());
        assert_eq!(report.discarded.len(), 1);
    }

    #[test]
    fn unknown_clause_discards_whole_block() {
        let report = parse_report(r#"permit(principl, action == NS::Action::"trade", resource);"#);

        assert!(report.rules.is_empty());
        assert_eq!(
            report.discarded[0].reason,
            DiscardReason::MalformedClause("principl".into())
        );
    }

    #[test]
    fn conditions_are_not_silently_dropped() {
        let doc = r#"
permit(principal, action == NS::Action::"trade", resource)
when { context.amount < 100 };
"#;
        let report = parse_report(doc);

        assert!(report.rules.is_empty());
        assert!(matches!(
            report.discarded[0].reason,
            DiscardReason::UnsupportedConditions(_)
        ));
    }

    // ── 4. ordering & determinism ─────────────────────────────────────────────

    #[test]
    fn rules_keep_document_order() {
        let doc = r#"
permit(principal, action == NS::Action::"a", resource);
forbid(principal, action == NS::Action::"b", resource);
permit(principal, action == NS::Action::"c", resource); forbid(principal, action == NS::Action::"d", resource);
"#;
        let names: Vec<_> = parse(doc)
            .into_iter()
            .map(|r| match r.action {
                ActionConstraint::SingleAction(n) => n,
                other => panic!("unexpected action {:?}", other),
            })
            .collect();

        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn parsing_is_deterministic() {
        let doc = r#"
permit(principal in NS::Client::"authenticated", action in [NS::Action::"B", NS::Action::"A"], resource);
forbid(principal == NS::Client::"mallory", action, resource);
"#;
        assert_eq!(parse(doc), parse(doc));
    }

    #[test]
    fn empty_document_yields_no_rules() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n// nothing here\n").is_empty());
    }

    // ── 5. opening-token floor ────────────────────────────────────────────────

    #[test]
    fn detects_opening_tokens() {
        assert!(contains_opening_token("permit(principal, action, resource);"));
        assert!(contains_opening_token("prose first\nforbid (\n"));
        assert!(!contains_opening_token("I'm sorry, I cannot generate a policy."));
        assert!(!contains_opening_token("permits are issued by the forbidden city"));
    }
}
