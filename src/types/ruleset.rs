use std::fmt;

use serde::{Deserialize, Serialize};

use super::rule::Rule;

/// Logical combinator of a [`RuleSet`]'s children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[default]
    And,
    Or,
}

impl Condition {
    /// Binding strength: `or` binds less tightly than `and`.
    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            Condition::Or => 1,
            Condition::And => 2,
        }
    }

    /// The infix joiner used when rendering BQL.
    #[must_use]
    pub fn joiner(self) -> &'static str {
        match self {
            Condition::And => " & ",
            Condition::Or => " | ",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::And => write!(f, "and"),
            Condition::Or => write!(f, "or"),
        }
    }
}

/// A child of a [`RuleSet`]: either a leaf rule or a nested ruleset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Rule(Rule),
    RuleSet(RuleSet),
}

impl Node {
    #[must_use]
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Node::Rule(rule) => Some(rule),
            Node::RuleSet(_) => None,
        }
    }

    #[must_use]
    pub fn as_ruleset(&self) -> Option<&RuleSet> {
        match self {
            Node::RuleSet(rs) => Some(rs),
            Node::Rule(_) => None,
        }
    }
}

impl From<Rule> for Node {
    fn from(rule: Rule) -> Self {
        Node::Rule(rule)
    }
}

impl From<RuleSet> for Node {
    fn from(rs: RuleSet) -> Self {
        Node::RuleSet(rs)
    }
}

/// A boolean query tree node, in the JSON shape the query builder exchanges.
///
/// A node with `name` set is a reference to a named ruleset stored outside
/// this crate. Its `rules` hold the expanded definition when the reference
/// was resolved at parse time, and are empty otherwise. `is_child` records
/// that the node was written with explicit parentheses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub condition: Condition,
    pub rules: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub not: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_child: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

impl RuleSet {
    /// An empty ruleset combining its children with `condition`.
    #[must_use]
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            ..Self::default()
        }
    }

    /// A ruleset holding `rules` under `condition`.
    #[must_use]
    pub fn with_rules(condition: Condition, rules: Vec<Node>) -> Self {
        Self {
            condition,
            rules,
            ..Self::default()
        }
    }

    /// The placeholder for a named reference with no stored definition.
    #[must_use]
    pub fn reference(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Self::default()
        }
    }

    /// Set the negation flag.
    #[must_use]
    pub fn negated(mut self, not: bool) -> Self {
        self.not = not;
        self
    }

    /// Set the name, turning this node into a named ruleset.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    /// Whether this node carries none of `not`, `name` or `is_child`, and so
    /// may be merged into or dissolved by its surroundings.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        !self.not && self.name.is_none() && !self.is_child
    }

    /// A ruleset that is, ignoring names, a single rule or a chain of
    /// single-child wrappers around one. Negated nodes are never atomic.
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        if self.not || self.rules.len() != 1 {
            return false;
        }
        match &self.rules[0] {
            Node::Rule(_) => true,
            Node::RuleSet(inner) => inner.is_atomic(),
        }
    }

    /// Every named-ruleset name referenced in this tree, in first-seen order,
    /// without duplicates. Includes this node's own name.
    #[must_use]
    pub fn named_references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_names(self, &mut out);
        out
    }

    /// Parse a ruleset from the query builder's JSON shape.
    ///
    /// # Errors
    ///
    /// Returns [`BqlError::Json`](crate::BqlError::Json) on malformed JSON.
    pub fn from_json(input: &str) -> Result<Self, crate::BqlError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Serialize to the query builder's JSON shape.
    ///
    /// # Errors
    ///
    /// Returns [`BqlError::Json`](crate::BqlError::Json) if serialization fails.
    pub fn to_json(&self) -> Result<String, crate::BqlError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn collect_names<'a>(rs: &'a RuleSet, out: &mut Vec<&'a str>) {
    if let Some(name) = rs.name.as_deref() {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    for child in &rs.rules {
        if let Node::RuleSet(inner) = child {
            collect_names(inner, out);
        }
    }
}
