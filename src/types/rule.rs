use serde::{Deserialize, Serialize};

use super::value::Value;

/// Operators that test for absence of a value and carry none themselves.
pub const UNARY_OPERATORS: &[&str] = &["is null", "is not null"];

/// Field of the implicit full-text rule produced by a bare literal.
pub const DOCUMENT_FIELD: &str = "document";

/// A leaf comparison: `field operator value`.
///
/// `value` is `None` only for the unary null tests. `entity` is carried for the
/// query builder's entity grouping and is never produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub field: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl Rule {
    /// Build a rule with a value.
    #[must_use]
    pub fn new(field: &str, operator: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_owned(),
            operator: operator.to_owned(),
            value: Some(value.into()),
            entity: None,
        }
    }

    /// Build a value-less rule such as `school is null`.
    #[must_use]
    pub fn unary(field: &str, operator: &str) -> Self {
        Self {
            field: field.to_owned(),
            operator: operator.to_owned(),
            value: None,
            entity: None,
        }
    }

    /// The implicit full-text search rule: `document contains <value>`.
    #[must_use]
    pub fn document(value: impl Into<Value>) -> Self {
        Self::new(DOCUMENT_FIELD, "contains", value)
    }

    /// Whether this is the `document contains` shape written as a bare literal.
    #[must_use]
    pub fn is_document_search(&self) -> bool {
        self.field == DOCUMENT_FIELD && self.operator.eq_ignore_ascii_case("contains")
    }

    /// Whether the operator takes a value list.
    #[must_use]
    pub fn is_list_operator(&self) -> bool {
        is_list_operator(&self.operator)
    }
}

/// Whether `op` is `in` or `not in`.
#[must_use]
pub fn is_list_operator(op: &str) -> bool {
    op == "in" || op == "not in"
}

/// Whether `op` is one of the value-less null tests.
#[must_use]
pub fn is_unary_operator(op: &str) -> bool {
    UNARY_OPERATORS.contains(&op)
}
