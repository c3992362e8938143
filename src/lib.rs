//! BQL: a compact textual language for query-builder rulesets.
//!
//! ```
//! use bql::{bql_to_ruleset, ruleset_to_bql, Condition, QueryConfig};
//!
//! let config = QueryConfig::default();
//! let tree = bql_to_ruleset("(fname=bill | fname=john) & foo", &config).unwrap();
//! assert_eq!(tree.condition, Condition::And);
//! assert_eq!(ruleset_to_bql(&tree, &config), "(fname=bill | fname=john) & foo");
//! ```

pub mod coerce;
mod error;
pub mod parse;
mod serialize;
mod types;
mod validate;

pub use error::BqlError;
pub use parse::{ParseError, ParseInfo};
pub use serialize::ruleset_to_bql;
pub use types::{
    default_operators, is_list_operator, is_unary_operator, CategorySource, Condition, Entity,
    FieldConfig, FieldOption, FieldType, HookError, NamedRulesetResolver, Node, OperatorsHook,
    QueryConfig, QueryConfigBuilder, Rule, RuleSet, RuleValidator, Schema, Value, DOCUMENT_FIELD,
    UNARY_OPERATORS,
};
pub use validate::{validate_bql, validate_ruleset};

/// Parse BQL text into a ruleset tree.
///
/// Parsing stops at the first token that cannot continue the expression;
/// use [`bql_to_ruleset_with_info`] or [`validate_bql`] to detect trailing input.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid BQL syntax.
pub fn bql_to_ruleset<S: Schema + ?Sized>(text: &str, schema: &S) -> Result<RuleSet, ParseError> {
    parse::parse(text, schema).map(|(tree, _)| tree)
}

/// Like [`bql_to_ruleset`], also reporting how many tokens were consumed.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid BQL syntax.
pub fn bql_to_ruleset_with_info<S: Schema + ?Sized>(
    text: &str,
    schema: &S,
) -> Result<(RuleSet, ParseInfo), ParseError> {
    parse::parse(text, schema)
}
