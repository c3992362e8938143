mod config;
mod error;
mod field;
mod rule;
mod ruleset;
mod schema;
mod value;

pub use config::{OperatorsHook, QueryConfig, QueryConfigBuilder};
pub use error::HookError;
pub use field::{
    default_operators, CategorySource, Entity, FieldConfig, FieldOption, FieldType, RuleValidator,
};
pub use rule::{is_list_operator, is_unary_operator, Rule, DOCUMENT_FIELD, UNARY_OPERATORS};
pub use ruleset::{Condition, Node, RuleSet};
pub(crate) use schema::resolve_named;
pub use schema::{NamedRulesetResolver, Schema};
pub use value::Value;
