//! Schema-driven validation of BQL text and ruleset trees.
//!
//! Validation never fails loudly: every malformed input, unknown field,
//! rejected value and failing schema callback yields `false`. The reason is
//! logged at `debug` level.

use tracing::debug;

use crate::types::resolve_named;
use crate::{
    is_list_operator, is_unary_operator, FieldConfig, FieldType, Node, Rule, RuleSet, Schema, Value,
};

/// Whether `text` is a complete, valid BQL query for `schema`.
///
/// The text must parse, the parser must consume every token, and the
/// resulting tree must pass [`validate_ruleset`].
#[must_use]
pub fn validate_bql<S: Schema + ?Sized>(text: &str, schema: &S) -> bool {
    let (tree, info) = match crate::parse::parse(text, schema) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!(error = %err, "bql does not parse");
            return false;
        }
    };
    if !info.is_complete() {
        debug!(
            consumed = info.consumed,
            total = info.total,
            "bql has trailing input"
        );
        return false;
    }
    validate_ruleset(&tree, schema)
}

/// Whether every rule and named reference in `rs` is valid against `schema`.
#[must_use]
pub fn validate_ruleset<S: Schema + ?Sized>(rs: &RuleSet, schema: &S) -> bool {
    check_ruleset(rs, schema)
}

fn check_ruleset<S: Schema + ?Sized>(rs: &RuleSet, schema: &S) -> bool {
    if let Some(name) = &rs.name {
        if resolve_named(schema, name).is_none() {
            debug!(name = %name, "named ruleset does not resolve");
            return false;
        }
    } else if rs.rules.is_empty() && !schema.allow_empty_rulesets() {
        debug!("empty ruleset");
        return false;
    }

    rs.rules.iter().all(|child| match child {
        Node::Rule(rule) => check_rule(rule, rs, schema),
        Node::RuleSet(inner) => check_ruleset(inner, schema),
    })
}

fn check_rule<S: Schema + ?Sized>(rule: &Rule, parent: &RuleSet, schema: &S) -> bool {
    let Some(config) = schema.field(&rule.field) else {
        debug!(field = %rule.field, "unknown field");
        return false;
    };

    let operators = effective_operators(schema, &rule.field, config);
    if !operators.is_empty() && !operators.iter().any(|op| *op == rule.operator) {
        debug!(field = %rule.field, operator = %rule.operator, "operator not allowed");
        return false;
    }

    let list_op = is_list_operator(&rule.operator);
    if is_unary_operator(&rule.operator) {
        if rule.value.is_some() {
            debug!(field = %rule.field, operator = %rule.operator, "null test carries a value");
            return false;
        }
    } else if rule.value.is_none() {
        debug!(field = %rule.field, operator = %rule.operator, "missing value");
        return false;
    }

    if list_op && !rule.value.as_ref().and_then(Value::as_list).is_some_and(|l| !l.is_empty()) {
        debug!(field = %rule.field, "IN operator needs a non-empty list");
        return false;
    }

    if let Some(allowed) = allowed_values(config, rule, parent) {
        let within = match (&rule.value, list_op) {
            (Some(Value::List(items)), true) => items.iter().all(|v| allowed.contains(v)),
            (Some(value), false) => allowed.contains(value),
            (None, _) => true,
            (Some(_), true) => false,
        };
        if !within {
            debug!(field = %rule.field, "value outside allowed values");
            return false;
        }
    }

    if let Some(validator) = &config.validator {
        match validator(rule, parent) {
            Ok(true) => {}
            Ok(false) => {
                debug!(field = %rule.field, "rejected by field validator");
                return false;
            }
            Err(err) => {
                debug!(field = %rule.field, error = %err, "field validator failed");
                return false;
            }
        }
    }

    if schema.has_entities() {
        if let Some(entity) = &rule.entity {
            if schema.entity(entity).is_none() {
                debug!(entity = %entity, "unknown entity");
                return false;
            }
        }
    }

    if schema.strict_values() {
        if let Some(value) = &rule.value {
            if !value_matches_type(value, config.field_type, list_op) {
                debug!(field = %rule.field, "value does not match field type");
                return false;
            }
        }
    }

    true
}

/// The schema's operator override, falling back to the field's declared
/// operators when there is no override or it fails.
fn effective_operators<S: Schema + ?Sized>(schema: &S, field: &str, config: &FieldConfig) -> Vec<String> {
    let declared = || config.operators.clone().unwrap_or_default();
    match schema.operators(field, config) {
        Some(Ok(ops)) => ops,
        Some(Err(err)) => {
            debug!(field, error = %err, "operator override failed");
            declared()
        }
        None => declared(),
    }
}

/// Fixed options, replaced by a non-empty dynamic category list. `None` when
/// the field does not restrict its values.
fn allowed_values(config: &FieldConfig, rule: &Rule, parent: &RuleSet) -> Option<Vec<Value>> {
    let mut allowed = config.option_values();
    if let Some(source) = &config.category_source {
        match source(rule, parent) {
            Ok(Some(categories)) if !categories.is_empty() => allowed = Some(categories),
            Ok(_) => {}
            Err(err) => debug!(field = %rule.field, error = %err, "category source failed"),
        }
    }
    allowed.filter(|values| !values.is_empty())
}

fn value_matches_type(value: &Value, field_type: FieldType, list_op: bool) -> bool {
    if list_op {
        return match value {
            Value::List(items) => items.iter().all(|v| value_matches_type(v, field_type, false)),
            _ => false,
        };
    }
    match field_type {
        FieldType::String | FieldType::Textarea => matches!(value, Value::String(_)),
        FieldType::Number => matches!(value, Value::Number(n) if n.is_finite()),
        FieldType::Boolean => matches!(value, Value::Bool(_)),
        FieldType::Date => matches!(value, Value::Date(_)),
        FieldType::Time => value.as_str().is_some_and(is_time),
        FieldType::Multiselect => matches!(value, Value::List(_)),
        FieldType::Category | FieldType::Other => true,
    }
}

/// `HH:MM` or `HH:MM:SS`.
fn is_time(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    (parts.len() == 2 || parts.len() == 3)
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_digit()))
}
