use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::HookError;
use super::rule::Rule;
use super::ruleset::RuleSet;
use super::value::Value;

/// Computes the allowed values of a category field for one rule, given the
/// ruleset that contains it. `Ok(None)` or an empty list means "no restriction".
pub type CategorySource =
    Arc<dyn Fn(&Rule, &RuleSet) -> Result<Option<Vec<Value>>, HookError> + Send + Sync>;

/// Custom per-field check. `Ok(false)` rejects the rule.
pub type RuleValidator = Arc<dyn Fn(&Rule, &RuleSet) -> Result<bool, HookError> + Send + Sync>;

/// Declared type of a field. Drives value coercion and default operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Time,
    Category,
    Textarea,
    Multiselect,
    /// Any type name this crate has no special handling for.
    #[serde(other)]
    Other,
}

/// One entry of a field's fixed option list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub name: String,
    pub value: Value,
}

/// A group of fields in the query builder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_field: Option<String>,
}

/// Schema entry for one field: its type and the vocabulary it accepts.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Display name.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operators: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip)]
    pub category_source: Option<CategorySource>,
    #[serde(skip)]
    pub validator: Option<RuleValidator>,
}

impl FieldConfig {
    #[must_use]
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_owned(),
            field_type,
            ..Self::default()
        }
    }

    /// Restrict the operators this field accepts.
    #[must_use]
    pub fn operators(mut self, ops: &[&str]) -> Self {
        self.operators = Some(ops.iter().map(|&op| op.to_owned()).collect());
        self
    }

    /// Give the field a fixed option list; option names double as values.
    #[must_use]
    pub fn options<V: Into<Value> + Clone>(mut self, values: &[V]) -> Self {
        self.options = Some(
            values
                .iter()
                .map(|v| {
                    let value: Value = v.clone().into();
                    let name = match &value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    FieldOption { name, value }
                })
                .collect(),
        );
        self
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn entity(mut self, entity: &str) -> Self {
        self.entity = Some(entity.to_owned());
        self
    }

    #[must_use]
    pub fn category_source(
        mut self,
        f: impl Fn(&Rule, &RuleSet) -> Result<Option<Vec<Value>>, HookError> + Send + Sync + 'static,
    ) -> Self {
        self.category_source = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn validator(
        mut self,
        f: impl Fn(&Rule, &RuleSet) -> Result<bool, HookError> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(f));
        self
    }

    /// Values of the fixed option list, if any.
    #[must_use]
    pub fn option_values(&self) -> Option<Vec<Value>> {
        self.options
            .as_ref()
            .map(|opts| opts.iter().map(|o| o.value.clone()).collect())
    }
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("operators", &self.operators)
            .field("options", &self.options)
            .field("nullable", &self.nullable)
            .field("entity", &self.entity)
            .field("default_value", &self.default_value)
            .field("category_source", &self.category_source.is_some())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Operators a field accepts when it declares none, derived from its type.
/// Nullable fields additionally accept `is null` and `is not null`. A declared
/// list is returned as is.
#[must_use]
pub fn default_operators(field: &FieldConfig) -> Vec<String> {
    if let Some(declared) = &field.operators {
        return declared.clone();
    }
    let by_type: &[&str] = match field.field_type {
        FieldType::String => &["=", "!=", "contains", "like"],
        FieldType::Number | FieldType::Time | FieldType::Date => &["=", "!=", ">", ">=", "<", "<="],
        FieldType::Category => &["=", "!=", "in", "not in"],
        FieldType::Boolean => &["="],
        FieldType::Multiselect => &["in", "not in"],
        FieldType::Textarea | FieldType::Other => &[],
    };
    let mut ops: Vec<String> = by_type.iter().map(|&op| op.to_owned()).collect();
    if field.nullable {
        ops.extend(super::rule::UNARY_OPERATORS.iter().map(|&op| op.to_owned()));
    }
    ops
}
