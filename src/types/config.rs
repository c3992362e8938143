use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::error::HookError;
use super::field::{default_operators, Entity, FieldConfig};
use super::ruleset::RuleSet;
use super::schema::{NamedRulesetResolver, Schema};

/// Replaces a field's operator list.
pub type OperatorsHook =
    Arc<dyn Fn(&str, &FieldConfig) -> Result<Vec<String>, HookError> + Send + Sync>;

/// The concrete [`Schema`]: a field map plus optional hooks.
///
/// The serializable part loads from the query builder's JSON config; hooks are
/// attached through [`QueryConfigBuilder`].
///
/// # Example
///
/// ```
/// use bql::{FieldConfig, FieldType, QueryConfig, validate_bql};
///
/// let config = QueryConfig::builder()
///     .field("age", FieldConfig::new("Age", FieldType::Number))
///     .field("sign", FieldConfig::new("Sign", FieldType::Category).options(&["aries", "leo"]))
///     .build();
///
/// assert!(validate_bql("age>30 & sign=leo", &config));
/// assert!(!validate_bql("sign=virgo", &config));
/// ```
#[derive(Clone)]
pub struct QueryConfig {
    pub fields: HashMap<String, FieldConfig>,
    pub entities: Option<HashMap<String, Entity>>,
    pub allow_empty_rulesets: bool,
    pub strict_values: bool,
    get_operators: Option<OperatorsHook>,
    resolver: Option<Arc<dyn NamedRulesetResolver + Send + Sync>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    fields: HashMap<String, FieldConfig>,
    #[serde(default)]
    entities: Option<HashMap<String, Entity>>,
    #[serde(default = "default_true")]
    allow_empty_rulesets: bool,
    #[serde(default)]
    strict_values: bool,
}

fn default_true() -> bool {
    true
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            fields: HashMap::new(),
            entities: None,
            allow_empty_rulesets: true,
            strict_values: false,
            get_operators: None,
            resolver: None,
        }
    }
}

impl QueryConfig {
    #[must_use]
    pub fn builder() -> QueryConfigBuilder {
        QueryConfigBuilder::new()
    }

    /// Load fields and switches from the query builder's JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`BqlError::Json`](crate::BqlError::Json) on malformed input.
    pub fn from_json(input: &str) -> Result<Self, crate::BqlError> {
        let raw: RawConfig = serde_json::from_str(input)?;
        Ok(Self {
            fields: raw.fields,
            entities: raw.entities,
            allow_empty_rulesets: raw.allow_empty_rulesets,
            strict_values: raw.strict_values,
            get_operators: None,
            resolver: None,
        })
    }

    /// Read a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`BqlError`](crate::BqlError) on I/O or JSON failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::BqlError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    /// Turn this config back into a builder to attach hooks.
    #[must_use]
    pub fn into_builder(self) -> QueryConfigBuilder {
        QueryConfigBuilder { config: self }
    }
}

impl Schema for QueryConfig {
    fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.get(name)
    }

    fn operators(&self, field: &str, config: &FieldConfig) -> Option<Result<Vec<String>, HookError>> {
        self.get_operators.as_ref().map(|hook| hook(field, config))
    }

    fn resolver(&self) -> Option<&dyn NamedRulesetResolver> {
        let resolver: &dyn NamedRulesetResolver = self.resolver.as_deref()?;
        Some(resolver)
    }

    fn has_entities(&self) -> bool {
        self.entities.is_some()
    }

    fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.as_ref()?.get(name)
    }

    fn allow_empty_rulesets(&self) -> bool {
        self.allow_empty_rulesets
    }

    fn strict_values(&self) -> bool {
        self.strict_values
    }
}

impl fmt::Debug for QueryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryConfig")
            .field("fields", &self.fields)
            .field("entities", &self.entities)
            .field("allow_empty_rulesets", &self.allow_empty_rulesets)
            .field("strict_values", &self.strict_values)
            .field("get_operators", &self.get_operators.is_some())
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Builder for [`QueryConfig`].
#[derive(Debug)]
pub struct QueryConfigBuilder {
    config: QueryConfig,
}

impl Default for QueryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: QueryConfig::default(),
        }
    }

    /// Add or replace a field.
    #[must_use]
    pub fn field(mut self, key: &str, field: FieldConfig) -> Self {
        self.config.fields.insert(key.to_owned(), field);
        self
    }

    /// Declare an entity. The first call switches entity checking on.
    #[must_use]
    pub fn entity(mut self, key: &str, entity: Entity) -> Self {
        self.config
            .entities
            .get_or_insert_with(HashMap::new)
            .insert(key.to_owned(), entity);
        self
    }

    /// Override operator lists for every field.
    #[must_use]
    pub fn operators(
        mut self,
        f: impl Fn(&str, &FieldConfig) -> Result<Vec<String>, HookError> + Send + Sync + 'static,
    ) -> Self {
        self.config.get_operators = Some(Arc::new(f));
        self
    }

    /// Derive operator lists from field types for fields that declare none.
    /// See [`default_operators`].
    #[must_use]
    pub fn default_operators(self) -> Self {
        self.operators(|_, field| Ok(default_operators(field)))
    }

    /// Attach a named-ruleset store.
    #[must_use]
    pub fn resolver(mut self, resolver: impl NamedRulesetResolver + Send + Sync + 'static) -> Self {
        self.config.resolver = Some(Arc::new(resolver));
        self
    }

    /// Attach an in-memory map of named rulesets.
    #[must_use]
    pub fn named_rulesets(self, rulesets: impl IntoIterator<Item = (String, RuleSet)>) -> Self {
        let map: HashMap<String, RuleSet> = rulesets.into_iter().collect();
        self.resolver(map)
    }

    #[must_use]
    pub fn allow_empty_rulesets(mut self, allow: bool) -> Self {
        self.config.allow_empty_rulesets = allow;
        self
    }

    #[must_use]
    pub fn strict_values(mut self, strict: bool) -> Self {
        self.config.strict_values = strict;
        self
    }

    #[must_use]
    pub fn build(self) -> QueryConfig {
        self.config
    }
}
