use std::collections::HashMap;

use super::error::HookError;
use super::field::{Entity, FieldConfig};
use super::ruleset::RuleSet;

/// Looks up stored named rulesets by name.
///
/// `Ok(None)` means "no such ruleset". Errors are treated the same way.
pub trait NamedRulesetResolver {
    /// Return the stored definition for `name`.
    ///
    /// # Errors
    ///
    /// Implementations may fail; callers treat failure as "not found".
    fn resolve(&self, name: &str) -> Result<Option<RuleSet>, HookError>;
}

impl NamedRulesetResolver for HashMap<String, RuleSet> {
    fn resolve(&self, name: &str) -> Result<Option<RuleSet>, HookError> {
        Ok(self.get(name).cloned())
    }
}

impl<F> NamedRulesetResolver for F
where
    F: Fn(&str) -> Result<Option<RuleSet>, HookError>,
{
    fn resolve(&self, name: &str) -> Result<Option<RuleSet>, HookError> {
        self(name)
    }
}

/// The vocabulary the parser and validator check queries against.
///
/// Only [`field`](Schema::field) is required. Every other method is an
/// optional capability; the defaults describe a schema without it.
pub trait Schema {
    /// Configuration of the named field.
    fn field(&self, name: &str) -> Option<&FieldConfig>;

    /// Override of the operator list for a field. `None` means no override,
    /// in which case the field's declared operators apply.
    fn operators(&self, _field: &str, _config: &FieldConfig) -> Option<Result<Vec<String>, HookError>> {
        None
    }

    /// The named-ruleset store, if this schema has one.
    fn resolver(&self) -> Option<&dyn NamedRulesetResolver> {
        None
    }

    /// Whether this schema declares entities. When it does, a rule's `entity`
    /// must name one of them.
    fn has_entities(&self) -> bool {
        false
    }

    fn entity(&self, _name: &str) -> Option<&Entity> {
        None
    }

    /// Whether unnamed rulesets without children are acceptable.
    fn allow_empty_rulesets(&self) -> bool {
        true
    }

    /// Whether rule values must match the declared field type.
    fn strict_values(&self) -> bool {
        false
    }
}

impl<S: Schema + ?Sized> Schema for &S {
    fn field(&self, name: &str) -> Option<&FieldConfig> {
        (**self).field(name)
    }

    fn operators(&self, field: &str, config: &FieldConfig) -> Option<Result<Vec<String>, HookError>> {
        (**self).operators(field, config)
    }

    fn resolver(&self) -> Option<&dyn NamedRulesetResolver> {
        (**self).resolver()
    }

    fn has_entities(&self) -> bool {
        (**self).has_entities()
    }

    fn entity(&self, name: &str) -> Option<&Entity> {
        (**self).entity(name)
    }

    fn allow_empty_rulesets(&self) -> bool {
        (**self).allow_empty_rulesets()
    }

    fn strict_values(&self) -> bool {
        (**self).strict_values()
    }
}

/// Resolve `name` through the schema's store, swallowing store failures.
pub(crate) fn resolve_named<S: Schema + ?Sized>(schema: &S, name: &str) -> Option<RuleSet> {
    let resolver = schema.resolver()?;
    match resolver.resolve(name) {
        Ok(found) => found,
        Err(err) => {
            tracing::debug!(name, error = %err, "named ruleset lookup failed");
            None
        }
    }
}
