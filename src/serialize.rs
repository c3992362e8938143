//! Rendering ruleset trees as minimal BQL text.

use crate::parse::is_ruleset_name;
use crate::{Condition, Node, Rule, RuleSet, Schema, Value};

/// Render a ruleset as BQL.
///
/// The tree is assumed to be well formed; validate it first if it came from
/// an untrusted source. Named nodes render as their name only, and
/// parentheses appear only where precedence or negation needs them.
///
/// Rendering does not consult `_schema` yet; it is taken so callers pass the
/// same schema to every entry point.
#[must_use]
pub fn ruleset_to_bql<S: Schema + ?Sized>(rs: &RuleSet, _schema: &S) -> String {
    ruleset_string(rs, None)
}

fn ruleset_string(rs: &RuleSet, parent: Option<Condition>) -> String {
    if let Some(name) = &rs.name {
        return if rs.not { format!("!{name}") } else { name.clone() };
    }

    if rs.not && rs.rules.len() == 1 {
        if let Node::RuleSet(child) = &rs.rules[0] {
            if let Some(name) = child.name.as_deref().filter(|_| !child.not) {
                return format!("!{name}");
            }
        }
    }

    if !rs.not && rs.rules.len() == 1 {
        match &rs.rules[0] {
            Node::Rule(rule) => return rule_string(rule),
            Node::RuleSet(only) if only.name.is_none() => return ruleset_string(only, parent),
            Node::RuleSet(_) => {}
        }
    }

    let parts: Vec<String> = rs
        .rules
        .iter()
        .map(|child| match child {
            Node::Rule(rule) => rule_string(rule),
            Node::RuleSet(inner) => ruleset_string(inner, Some(rs.condition)),
        })
        .collect();
    let mut out = parts.join(rs.condition.joiner());

    if !rs.not {
        if parent.is_some_and(|p| rs.condition.precedence() < p.precedence()) {
            out = format!("({out})");
        }
        return out;
    }

    let bare = rs.rules.len() == 1
        && match &rs.rules[0] {
            Node::Rule(_) => true,
            Node::RuleSet(inner) => inner.is_atomic(),
        };
    if bare {
        format!("!{out}")
    } else {
        format!("!({out})")
    }
}

fn rule_string(rule: &Rule) -> String {
    if rule.is_document_search() {
        return rule.value.as_ref().map(value_string).unwrap_or_default();
    }
    let op = operator_token(&rule.operator);
    let alpha = is_alpha_operator(&op);
    let mut out = rule.field.clone();
    if alpha {
        out.push(' ');
    }
    out.push_str(&op);
    if let Some(value) = &rule.value {
        if alpha {
            out.push(' ');
        }
        out.push_str(&value_string(value));
    }
    out
}

/// Alphabetic operators render upper-cased, with an optional leading `!`.
fn operator_token(op: &str) -> String {
    let is_words = |s: &str| {
        s.starts_with(|c: char| c.is_ascii_alphabetic())
            && s.chars().all(|c| c.is_ascii_alphabetic() || c == '_' || c.is_whitespace())
    };
    if is_words(op) {
        return op.to_ascii_uppercase();
    }
    match op.strip_prefix('!') {
        Some(rest) if is_words(rest) => format!("!{}", rest.to_ascii_uppercase()),
        _ => op.to_owned(),
    }
}

fn is_alpha_operator(op: &str) -> bool {
    let plain: String = op.chars().filter(|c| !c.is_whitespace()).collect();
    let body = plain.strip_prefix('!').unwrap_or(&plain);
    let mut chars = body.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c == '_')
}

/// Whether a string can be written without quotes and read back unchanged.
fn is_bare_word(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && !is_ruleset_name(s)
}

fn value_string(value: &Value) -> String {
    match value {
        Value::List(items) => {
            let inner: Vec<String> = items.iter().map(value_string).collect();
            format!("({})", inner.join(","))
        }
        Value::String(s) if is_bare_word(s) => s.clone(),
        Value::String(s) => json_string(s),
        Value::Number(n) => number_string(*n),
        Value::Bool(b) => b.to_string(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
    }
}

fn json_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

#[allow(clippy::cast_possible_truncation)]
fn number_string(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_owned();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryConfig;

    fn bql(rs: &RuleSet) -> String {
        ruleset_to_bql(rs, &QueryConfig::default())
    }

    fn and(rules: Vec<Node>) -> RuleSet {
        RuleSet::with_rules(Condition::And, rules)
    }

    fn or(rules: Vec<Node>) -> RuleSet {
        RuleSet::with_rules(Condition::Or, rules)
    }

    #[test]
    fn symbolic_operators_render_tight() {
        assert_eq!(bql(&and(vec![Rule::new("a", "=", "1").into()])), "a=1");
        assert_eq!(bql(&and(vec![Rule::new("age", ">=", 18_i64).into()])), "age>=18");
    }

    #[test]
    fn alphabetic_operators_render_spaced_and_upper() {
        let rs = and(vec![
            Rule::new("fname", "contains", "bob").into(),
            Rule::new("fname", "!like", "bo").into(),
            Rule::new("sign", "not in", vec!["leo", "aries"]).into(),
        ]);
        assert_eq!(
            bql(&rs),
            "fname CONTAINS bob & fname !LIKE bo & sign NOT IN (leo,aries)"
        );
    }

    #[test]
    fn null_tests_render_without_value() {
        let rs = or(vec![
            Rule::unary("school", "is null").into(),
            Rule::unary("school", "is not null").into(),
        ]);
        assert_eq!(bql(&rs), "school IS NULL | school IS NOT NULL");
    }

    #[test]
    fn document_search_renders_value_only() {
        assert_eq!(bql(&and(vec![Rule::document("foo").into()])), "foo");
        assert_eq!(
            bql(&and(vec![Rule::document("two words").into()])),
            "\"two words\""
        );
    }

    #[test]
    fn values() {
        assert_eq!(value_string(&Value::from("a.b_c-1")), "a.b_c-1");
        assert_eq!(value_string(&Value::from("a b")), "\"a b\"");
        assert_eq!(value_string(&Value::from("")), "\"\"");
        assert_eq!(value_string(&Value::from("say \"hi\"")), r#""say \"hi\"""#);
        assert_eq!(value_string(&Value::from("TEST")), "\"TEST\"");
        assert_eq!(value_string(&Value::Number(42.0)), "42");
        assert_eq!(value_string(&Value::Number(-0.5)), "-0.5");
        assert_eq!(value_string(&Value::Bool(false)), "false");
        assert_eq!(
            value_string(&Value::from(vec![Value::from("a"), Value::Number(1.0)])),
            "(a,1)"
        );
    }

    #[test]
    fn named_nodes_render_as_name() {
        let named = and(vec![Rule::new("a", "=", 1_i64).into()]).named("TEST");
        assert_eq!(bql(&named), "TEST");
        assert_eq!(bql(&named.clone().negated(true)), "!TEST");

        let wrapped = and(vec![named.into()]).negated(true);
        assert_eq!(bql(&wrapped), "!TEST");
    }

    #[test]
    fn wrapped_negated_reference_keeps_both_negations() {
        let inner = RuleSet::reference("TEST").negated(true);
        let wrapped = and(vec![inner.into()]).negated(true);
        assert_eq!(bql(&wrapped), "!(!TEST)");
    }

    #[test]
    fn or_inside_and_is_parenthesized() {
        let rs = and(vec![
            or(vec![
                Rule::new("fname", "=", "bill").into(),
                Rule::new("fname", "=", "john").into(),
            ])
            .into(),
            Rule::document("foo").into(),
        ]);
        assert_eq!(bql(&rs), "(fname=bill | fname=john) & foo");
    }

    #[test]
    fn and_inside_or_is_not_parenthesized() {
        let rs = or(vec![
            and(vec![Rule::new("a", "=", "1").into(), Rule::new("b", "=", "2").into()]).into(),
            Rule::new("c", "=", "3").into(),
        ]);
        assert_eq!(bql(&rs), "a=1 & b=2 | c=3");
    }

    #[test]
    fn negation_forms() {
        let single = and(vec![Rule::new("a", "=", "1").into()]).negated(true);
        assert_eq!(bql(&single), "!a=1");

        let atomic_nested = and(vec![and(vec![Rule::new("a", "=", "1").into()]).into()]).negated(true);
        assert_eq!(bql(&atomic_nested), "!a=1");

        let pair = or(vec![Rule::new("a", "=", "1").into(), Rule::new("b", "=", "2").into()])
            .negated(true);
        assert_eq!(bql(&pair), "!(a=1 | b=2)");

        let in_and = and(vec![pair.into(), Rule::new("c", "=", "3").into()]);
        assert_eq!(bql(&in_and), "!(a=1 | b=2) & c=3");
    }

    #[test]
    fn unnamed_wrapper_around_named_child() {
        let rs = and(vec![RuleSet::reference("ADULTS").into()]);
        assert_eq!(bql(&rs), "ADULTS");
    }
}
