use std::collections::HashMap;

use bql::{
    bql_to_ruleset, ruleset_to_bql, Condition, FieldConfig, FieldType, QueryConfig, Rule, RuleSet,
};

fn config() -> QueryConfig {
    QueryConfig::builder()
        .field("a", FieldConfig::new("A", FieldType::String))
        .field("fname", FieldConfig::new("First name", FieldType::String))
        .field("age", FieldConfig::new("Age", FieldType::Number))
        .field("birthday", FieldConfig::new("Birthday", FieldType::Date))
        .field("sign", FieldConfig::new("Sign", FieldType::Category))
        .build()
}

/// Parse, render, and check the text survives unchanged.
fn assert_stable(text: &str, cfg: &QueryConfig) {
    let tree = bql_to_ruleset(text, cfg).unwrap();
    assert_eq!(ruleset_to_bql(&tree, cfg), text, "render of {text:?}");
}

#[test]
fn minimal_forms_are_stable() {
    let cfg = config();
    for text in [
        "a=1",
        "fname=bill | fname=john",
        "(fname=bill | fname=john) & foo",
        "a=1 & fname=x | age>3",
        "a=x | a=y | a=z & a=w",
        "a=x & a=y | a=z & a=w | a=v",
        "a=x | a=y & a=z | a=w",
        "(a=x | a=y) & a=z | a=w",
        "fname CONTAINS bob",
        "fname !LIKE bo",
        "sign IN (aries,taurus,gemini)",
        "sign NOT IN (leo)",
        "fname IS NULL",
        "fname IS NOT NULL",
        "!a=1",
        "!(a=1 | a=2)",
        "!(a=1 & a=2) | age<=5",
        "foo",
        "\"two words\" & bar",
        "age>=21",
        "birthday>1990-04-12",
        "TEST",
        "!TEST",
    ] {
        assert_stable(text, &cfg);
    }
}

#[test]
fn redundant_spacing_and_parentheses_are_dropped() {
    let cfg = config();
    let tree = bql_to_ruleset("  sign IN (aries,   taurus, gemini) ", &cfg).unwrap();
    assert_eq!(ruleset_to_bql(&tree, &cfg), "sign IN (aries,taurus,gemini)");

    let tree = bql_to_ruleset("fname contains bob", &cfg).unwrap();
    assert_eq!(ruleset_to_bql(&tree, &cfg), "fname CONTAINS bob");

    let tree = bql_to_ruleset("(a=1 & a=2) | a=3", &cfg).unwrap();
    assert_eq!(ruleset_to_bql(&tree, &cfg), "a=1 & a=2 | a=3");
}

#[test]
fn or_chain_followed_by_and_keeps_its_grouping() {
    let cfg = config();
    let tree = bql_to_ruleset("a=x | a=y | a=z & a=w", &cfg).unwrap();
    assert_eq!(tree.condition, Condition::Or);
    assert_eq!(tree.rules.len(), 3);
    assert_eq!(ruleset_to_bql(&tree, &cfg), "a=x | a=y | a=z & a=w");

    let reparsed = bql_to_ruleset(&ruleset_to_bql(&tree, &cfg), &cfg).unwrap();
    assert_eq!(reparsed, tree);
}

#[test]
fn quoted_values_round_trip() {
    let cfg = config();
    for text in [
        r#"fname="Mary Ann""#,
        r#"fname="say \"hi\"""#,
        r#"fname="back\\slash""#,
        r#"fname="line\nbreak""#,
        r#"fname="a & b""#,
        r#""FOO""#,
    ] {
        let tree = bql_to_ruleset(text, &cfg).unwrap();
        let rendered = ruleset_to_bql(&tree, &cfg);
        assert_eq!(bql_to_ruleset(&rendered, &cfg).unwrap(), tree, "{text:?}");
    }
}

#[test]
fn uppercase_document_search_is_not_a_reference() {
    let cfg = config();
    let tree = RuleSet::with_rules(Condition::And, vec![Rule::document("FOO").into()]);
    let rendered = ruleset_to_bql(&tree, &cfg);
    assert_eq!(rendered, "\"FOO\"");
    let reparsed = bql_to_ruleset(&rendered, &cfg).unwrap();
    assert!(reparsed.name.is_none());
    assert_eq!(reparsed, tree);
}

#[test]
fn resolved_references_render_as_names() {
    let stored = HashMap::from([(
        "ADULTS".to_owned(),
        RuleSet::with_rules(Condition::And, vec![Rule::new("age", ">=", 18_i64).into()]),
    )]);
    let cfg = config().into_builder().resolver(stored).build();

    for text in ["ADULTS", "!ADULTS", "ADULTS & fname=bob", "!ADULTS | age<3"] {
        assert_stable(text, &cfg);
    }
}

#[test]
fn named_ruleset_tree_renders_as_name() {
    let rs = RuleSet::with_rules(Condition::And, vec![Rule::new("a", "=", 1_i64).into()]).named("TEST");
    assert_eq!(ruleset_to_bql(&rs, &config()), "TEST");
}
