use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use bql::{
    bql_to_ruleset, ruleset_to_bql, validate_bql, Condition, FieldConfig, FieldType, QueryConfig,
    Rule, RuleSet,
};

#[test]
fn shared_config_across_threads() {
    let stored = HashMap::from([(
        "ADULTS".to_owned(),
        RuleSet::with_rules(Condition::And, vec![Rule::new("age", ">=", 18_i64).into()]),
    )]);
    let config = Arc::new(
        QueryConfig::builder()
            .field("age", FieldConfig::new("Age", FieldType::Number))
            .field(
                "status",
                FieldConfig::new("Status", FieldType::Category).options(&["active", "inactive"]),
            )
            .field(
                "banned",
                FieldConfig::new("Banned", FieldType::Boolean)
                    .validator(|rule, _| Ok(rule.operator == "=")),
            )
            .resolver(stored)
            .build(),
    );

    let mut handles = vec![];

    // Thread 1: valid query through the store
    let cfg = Arc::clone(&config);
    handles.push(thread::spawn(move || {
        validate_bql("ADULTS & status=active", cfg.as_ref())
    }));

    // Thread 2: value outside the options
    let cfg = Arc::clone(&config);
    handles.push(thread::spawn(move || validate_bql("status=gone", cfg.as_ref())));

    // Thread 3: field validator rejects the operator
    let cfg = Arc::clone(&config);
    handles.push(thread::spawn(move || validate_bql("banned!=true", cfg.as_ref())));

    // Thread 4: unknown reference
    let cfg = Arc::clone(&config);
    handles.push(thread::spawn(move || validate_bql("!MINORS", cfg.as_ref())));

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results, vec![true, false, false, false]);
}

#[test]
fn round_trips_agree_across_threads() {
    let config = Arc::new(
        QueryConfig::builder()
            .field("age", FieldConfig::new("Age", FieldType::Number))
            .build(),
    );
    let queries = ["age>1 & age<9", "!(age=1 | age=2)", "age IN (1,2,3)", "foo | bar"];

    let handles: Vec<_> = queries
        .iter()
        .map(|&q| {
            let cfg = Arc::clone(&config);
            thread::spawn(move || {
                let tree = bql_to_ruleset(q, cfg.as_ref()).unwrap();
                ruleset_to_bql(&tree, cfg.as_ref())
            })
        })
        .collect();

    for (handle, query) in handles.into_iter().zip(queries) {
        assert_eq!(handle.join().unwrap(), query);
    }
}
