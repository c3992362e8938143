use std::collections::HashMap;

use bql::{
    bql_to_ruleset, ruleset_to_bql, validate_bql, Condition, QueryConfig, Rule, RuleSet,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let stored = HashMap::from([(
        "ADULTS".to_owned(),
        RuleSet::with_rules(Condition::And, vec![Rule::new("age", ">=", 18_i64).into()]),
    )]);
    let config = QueryConfig::from_file("demos/config.json")
        .expect("failed to load config")
        .into_builder()
        .resolver(stored)
        .build();

    let queries: Vec<String> = match std::env::args().skip(1).collect::<Vec<_>>() {
        args if args.is_empty() => [
            "(fname=bill | fname=john) & foo",
            "ADULTS & sign IN (aries, leo)",
            "!(age<3 | school IS NULL)",
            "birthday>1990-04-12 & \"free text\"",
            "sign=virgo",
            "age>three",
            "fname=bill )",
        ]
        .map(str::to_owned)
        .to_vec(),
        args => args,
    };

    for query in &queries {
        println!("{query}");
        match bql_to_ruleset(query, &config) {
            Ok(tree) => {
                println!("  minimal: {}", ruleset_to_bql(&tree, &config));
                match tree.to_json() {
                    Ok(json) => println!("  json:    {json}"),
                    Err(err) => println!("  json:    {err}"),
                }
            }
            Err(err) => println!("  error:   {err}"),
        }
        println!("  valid:   {}", validate_bql(query, &config));
    }
}
