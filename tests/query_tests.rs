//! End-to-end tests: query text through parsing, wildcard expansion and
//! expression evaluation against JSON rows.

use serde_json::{json, Value};

use miniql::{
    evaluate, expand_wildcards, last_states, parse, Expression, MiniqlError, ParseState, Plan,
    Relation, SortField, SortOrder,
};

fn relations() -> Vec<Relation> {
    vec![
        Relation::new("users", &["id", "name", "age", "profile"]),
        Relation::new("orders", &["id", "user_id", "total"]),
    ]
}

fn alice() -> Value {
    json!({
        "id": 1,
        "name": "Alice",
        "age": 30,
        "profile": {"city": "Paris", "tags": ["admin", "staff"]}
    })
}

/// Run a query and evaluate its projection against one row.
fn project_row(query: &str, row: &Value) -> Vec<Value> {
    let plan = expand_wildcards(parse(query, &relations()).unwrap()).unwrap();
    let expressions = match plan {
        Plan::Sort { child, .. } => match *child {
            Plan::Project { expressions, .. } => expressions,
            other => panic!("expected project under sort, got {:?}", other),
        },
        Plan::Project { expressions, .. } => expressions,
        other => panic!("expected project at root, got {:?}", other),
    };
    expressions
        .iter()
        .map(|e| evaluate(e, row).unwrap())
        .collect()
}

#[test]
fn test_projection_evaluates_against_row() {
    let values = project_row("SELECT name, age + 1 FROM users", &alice());
    assert_eq!(values, vec![json!("Alice"), json!(31.0)]);
}

#[test]
fn test_star_expands_to_schema_columns() {
    let values = project_row("SELECT * FROM orders", &json!({"id": 7, "user_id": 1, "total": 9.5}));
    assert_eq!(values, vec![json!(7), json!(1), json!(9.5)]);
}

#[test]
fn test_star_and_qualified_star_duplicate_columns() {
    let row = json!({"id": 7, "user_id": 1, "total": 9.5});
    let values = project_row("SELECT *, orders.* FROM orders", &row);
    assert_eq!(
        values,
        vec![
            json!(7),
            json!(1),
            json!(9.5),
            json!(7),
            json!(1),
            json!(9.5)
        ]
    );
}

#[test]
fn test_filter_predicate_evaluates() {
    let plan = parse("SELECT name FROM users WHERE age > 18 and name like 'A%'", &relations())
        .unwrap();
    let predicate = match plan {
        Plan::Project { child, .. } => match *child {
            Plan::Filter { predicate, .. } => predicate,
            other => panic!("expected filter, got {:?}", other),
        },
        other => panic!("expected project, got {:?}", other),
    };
    assert_eq!(evaluate(&predicate, &alice()).unwrap(), json!(true));
    assert_eq!(
        evaluate(&predicate, &json!({"name": "Bob", "age": 40})).unwrap(),
        json!(false)
    );
}

#[test]
fn test_json_extract_in_projection() {
    let values = project_row(
        "SELECT json_extract(profile, '$.city') FROM users",
        &alice(),
    );
    assert_eq!(values, vec![json!("Paris")]);
}

#[test]
fn test_json_extract_multiple_paths() {
    let values = project_row(
        "SELECT json_extract(profile, '$.city', '$.tags[0]') FROM users",
        &alice(),
    );
    assert_eq!(values, vec![json!(["Paris", "admin"])]);
}

#[test]
fn test_string_builtins_in_projection() {
    let values = project_row(
        "SELECT upper(name), length(name), concat(name, '!') FROM users",
        &alice(),
    );
    assert_eq!(values, vec![json!("ALICE"), json!(5), json!("Alice!")]);
}

#[test]
fn test_sort_fields_round_trip() {
    let plan = parse(
        "SELECT name FROM users WHERE age ORDER BY name, age DESC",
        &relations(),
    )
    .unwrap();
    match plan {
        Plan::Sort { fields, .. } => assert_eq!(
            fields,
            vec![
                SortField::new("name", SortOrder::Ascending),
                SortField::new("age", SortOrder::Descending),
            ]
        ),
        other => panic!("expected sort at root, got {:?}", other),
    }
}

#[test]
fn test_unknown_table_is_semantic_error() {
    match parse("SELECT a FROM missing", &relations()) {
        Err(MiniqlError::TableNotFound(name)) => assert_eq!(name, "missing"),
        other => panic!("expected TableNotFound, got {:?}", other),
    }
}

#[test]
fn test_syntax_error_is_surfaced_by_parse() {
    // The recorded machine error propagates out of `parse` instead of the
    // call reporting success.
    assert!(matches!(
        parse("SELECT FROM users", &relations()),
        Err(MiniqlError::Parse(_))
    ));
}

#[test]
fn test_reparse_yields_equal_plans() {
    let query = "SELECT upper(name), age * 2 FROM users WHERE age > 18 ORDER BY age DESC";
    assert_eq!(
        parse(query, &relations()).unwrap(),
        parse(query, &relations()).unwrap()
    );
}

#[test]
fn test_diagnostic_states_on_truncated_query() {
    let (last, prev) = last_states("SELECT a FROM").unwrap();
    assert_ne!(last, ParseState::Done);
    assert_eq!(prev, ParseState::RelationName);

    let (last, _) = last_states("SELECT a FROM users").unwrap();
    assert_eq!(last, ParseState::Done);
}

#[test]
fn test_schema_of_expanded_plan() {
    let plan = expand_wildcards(parse("SELECT * FROM orders", &relations()).unwrap()).unwrap();
    assert_eq!(plan.schema(), vec!["id", "user_id", "total"]);
}

#[test]
fn test_unexpanded_wildcard_fails_evaluation() {
    let plan = parse("SELECT * FROM users", &relations()).unwrap();
    match plan {
        Plan::Project { expressions, .. } => {
            assert!(matches!(
                evaluate(&expressions[0], &alice()),
                Err(MiniqlError::Execution(_))
            ));
        }
        other => panic!("expected project, got {:?}", other),
    }
}

#[test]
fn test_qualified_column_evaluates_by_name() {
    let values = project_row("SELECT users.name FROM users", &alice());
    assert_eq!(values, vec![json!("Alice")]);
}

#[test]
fn test_expression_display_round_trip() {
    let plan = parse("SELECT 1 + 2 * 3 FROM users", &relations()).unwrap();
    let (expr, _) = match &plan {
        Plan::Project { expressions, .. } => (&expressions[0], ()),
        other => panic!("expected project, got {:?}", other),
    };
    assert_eq!(expr.to_string(), "1 + 2 * 3");
    assert!(matches!(expr, Expression::BinaryOp { .. }));
}
