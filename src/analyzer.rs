//! Plan rewrites applied between parsing and execution.

use tracing::debug;

use crate::error::{MiniqlError, MiniqlResult};
use crate::expression::Expression;
use crate::plan::Plan;

/// Expand `*` and `table.*` projection entries against the child schema.
///
/// Every wildcard occurrence expands independently to one column reference
/// per schema column, in schema order. A query projecting both `t.*` and
/// `*` therefore gets the overlapping columns once per occurrence; the
/// duplication is deliberate, matching the engine's conformance behavior
/// rather than stricter SQL dialects.
pub fn expand_wildcards(plan: Plan) -> MiniqlResult<Plan> {
    match plan {
        Plan::Project { expressions, child } => {
            let child = Box::new(expand_wildcards(*child)?);
            let relation = child.relation().clone();

            let mut expanded: Vec<Expression> = Vec::with_capacity(expressions.len());
            for expr in expressions {
                match expr {
                    Expression::Wildcard { table: None } => {
                        debug!(table = %relation.name, "expanding * projection");
                        for column in &relation.columns {
                            expanded.push(Expression::Column {
                                table: None,
                                name: column.name.clone(),
                            });
                        }
                    }
                    Expression::Wildcard { table: Some(table) } => {
                        if table != relation.name {
                            return Err(MiniqlError::TableNotFound(table));
                        }
                        debug!(table = %table, "expanding qualified * projection");
                        for column in &relation.columns {
                            expanded.push(Expression::Column {
                                table: Some(table.clone()),
                                name: column.name.clone(),
                            });
                        }
                    }
                    other => expanded.push(other),
                }
            }

            Ok(Plan::Project {
                expressions: expanded,
                child,
            })
        }

        Plan::Filter { predicate, child } => Ok(Plan::Filter {
            predicate,
            child: Box::new(expand_wildcards(*child)?),
        }),

        Plan::Sort { fields, child } => Ok(Plan::Sort {
            fields,
            child: Box::new(expand_wildcards(*child)?),
        }),

        Plan::Scan { relation } => Ok(Plan::Scan { relation }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Relation;

    fn table() -> Relation {
        Relation::new("mytable", &["a", "b"])
    }

    fn star() -> Expression {
        Expression::Wildcard { table: None }
    }

    fn qualified_star(table: &str) -> Expression {
        Expression::Wildcard {
            table: Some(table.to_string()),
        }
    }

    fn column(name: &str) -> Expression {
        Expression::Column {
            table: None,
            name: name.to_string(),
        }
    }

    fn qualified_column(table: &str, name: &str) -> Expression {
        Expression::Column {
            table: Some(table.to_string()),
            name: name.to_string(),
        }
    }

    fn project(expressions: Vec<Expression>) -> Plan {
        Plan::Project {
            expressions,
            child: Box::new(Plan::Scan { relation: table() }),
        }
    }

    fn expanded_expressions(plan: Plan) -> Vec<Expression> {
        match expand_wildcards(plan).unwrap() {
            Plan::Project { expressions, .. } => expressions,
            other => panic!("expected project at root, got {:?}", other),
        }
    }

    #[test]
    fn test_unqualified_star() {
        assert_eq!(
            expanded_expressions(project(vec![star()])),
            vec![column("a"), column("b")]
        );
    }

    #[test]
    fn test_qualified_star() {
        assert_eq!(
            expanded_expressions(project(vec![qualified_star("mytable")])),
            vec![
                qualified_column("mytable", "a"),
                qualified_column("mytable", "b")
            ]
        );
    }

    #[test]
    fn test_qualified_and_unqualified_star_duplicate() {
        // Overlapping columns come out once per wildcard occurrence.
        assert_eq!(
            expanded_expressions(project(vec![star(), qualified_star("mytable")])),
            vec![
                column("a"),
                column("b"),
                qualified_column("mytable", "a"),
                qualified_column("mytable", "b")
            ]
        );
    }

    #[test]
    fn test_stars_mixed_with_other_expressions() {
        assert_eq!(
            expanded_expressions(project(vec![
                star(),
                column("foo"),
                qualified_star("mytable")
            ])),
            vec![
                column("a"),
                column("b"),
                column("foo"),
                qualified_column("mytable", "a"),
                qualified_column("mytable", "b")
            ]
        );
    }

    #[test]
    fn test_star_after_some_expressions() {
        assert_eq!(
            expanded_expressions(project(vec![column("foo"), star()])),
            vec![column("foo"), column("a"), column("b")]
        );
    }

    #[test]
    fn test_unqualified_star_used_multiple_times() {
        assert_eq!(
            expanded_expressions(project(vec![star(), star()])),
            vec![column("a"), column("b"), column("a"), column("b")]
        );
    }

    #[test]
    fn test_unknown_qualifier_is_error() {
        assert!(matches!(
            expand_wildcards(project(vec![qualified_star("other")])),
            Err(MiniqlError::TableNotFound(t)) if t == "other"
        ));
    }

    #[test]
    fn test_expansion_reaches_through_filter_and_sort() {
        use crate::plan::{SortField, SortOrder};
        use serde_json::json;

        let plan = Plan::Sort {
            fields: vec![SortField::new("a", SortOrder::Ascending)],
            child: Box::new(Plan::Project {
                expressions: vec![star()],
                child: Box::new(Plan::Filter {
                    predicate: Expression::Literal(json!(true)),
                    child: Box::new(Plan::Scan { relation: table() }),
                }),
            }),
        };

        match expand_wildcards(plan).unwrap() {
            Plan::Sort { child, .. } => match *child {
                Plan::Project { expressions, .. } => {
                    assert_eq!(expressions, vec![column("a"), column("b")]);
                }
                other => panic!("expected project, got {:?}", other),
            },
            other => panic!("expected sort, got {:?}", other),
        }
    }

    #[test]
    fn test_non_wildcard_projection_unchanged() {
        let plan = project(vec![column("a"), column("foo")]);
        assert_eq!(expand_wildcards(plan.clone()).unwrap(), plan);
    }
}
