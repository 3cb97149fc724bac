use crate::expression::Expression;
use crate::schema::Relation;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One ORDER BY entry: a column name and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortField {
    pub column: String,
    pub order: SortOrder,
}

impl SortField {
    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }
}

/// A query plan tree.
///
/// Plans always nest as `Sort(Project(Filter(Scan)))`, with Filter and Sort
/// present only when the query had a WHERE or ORDER BY clause. Scan is the
/// only leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Plan {
    Scan {
        relation: Relation,
    },
    Filter {
        predicate: Expression,
        child: Box<Plan>,
    },
    Project {
        expressions: Vec<Expression>,
        child: Box<Plan>,
    },
    Sort {
        fields: Vec<SortField>,
        child: Box<Plan>,
    },
}

impl Plan {
    /// Output column names of this node.
    ///
    /// Scan exposes its relation's columns, Project renames to the textual
    /// form of each projected expression, Filter and Sort pass their child's
    /// schema through unchanged.
    pub fn schema(&self) -> Vec<String> {
        match self {
            Plan::Scan { relation } => relation.column_names(),
            Plan::Filter { child, .. } => child.schema(),
            Plan::Project { expressions, .. } => {
                expressions.iter().map(|e| e.to_string()).collect()
            }
            Plan::Sort { child, .. } => child.schema(),
        }
    }

    /// The relation scanned at the leaf of this plan.
    pub fn relation(&self) -> &Relation {
        match self {
            Plan::Scan { relation } => relation,
            Plan::Filter { child, .. } => child.relation(),
            Plan::Project { child, .. } => child.relation(),
            Plan::Sort { child, .. } => child.relation(),
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Plan::Scan { relation } => writeln!(f, "{}Scan: {}", indent, relation.name),
            Plan::Filter { predicate, child } => {
                writeln!(f, "{}Filter: {}", indent, predicate)?;
                child.fmt_node(f, depth + 1)
            }
            Plan::Project { expressions, child } => {
                let rendered: Vec<String> = expressions.iter().map(|e| e.to_string()).collect();
                writeln!(f, "{}Project: {}", indent, rendered.join(", "))?;
                child.fmt_node(f, depth + 1)
            }
            Plan::Sort { fields, child } => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|s| {
                        let dir = match s.order {
                            SortOrder::Ascending => "asc",
                            SortOrder::Descending => "desc",
                        };
                        format!("{} {}", s.column, dir)
                    })
                    .collect();
                writeln!(f, "{}Sort: {}", indent, rendered.join(", "))?;
                child.fmt_node(f, depth + 1)
            }
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, 0)
    }
}
