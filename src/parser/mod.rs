//! Clause-level query parsing.
//!
//! The grammar is driven by an explicit state stack rather than recursive
//! descent: every loop iteration reads the state on top of the stack,
//! consumes tokens for it and pushes, pops or replaces states. Keeping the
//! machine as data is what lets [`last_states`] report how far a parse got.
//!
//! Grammar:
//!
//! ```text
//! SELECT <expr> (',' <expr>)*
//! FROM <identifier>
//! ('WHERE' <expr> (',' <expr>)*
//!   ('ORDER' 'BY' <identifier> ('ASC'|'DESC')? (',' ...)*)? )?
//! ```
//!
//! ORDER BY is the WHERE clause's break keyword, so it is only reachable
//! after a WHERE clause.

mod expr;
mod ops;
mod order;

use serde::Serialize;
use tracing::debug;

use crate::error::{MiniqlError, MiniqlResult};
use crate::expression::Expression;
use crate::lexer::{Lexer, TokenKind, TokenStream};
use crate::plan::{Plan, SortField};
use crate::schema::Relation;

pub use expr::parse_expr;
pub use order::parse_order_clause;

/// A position in the clause grammar.
///
/// `Nil` is the initial placeholder, `Done` and `Error` are the two
/// terminal states. `Select` and `Where` double as clause markers: they stay
/// beneath `Expr`/`ExprEnd` on the stack so the expression states know which
/// list the parsed expression belongs to and which keyword ends the clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseState {
    Nil,
    Error,
    Select,
    FieldList,
    From,
    RelationName,
    Where,
    WhereClause,
    Order,
    OrderBy,
    OrderClause,
    Done,
    Expr,
    ExprEnd,
}

/// Parse `input` and resolve its FROM clause against `relations`.
///
/// Returns the plan tree `Sort?(Project(Filter?(Scan)))` or the first error
/// the parse recorded. Only the first accumulated WHERE expression is
/// planned: a single top-level filter expression is supported, additional
/// comma-separated ones are accepted by the grammar but not used.
pub fn parse(input: &str, relations: &[Relation]) -> MiniqlResult<Plan> {
    debug!(query = input, "parsing query");
    let mut parser = Parser::new(input)?;
    parser.run();
    if let Some(err) = parser.error.take() {
        return Err(err);
    }
    parser.build_plan(relations)
}

/// Diagnostic entry point: run the state machine over `input` and report
/// (final state, state active just before it). A grammar error shows up
/// here as the `Error` state, not as an `Err` return; only failing to
/// tokenize the input fails the call.
pub fn last_states(input: &str) -> MiniqlResult<(ParseState, ParseState)> {
    let mut parser = Parser::new(input)?;
    parser.run();
    let last = parser.states.pop().unwrap_or(ParseState::Nil);
    Ok((last, parser.prev_state))
}

struct Parser {
    prev_state: ParseState,
    states: Vec<ParseState>,
    stream: TokenStream,
    error: Option<MiniqlError>,

    projection: Vec<Expression>,
    relation: String,
    filter_clauses: Vec<Expression>,
    sort_fields: Vec<SortField>,
}

impl Parser {
    fn new(input: &str) -> MiniqlResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            prev_state: ParseState::Nil,
            states: vec![ParseState::Select],
            stream: TokenStream::new(tokens),
            error: None,
            projection: Vec::new(),
            relation: String::new(),
            filter_clauses: Vec::new(),
            sort_fields: Vec::new(),
        })
    }

    /// Drive the state machine until it reaches `Done` or `Error`.
    fn run(&mut self) {
        loop {
            let Some(&state) = self.states.last() else {
                break;
            };
            if state == ParseState::Done || state == ParseState::Error {
                break;
            }
            self.prev_state = state;

            match state {
                ParseState::Select => {
                    let t = self.stream.next();
                    if t.kind == TokenKind::Eof {
                        self.fail("expecting 'SELECT', nothing received");
                    } else if !t.is_keyword("select") {
                        self.fail(format!("expecting 'SELECT', \"{}\" received", t.value));
                    } else {
                        self.states.push(ParseState::FieldList);
                    }
                }

                ParseState::FieldList => {
                    let t = self.stream.next();
                    if t.kind == TokenKind::Eof {
                        self.fail("expecting select field list expression, nothing received");
                    } else if t.is_keyword("from") {
                        self.fail("unexpected \"FROM\", expecting select field list expression");
                    } else {
                        self.stream.pushback();
                        self.replace_top(ParseState::Expr);
                    }
                }

                ParseState::Expr => match parse_expr(&mut self.stream) {
                    Ok(expr) => {
                        self.states.pop();
                        match self.states.last() {
                            Some(ParseState::Select) => self.projection.push(expr),
                            Some(ParseState::Where) => self.filter_clauses.push(expr),
                            _ => {}
                        }
                        self.states.push(ParseState::ExprEnd);
                    }
                    Err(err) => self.record(err),
                },

                ParseState::ExprEnd => {
                    let t = self.stream.next();
                    self.states.pop();
                    let (break_keyword, next_state) = match self.states.last() {
                        Some(ParseState::Select) => ("from", ParseState::From),
                        Some(ParseState::Where) => ("order", ParseState::Order),
                        _ => {
                            self.fail(format!("unexpected token \"{}\"", t.value));
                            continue;
                        }
                    };

                    match t.kind {
                        TokenKind::Comma => self.states.push(ParseState::Expr),
                        TokenKind::Keyword if t.is_keyword(break_keyword) => {
                            self.stream.pushback();
                            self.replace_top(next_state);
                        }
                        TokenKind::Eof => self.replace_top(ParseState::Done),
                        _ => self.fail(format!(
                            "expecting \",\" or \"{}\", \"{}\" received",
                            break_keyword, t.value
                        )),
                    }
                }

                ParseState::From => {
                    let t = self.stream.next();
                    if t.kind == TokenKind::Eof {
                        self.fail("expecting 'FROM', nothing received");
                    } else if !t.is_keyword("from") {
                        self.fail(format!("expecting 'FROM', \"{}\" received", t.value));
                    } else {
                        self.replace_top(ParseState::RelationName);
                    }
                }

                ParseState::RelationName => {
                    let t = self.stream.next();
                    if t.kind == TokenKind::Eof {
                        self.fail("expecting table name, nothing received");
                    } else if t.kind != TokenKind::Identifier {
                        self.fail(format!(
                            "expecting table name, \"{}\" received instead",
                            t.value
                        ));
                    } else {
                        self.relation = t.value;
                        self.replace_top(ParseState::Where);
                    }
                }

                // WHERE is optional: end of input here is success.
                ParseState::Where => {
                    let t = self.stream.next();
                    if t.kind == TokenKind::Eof {
                        self.replace_top(ParseState::Done);
                    } else if !t.is_keyword("where") {
                        self.fail(format!("expecting 'WHERE', \"{}\" received", t.value));
                    } else {
                        self.states.push(ParseState::WhereClause);
                    }
                }

                ParseState::WhereClause => {
                    let t = self.stream.next();
                    if t.kind == TokenKind::Eof {
                        self.fail("expecting where clause, nothing received");
                    } else {
                        self.stream.pushback();
                        self.replace_top(ParseState::Expr);
                    }
                }

                // ORDER is optional: end of input here is success.
                ParseState::Order => {
                    let t = self.stream.next();
                    if t.kind == TokenKind::Eof {
                        self.replace_top(ParseState::Done);
                    } else if !t.is_keyword("order") {
                        self.fail(format!("expecting 'ORDER', \"{}\" received", t.value));
                    } else {
                        self.states.push(ParseState::OrderBy);
                    }
                }

                ParseState::OrderBy => {
                    let t = self.stream.next();
                    if t.kind == TokenKind::Eof {
                        self.fail("expecting \"BY\", nothing received");
                    } else if !t.is_keyword("by") {
                        self.fail(format!("expecting 'BY', \"{}\" received", t.value));
                    } else {
                        self.states.push(ParseState::OrderClause);
                    }
                }

                ParseState::OrderClause => match parse_order_clause(&mut self.stream) {
                    Ok(fields) => {
                        self.sort_fields = fields;
                        self.replace_top(ParseState::Done);
                    }
                    Err(err) => self.record(err),
                },

                ParseState::Nil | ParseState::Done | ParseState::Error => break,
            }
        }
    }

    /// Resolve the accumulated clauses into a plan tree, bottom-up.
    fn build_plan(&self, relations: &[Relation]) -> MiniqlResult<Plan> {
        let relation = relations
            .iter()
            .find(|r| r.name == self.relation)
            .ok_or_else(|| MiniqlError::TableNotFound(self.relation.clone()))?;

        let mut node = Plan::Scan {
            relation: relation.clone(),
        };

        if let Some(predicate) = self.filter_clauses.first() {
            node = Plan::Filter {
                predicate: predicate.clone(),
                child: Box::new(node),
            };
        }

        node = Plan::Project {
            expressions: self.projection.clone(),
            child: Box::new(node),
        };

        if !self.sort_fields.is_empty() {
            node = Plan::Sort {
                fields: self.sort_fields.clone(),
                child: Box::new(node),
            };
        }

        debug!(plan = %node, "built query plan");
        Ok(node)
    }

    fn replace_top(&mut self, state: ParseState) {
        self.states.pop();
        self.states.push(state);
    }

    /// Record the first error and move to the terminal `Error` state.
    fn record(&mut self, err: MiniqlError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self.states.push(ParseState::Error);
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.record(MiniqlError::Parse(message.into()));
    }
}
