//! miniql - a storage-independent mini-SQL parser and query planner.
//!
//! Queries in a restricted SQL dialect (`SELECT` projection list,
//! single-table `FROM`, optional `WHERE`, optional `ORDER BY`) are parsed
//! into a plan tree of scan/filter/project/sort nodes. Clause recognition
//! runs on an explicit state stack and expressions go through a
//! shunting-yard pass, which keeps the machine inspectable: [`last_states`]
//! reports how far a parse progressed even when it failed.
//!
//! # Main Components
//!
//! - **Lexer**: turns the query text into tokens
//! - **Parser**: state-machine clause parsing plus operator-precedence
//!   expression parsing, producing a [`Plan`]
//! - **Analyzer**: plan rewrites, currently wildcard expansion
//! - **Eval**: evaluates an [`Expression`] against a JSON row, with a
//!   builtin function registry (`JSON_EXTRACT`, string helpers)
//!
//! # Example
//!
//! ```rust
//! use miniql::{parse, Relation};
//!
//! let relations = vec![Relation::new("users", &["id", "name", "age"])];
//! let plan = parse("SELECT name FROM users WHERE age > 18", &relations).unwrap();
//! assert_eq!(plan.relation().name, "users");
//! ```

pub mod analyzer;
pub mod error;
pub mod eval;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod plan;
pub mod schema;

pub use analyzer::expand_wildcards;
pub use error::{MiniqlError, MiniqlResult};
pub use eval::evaluate;
pub use expression::{BinaryOperator, Expression, UnaryOperator};
pub use lexer::{Lexer, Token, TokenKind, TokenStream};
pub use parser::{last_states, parse, ParseState};
pub use plan::{Plan, SortField, SortOrder};
pub use schema::{Column, Relation};
