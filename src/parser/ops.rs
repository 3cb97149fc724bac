//! Operator precedence tables for the expression parser.
//!
//! Two static maps, one for binary and one for unary operators. A missing
//! entry means the token is not an operator at all: the expression parser
//! treats it as a terminator and pushes it back, it is never an error here.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// Precedence and associativity of one operator symbol.
#[derive(Debug, Clone, Copy)]
pub struct OpDescriptor {
    pub precedence: u8,
    pub assoc: Assoc,
}

impl OpDescriptor {
    const fn left(precedence: u8) -> Self {
        Self {
            precedence,
            assoc: Assoc::Left,
        }
    }

    const fn right(precedence: u8) -> Self {
        Self {
            precedence,
            assoc: Assoc::Right,
        }
    }

    pub fn is_left_assoc(&self) -> bool {
        self.assoc == Assoc::Left
    }
}

static BINARY_OPS: Lazy<HashMap<&'static str, OpDescriptor>> = Lazy::new(|| {
    HashMap::from([
        ("or", OpDescriptor::left(1)),
        ("and", OpDescriptor::left(2)),
        ("=", OpDescriptor::left(4)),
        ("!=", OpDescriptor::left(4)),
        ("<>", OpDescriptor::left(4)),
        ("<", OpDescriptor::left(4)),
        ("<=", OpDescriptor::left(4)),
        (">", OpDescriptor::left(4)),
        (">=", OpDescriptor::left(4)),
        ("like", OpDescriptor::left(4)),
        ("+", OpDescriptor::left(5)),
        ("-", OpDescriptor::left(5)),
        ("*", OpDescriptor::left(6)),
        ("/", OpDescriptor::left(6)),
        ("%", OpDescriptor::left(6)),
        // Right-associative so 2 ** 3 ** 2 groups as 2 ** (3 ** 2)
        ("**", OpDescriptor::right(7)),
    ])
});

static UNARY_OPS: Lazy<HashMap<&'static str, OpDescriptor>> = Lazy::new(|| {
    HashMap::from([
        // NOT binds tighter than AND but looser than comparison
        ("not", OpDescriptor::right(3)),
        ("-", OpDescriptor::right(8)),
    ])
});

/// Look up a binary operator symbol, case-insensitively for keyword
/// operators. `None` means "not a binary operator".
pub fn binary(symbol: &str) -> Option<OpDescriptor> {
    BINARY_OPS.get(symbol.to_lowercase().as_str()).copied()
}

/// Look up a unary operator symbol. `None` means "not a unary operator".
pub fn unary(symbol: &str) -> Option<OpDescriptor> {
    UNARY_OPS.get(symbol.to_lowercase().as_str()).copied()
}
