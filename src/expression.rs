use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Binary operators, ordered here roughly by precedence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Or,
    And,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,
}

impl BinaryOperator {
    /// Resolve a raw operator spelling. Keyword operators (`AND`, `OR`,
    /// `LIKE`) match case-insensitively; `<>` is an alias for `!=`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.to_lowercase().as_str() {
            "or" => Some(BinaryOperator::Or),
            "and" => Some(BinaryOperator::And),
            "=" => Some(BinaryOperator::Equal),
            "!=" | "<>" => Some(BinaryOperator::NotEqual),
            "<" => Some(BinaryOperator::LessThan),
            "<=" => Some(BinaryOperator::LessThanOrEqual),
            ">" => Some(BinaryOperator::GreaterThan),
            ">=" => Some(BinaryOperator::GreaterThanOrEqual),
            "like" => Some(BinaryOperator::Like),
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Subtract),
            "*" => Some(BinaryOperator::Multiply),
            "/" => Some(BinaryOperator::Divide),
            "%" => Some(BinaryOperator::Modulo),
            "**" => Some(BinaryOperator::Exponent),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Or => "or",
            BinaryOperator::And => "and",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Like => "like",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Exponent => "**",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Not,
    Negate,
}

impl UnaryOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.to_lowercase().as_str() {
            "not" => Some(UnaryOperator::Not),
            "-" => Some(UnaryOperator::Negate),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "not",
            UnaryOperator::Negate => "-",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A parsed scalar expression.
///
/// Literals carry [`serde_json::Value`] so integers, floats, strings,
/// booleans and null all flow through one representation, and the same
/// values come back out of evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Literal(Value),
    Column {
        table: Option<String>,
        name: String,
    },
    /// `*` or `table.*` in a projection list.
    Wildcard { table: Option<String> },
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Expression::Wildcard { .. })
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Column { table: Some(t), name } => write!(f, "{}.{}", t, name),
            Expression::Column { table: None, name } => write!(f, "{}", name),
            Expression::Wildcard { table: Some(t) } => write!(f, "{}.*", t),
            Expression::Wildcard { table: None } => write!(f, "*"),
            Expression::BinaryOp { op, left, right } => {
                write!(f, "{} {} {}", left, op, right)
            }
            Expression::UnaryOp { op, operand } => match op {
                UnaryOperator::Not => write!(f, "not {}", operand),
                UnaryOperator::Negate => write!(f, "-{}", operand),
            },
            Expression::FunctionCall { name, args } => {
                let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, rendered.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_column() {
        let expr = Expression::Column {
            table: Some("users".to_string()),
            name: "age".to_string(),
        };
        assert_eq!(expr.to_string(), "users.age");
    }

    #[test]
    fn test_display_binary() {
        let expr = Expression::BinaryOp {
            op: BinaryOperator::GreaterThan,
            left: Box::new(Expression::Column {
                table: None,
                name: "age".to_string(),
            }),
            right: Box::new(Expression::Literal(json!(18))),
        };
        assert_eq!(expr.to_string(), "age > 18");
    }

    #[test]
    fn test_display_function() {
        let expr = Expression::FunctionCall {
            name: "upper".to_string(),
            args: vec![Expression::Column {
                table: None,
                name: "name".to_string(),
            }],
        };
        assert_eq!(expr.to_string(), "upper(name)");
    }

    #[test]
    fn test_display_wildcards() {
        assert_eq!(Expression::Wildcard { table: None }.to_string(), "*");
        assert_eq!(
            Expression::Wildcard {
                table: Some("t".to_string())
            }
            .to_string(),
            "t.*"
        );
    }
}
