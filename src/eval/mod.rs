//! Expression evaluation over JSON rows.
//!
//! A row is a JSON object; column references look values up by key and
//! missing keys evaluate to null. Operators work on [`serde_json::Value`]:
//! arithmetic goes through f64, `+` also concatenates strings, comparison
//! uses a total ordering over value types and LIKE translates its pattern
//! to a regex.

pub mod builtins;

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;

use crate::error::{MiniqlError, MiniqlResult};
use crate::expression::{BinaryOperator, Expression, UnaryOperator};

/// Evaluate an expression against one row.
pub fn evaluate(expr: &Expression, row: &Value) -> MiniqlResult<Value> {
    match expr {
        Expression::Literal(value) => Ok(value.clone()),

        Expression::Column { name, .. } => Ok(row.get(name).cloned().unwrap_or(Value::Null)),

        Expression::Wildcard { table } => Err(MiniqlError::Execution(format!(
            "cannot evaluate unexpanded wildcard {}",
            match table {
                Some(t) => format!("{}.*", t),
                None => "*".to_string(),
            }
        ))),

        Expression::BinaryOp { op, left, right } => {
            let left = evaluate(left, row)?;
            let right = evaluate(right, row)?;
            evaluate_binary_op(&left, op, &right)
        }

        Expression::UnaryOp { op, operand } => {
            let operand = evaluate(operand, row)?;
            evaluate_unary_op(op, &operand)
        }

        Expression::FunctionCall { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, row)?);
            }
            builtins::call(name, &values)
        }
    }
}

/// Compare two JSON values for equality. Numbers compare by their f64
/// representation so `1` equals `1.0`.
#[inline]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

#[inline]
fn number_from_f64(n: f64) -> serde_json::Number {
    serde_json::Number::from_f64(n).unwrap_or_else(|| serde_json::Number::from(0))
}

/// Evaluate a binary operation on two values.
pub fn evaluate_binary_op(left: &Value, op: &BinaryOperator, right: &Value) -> MiniqlResult<Value> {
    match op {
        BinaryOperator::Equal => Ok(Value::Bool(values_equal(left, right))),
        BinaryOperator::NotEqual => Ok(Value::Bool(!values_equal(left, right))),

        BinaryOperator::LessThan => Ok(Value::Bool(compare_values(left, right) == Ordering::Less)),
        BinaryOperator::LessThanOrEqual => Ok(Value::Bool(
            compare_values(left, right) != Ordering::Greater,
        )),
        BinaryOperator::GreaterThan => Ok(Value::Bool(
            compare_values(left, right) == Ordering::Greater,
        )),
        BinaryOperator::GreaterThanOrEqual => {
            Ok(Value::Bool(compare_values(left, right) != Ordering::Less))
        }

        BinaryOperator::Like => {
            let s = left.as_str().unwrap_or("");
            let pattern = right.as_str().unwrap_or("");
            Ok(Value::Bool(like_match(s, pattern)))
        }

        BinaryOperator::And => Ok(Value::Bool(to_bool(left) && to_bool(right))),
        BinaryOperator::Or => Ok(Value::Bool(to_bool(left) || to_bool(right))),

        BinaryOperator::Add => {
            if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
                Ok(Value::Number(number_from_f64(a + b)))
            } else if let (Some(a), Some(b)) = (left.as_str(), right.as_str()) {
                Ok(Value::String(format!("{}{}", a, b)))
            } else {
                Err(MiniqlError::Type("cannot add these types".to_string()))
            }
        }

        BinaryOperator::Subtract => {
            if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
                Ok(Value::Number(number_from_f64(a - b)))
            } else {
                Err(MiniqlError::Type("cannot subtract non-numbers".to_string()))
            }
        }

        BinaryOperator::Multiply => {
            if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
                Ok(Value::Number(number_from_f64(a * b)))
            } else {
                Err(MiniqlError::Type("cannot multiply non-numbers".to_string()))
            }
        }

        BinaryOperator::Divide => {
            if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
                if b == 0.0 {
                    Err(MiniqlError::Execution("division by zero".to_string()))
                } else {
                    Ok(Value::Number(number_from_f64(a / b)))
                }
            } else {
                Err(MiniqlError::Type("cannot divide non-numbers".to_string()))
            }
        }

        BinaryOperator::Modulo => {
            if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
                if b == 0.0 {
                    Err(MiniqlError::Execution("division by zero".to_string()))
                } else {
                    Ok(Value::Number(number_from_f64(a % b)))
                }
            } else {
                Err(MiniqlError::Type("cannot modulo non-numbers".to_string()))
            }
        }

        BinaryOperator::Exponent => {
            if let (Some(base), Some(exp)) = (left.as_f64(), right.as_f64()) {
                Ok(Value::Number(number_from_f64(base.powf(exp))))
            } else {
                Err(MiniqlError::Type(
                    "cannot exponentiate non-numbers".to_string(),
                ))
            }
        }
    }
}

/// Evaluate a unary operation on a value.
pub fn evaluate_unary_op(op: &UnaryOperator, operand: &Value) -> MiniqlResult<Value> {
    match op {
        UnaryOperator::Not => Ok(Value::Bool(!to_bool(operand))),
        UnaryOperator::Negate => {
            if let Some(n) = operand.as_f64() {
                Ok(Value::Number(number_from_f64(-n)))
            } else {
                Err(MiniqlError::Type("cannot negate non-number".to_string()))
            }
        }
    }
}

/// Convert a JSON value to boolean: null and empty/zero values are false.
#[inline]
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Compare two JSON values for ordering.
///
/// Null < Bool < Number < String; values of other types compare equal.
#[inline]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a_f64 = a.as_f64().unwrap_or(0.0);
            let b_f64 = b.as_f64().unwrap_or(0.0);
            a_f64.partial_cmp(&b_f64).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// SQL LIKE: `%` matches any sequence, `_` a single character, everything
/// else literally.
fn like_match(s: &str, pattern: &str) -> bool {
    let mut regex_pattern = String::new();
    regex_pattern.push('^');
    for c in pattern.chars() {
        match c {
            '%' => regex_pattern.push_str(".*"),
            '_' => regex_pattern.push('.'),
            '^' | '$' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' => {
                regex_pattern.push('\\');
                regex_pattern.push(c);
            }
            _ => regex_pattern.push(c),
        }
    }
    regex_pattern.push('$');

    match Regex::new(&regex_pattern) {
        Ok(re) => re.is_match(s),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn col(name: &str) -> Expression {
        Expression::Column {
            table: None,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_literal_and_column() {
        let row = json!({"name": "Alice", "age": 30});
        assert_eq!(
            evaluate(&Expression::Literal(json!(42)), &row).unwrap(),
            json!(42)
        );
        assert_eq!(evaluate(&col("name"), &row).unwrap(), json!("Alice"));
        assert_eq!(evaluate(&col("missing"), &row).unwrap(), Value::Null);
    }

    #[test]
    fn test_arithmetic() {
        let row = json!({"age": 30});
        let expr = Expression::BinaryOp {
            op: BinaryOperator::Add,
            left: Box::new(col("age")),
            right: Box::new(Expression::Literal(json!(5))),
        };
        assert_eq!(evaluate(&expr, &row).unwrap(), json!(35.0));
    }

    #[test]
    fn test_string_concat_via_add() {
        assert_eq!(
            evaluate_binary_op(&json!("foo"), &BinaryOperator::Add, &json!("bar")).unwrap(),
            json!("foobar")
        );
    }

    #[test]
    fn test_comparison_and_logic() {
        assert_eq!(
            evaluate_binary_op(&json!(1), &BinaryOperator::LessThan, &json!(2)).unwrap(),
            json!(true)
        );
        assert_eq!(
            evaluate_binary_op(&json!(1.0), &BinaryOperator::Equal, &json!(1)).unwrap(),
            json!(true)
        );
        assert_eq!(
            evaluate_binary_op(&json!(true), &BinaryOperator::And, &json!(0)).unwrap(),
            json!(false)
        );
        assert_eq!(
            evaluate_binary_op(&json!(""), &BinaryOperator::Or, &json!("x")).unwrap(),
            json!(true)
        );
    }

    #[test]
    fn test_like() {
        assert_eq!(
            evaluate_binary_op(&json!("hello world"), &BinaryOperator::Like, &json!("hello%"))
                .unwrap(),
            json!(true)
        );
        assert_eq!(
            evaluate_binary_op(&json!("abc"), &BinaryOperator::Like, &json!("a_c")).unwrap(),
            json!(true)
        );
        assert_eq!(
            evaluate_binary_op(&json!("a.c"), &BinaryOperator::Like, &json!("a.c")).unwrap(),
            json!(true)
        );
        assert_eq!(
            evaluate_binary_op(&json!("abc"), &BinaryOperator::Like, &json!("a.c")).unwrap(),
            json!(false)
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            evaluate_binary_op(&json!(1), &BinaryOperator::Divide, &json!(0)),
            Err(MiniqlError::Execution(_))
        ));
        assert!(matches!(
            evaluate_binary_op(&json!(1), &BinaryOperator::Modulo, &json!(0)),
            Err(MiniqlError::Execution(_))
        ));
    }

    #[test]
    fn test_exponent() {
        assert_eq!(
            evaluate_binary_op(&json!(2), &BinaryOperator::Exponent, &json!(10)).unwrap(),
            json!(1024.0)
        );
    }

    #[test]
    fn test_unary() {
        assert_eq!(
            evaluate_unary_op(&UnaryOperator::Not, &json!(true)).unwrap(),
            json!(false)
        );
        assert_eq!(
            evaluate_unary_op(&UnaryOperator::Negate, &json!(5)).unwrap(),
            json!(-5.0)
        );
        assert!(evaluate_unary_op(&UnaryOperator::Negate, &json!("x")).is_err());
    }

    #[test]
    fn test_unexpanded_wildcard_errors() {
        let row = json!({});
        assert!(matches!(
            evaluate(&Expression::Wildcard { table: None }, &row),
            Err(MiniqlError::Execution(_))
        ));
    }

    #[test]
    fn test_function_dispatch() {
        let row = json!({"name": "alice"});
        let expr = Expression::FunctionCall {
            name: "upper".to_string(),
            args: vec![col("name")],
        };
        assert_eq!(evaluate(&expr, &row).unwrap(), json!("ALICE"));
    }

    #[test]
    fn test_unknown_function() {
        let expr = Expression::FunctionCall {
            name: "nope".to_string(),
            args: vec![],
        };
        assert!(matches!(
            evaluate(&expr, &json!({})),
            Err(MiniqlError::Execution(_))
        ));
    }
}
