//! String builtin functions.

use serde_json::Value;

use crate::error::MiniqlResult;

/// Call a string function. Returns None if function not found.
pub fn call(name: &str, args: &[Value]) -> MiniqlResult<Option<Value>> {
    let result = match name {
        "UPPER" => {
            let s = args.first().and_then(|v| v.as_str()).unwrap_or("");
            Some(Value::String(s.to_uppercase()))
        }

        "LOWER" => {
            let s = args.first().and_then(|v| v.as_str()).unwrap_or("");
            Some(Value::String(s.to_lowercase()))
        }

        "LENGTH" => match args.first() {
            Some(Value::String(s)) => {
                Some(Value::Number(serde_json::Number::from(s.chars().count())))
            }
            Some(Value::Array(arr)) => Some(Value::Number(serde_json::Number::from(arr.len()))),
            Some(Value::Object(obj)) => Some(Value::Number(serde_json::Number::from(obj.len()))),
            _ => Some(Value::Number(serde_json::Number::from(0))),
        },

        "CONCAT" => {
            let mut result = String::new();
            for arg in args {
                match arg {
                    Value::String(s) => result.push_str(s),
                    Value::Null => {}
                    _ => result.push_str(&arg.to_string()),
                }
            }
            Some(Value::String(result))
        }

        _ => None,
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upper_lower() {
        assert_eq!(call("UPPER", &[json!("abc")]).unwrap(), Some(json!("ABC")));
        assert_eq!(call("LOWER", &[json!("ABC")]).unwrap(), Some(json!("abc")));
    }

    #[test]
    fn test_length() {
        assert_eq!(call("LENGTH", &[json!("héllo")]).unwrap(), Some(json!(5)));
        assert_eq!(call("LENGTH", &[json!([1, 2, 3])]).unwrap(), Some(json!(3)));
        assert_eq!(call("LENGTH", &[json!(null)]).unwrap(), Some(json!(0)));
    }

    #[test]
    fn test_concat() {
        assert_eq!(
            call("CONCAT", &[json!("a"), json!(null), json!("b"), json!(1)]).unwrap(),
            Some(json!("ab1"))
        );
    }

    #[test]
    fn test_unknown_name_passes_through() {
        assert_eq!(call("NOPE", &[]).unwrap(), None);
    }
}
