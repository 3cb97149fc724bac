//! Builtin scalar functions.
//!
//! Each module handles one family and returns `None` for names it does not
//! know, so families can be probed in order.

mod json;
mod string;

use serde_json::Value;

use crate::error::{MiniqlError, MiniqlResult};

/// Call a builtin function by name. Names are case-insensitive.
pub fn call(name: &str, args: &[Value]) -> MiniqlResult<Value> {
    let upper_name = name.to_uppercase();

    if let Some(result) = string::call(&upper_name, args)? {
        return Ok(result);
    }

    if let Some(result) = json::call(&upper_name, args)? {
        return Ok(result);
    }

    Err(MiniqlError::Execution(format!(
        "Unknown function: {}",
        name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dispatch_is_case_insensitive() {
        assert_eq!(call("upper", &[json!("hi")]).unwrap(), json!("HI"));
        assert_eq!(call("UPPER", &[json!("hi")]).unwrap(), json!("HI"));
    }

    #[test]
    fn test_unknown_function() {
        assert!(matches!(
            call("NO_SUCH_FN", &[]),
            Err(MiniqlError::Execution(_))
        ));
    }
}
