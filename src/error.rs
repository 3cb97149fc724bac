//! Error types for miniql.
//!
//! Parsing records the first error it hits and stops; nothing is retried or
//! downgraded. Plan building and expression evaluation report their own
//! failures through the same enum.

use thiserror::Error;

/// miniql error type
#[derive(Error, Debug)]
pub enum MiniqlError {
    /// Grammar violation: unexpected token, unmatched parenthesis, malformed
    /// ORDER BY clause, or input that ends where a token was mandatory. The
    /// message names what was expected and what was received.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The FROM clause named a relation that is not in the caller's list.
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    /// Expression evaluation failure (unknown function, bad argument,
    /// division by zero, unexpanded wildcard).
    #[error("Execution error: {0}")]
    Execution(String),

    /// A value had the wrong type for the operation applied to it.
    #[error("Type error: {0}")]
    Type(String),
}

/// Result type for miniql operations
pub type MiniqlResult<T> = Result<T, MiniqlError>;

impl serde::Serialize for MiniqlError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MiniqlError::Parse("expected SELECT, got \"42\"".to_string());
        assert_eq!(err.to_string(), "Parse error: expected SELECT, got \"42\"");

        let err = MiniqlError::TableNotFound("users".to_string());
        assert_eq!(err.to_string(), "Table 'users' not found");

        let err = MiniqlError::Execution("division by zero".to_string());
        assert_eq!(err.to_string(), "Execution error: division by zero");

        let err = MiniqlError::Type("expected number".to_string());
        assert_eq!(err.to_string(), "Type error: expected number");
    }

    #[test]
    fn test_result_type() {
        let ok_result: MiniqlResult<i32> = Ok(42);
        assert_eq!(ok_result.unwrap(), 42);

        let err_result: MiniqlResult<i32> = Err(MiniqlError::Parse("test".to_string()));
        assert!(err_result.is_err());
    }

    #[test]
    fn test_serialize_as_string() {
        let err = MiniqlError::TableNotFound("missing".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Table 'missing' not found\"");
    }
}
