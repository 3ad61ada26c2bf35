use std::sync::Arc;

use thiserror::Error;

/// Malformed query text, reported by the lexer and the parser.
///
/// `position` is a byte offset into the query string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        SyntaxError {
            message: message.into(),
            position,
        }
    }
}

/// Every failure the engine can surface to a caller.
///
/// None of these are retried internally. `skip` fallback is a policy,
/// not an error path, so it never shows up here.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// Malformed query text
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// A path step did not resolve and the fallback policy gave up
    #[error("Path not found: {step} at position {position}")]
    PathNotFound { step: String, position: usize },

    /// Operand shapes are incompatible with a comparison or function
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Call to a function that is not registered
    #[error("Unknown function: {name}()")]
    UnknownFunction { name: String },

    /// Registered function called with the wrong number of arguments
    #[error("Arity error: {name}() expects {expected}, got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    /// The configuration snapshot violates its own invariants
    #[error("Invalid config: {message}")]
    InvalidConfig {
        message: String,
        #[source]
        cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },
}

impl QueryError {
    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        QueryError::TypeMismatch(message.into())
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        QueryError::InvalidConfig {
            message: message.into(),
            cause: None,
        }
    }

    pub(crate) fn invalid_config_caused_by(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        QueryError::InvalidConfig {
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Syntax(_) => "E_SYNTAX",
            QueryError::PathNotFound { .. } => "E_PATH_NOT_FOUND",
            QueryError::TypeMismatch(_) => "E_TYPE_MISMATCH",
            QueryError::UnknownFunction { .. } => "E_UNKNOWN_FUNCTION",
            QueryError::Arity { .. } => "E_ARITY",
            QueryError::InvalidConfig { .. } => "E_INVALID_CONFIG",
        }
    }

    /// A short hint on how to fix the problem, when one exists.
    pub fn solution(&self) -> Option<&'static str> {
        match self {
            QueryError::Syntax(_) => Some("check the query near the reported position"),
            QueryError::PathNotFound { .. } => Some(
                "configure a `default`, `skip` or `infer` fallback, or enable fuzzy matching",
            ),
            QueryError::UnknownFunction { .. } => {
                Some("run `jsift doc functions` for the list of built-ins")
            }
            QueryError::Arity { .. } => Some("check the number of arguments in the call"),
            QueryError::TypeMismatch(_) | QueryError::InvalidConfig { .. } => None,
        }
    }

    /// Byte offset into the query when the error is tied to one.
    pub fn position(&self) -> Option<usize> {
        match self {
            QueryError::Syntax(e) => Some(e.position),
            QueryError::PathNotFound { position, .. } => Some(*position),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_converts_and_keeps_position() {
        let err: QueryError = SyntaxError::new("Unexpected ']'", 4).into();
        assert_eq!(err.code(), "E_SYNTAX");
        assert_eq!(err.position(), Some(4));
        assert_eq!(err.to_string(), "Syntax error: Unexpected ']' at position 4");
    }

    #[test]
    fn invalid_config_exposes_cause() {
        let cause = QueryError::Syntax(SyntaxError::new("Unexpected end of query", 2));
        let err = QueryError::InvalidConfig {
            message: "alias 'u' has an unparsable path".into(),
            cause: Some(Arc::new(cause)),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.solution(), None);
    }
}
