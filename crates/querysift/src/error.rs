//! Error types for the querysift crate.

use thiserror::Error;

/// Errors that can occur while compiling a query into a predicate.
///
/// Every failure is detected at compile time. A [`Predicate`](crate::Predicate)
/// that was built successfully never fails when evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Malformed query text: bad quoting, unknown function tag, unmatched bracket.
    #[error("syntax error at byte {position}: {message} (near '{fragment}')")]
    Syntax {
        message: String,
        position: usize,
        fragment: String,
    },

    /// The property path does not name a member of the record type.
    #[error("unknown property '{property}'")]
    UnknownProperty { property: String },

    /// The literal text cannot be decoded into the property's declared type.
    #[error("cannot coerce '{literal}' to {expected} for property '{property}': {reason}")]
    Coercion {
        property: String,
        literal: String,
        expected: String,
        reason: String,
    },

    /// The operator is not valid for the property's type or shape.
    #[error("operator '{op}' is not supported on property '{property}': {reason}")]
    UnsupportedOperator {
        op: &'static str,
        property: String,
        reason: String,
    },

    /// The query contained no clauses.
    #[error("query is empty")]
    EmptyQuery,

    /// The query text exceeds the configured maximum length.
    #[error("query is {len} bytes long, the configured maximum is {max}")]
    QueryTooLong { len: usize, max: usize },
}

impl QueryError {
    /// Builds a syntax error, capturing a short fragment of the source at `position`.
    pub(crate) fn syntax(source: &str, position: usize, message: impl Into<String>) -> Self {
        QueryError::Syntax {
            message: message.into(),
            position,
            fragment: fragment_at(source, position),
        }
    }

    /// Returns the stable name of this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Syntax { .. } => "syntax",
            QueryError::UnknownProperty { .. } => "unknown-property",
            QueryError::Coercion { .. } => "coercion",
            QueryError::UnsupportedOperator { .. } => "unsupported-operator",
            QueryError::EmptyQuery => "empty-query",
            QueryError::QueryTooLong { .. } => "query-too-long",
        }
    }
}

const FRAGMENT_CHARS: usize = 24;

fn fragment_at(source: &str, position: usize) -> String {
    let start = position.min(source.len());
    // positions always come from char boundaries, but stay safe for callers
    let start = (0..=start)
        .rev()
        .find(|i| source.is_char_boundary(*i))
        .unwrap_or(0);
    source[start..].chars().take(FRAGMENT_CHARS).collect()
}

/// Result type for querysift operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_captures_fragment() {
        let err = QueryError::syntax("eq('a', 'b') xor", 13, "expected joiner");
        match err {
            QueryError::Syntax {
                position, fragment, ..
            } => {
                assert_eq!(position, 13);
                assert_eq!(fragment, "xor");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fragment_is_truncated() {
        let long = "x".repeat(100);
        let err = QueryError::syntax(&long, 0, "bad");
        if let QueryError::Syntax { fragment, .. } = err {
            assert_eq!(fragment.len(), FRAGMENT_CHARS);
        }
    }

    #[test]
    fn fragment_at_end_is_empty() {
        let err = QueryError::syntax("eq(", 3, "unexpected end");
        if let QueryError::Syntax { fragment, .. } = err {
            assert!(fragment.is_empty());
        }
    }

    #[test]
    fn display_messages() {
        let err = QueryError::UnknownProperty {
            property: "Nope".into(),
        };
        assert_eq!(err.to_string(), "unknown property 'Nope'");
        assert_eq!(QueryError::EmptyQuery.to_string(), "query is empty");
        assert_eq!(QueryError::EmptyQuery.kind(), "empty-query");
    }
}
