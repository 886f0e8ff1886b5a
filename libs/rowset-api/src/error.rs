use std::fmt;

/// Category of a cursor error. Lets callers branch without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Any operation after `close()`.
    Closed,
    /// Column access while not positioned on a row.
    InvalidPosition,
    /// Column index outside `1..=column_count`.
    InvalidColumn,
    /// Label neither declared in the schema nor present in the row.
    UnknownColumn,
    /// Raw value cannot be converted to the requested type.
    TypeCoercion,
    /// Scrolling, row mutation, LOB access. Never implemented.
    Unsupported,
    /// Invalid cursor configuration.
    Config,
    /// Malformed query response.
    Response,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Closed => f.write_str("closed"),
            ErrorKind::InvalidPosition => f.write_str("invalid_position"),
            ErrorKind::InvalidColumn => f.write_str("invalid_column"),
            ErrorKind::UnknownColumn => f.write_str("unknown_column"),
            ErrorKind::TypeCoercion => f.write_str("type_coercion"),
            ErrorKind::Unsupported => f.write_str("unsupported"),
            ErrorKind::Config => f.write_str("config"),
            ErrorKind::Response => f.write_str("response"),
        }
    }
}

/// Error returned by every fallible cursor operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CursorError {
    #[error("result set is closed")]
    Closed,

    /// `row` is the 1-based row number the cursor is on (0 = before first).
    #[error("cursor is not on a row (row {row} of {row_count}), call next() first")]
    InvalidPosition { row: usize, row_count: usize },

    #[error("invalid column index {index}, result has {count} columns")]
    InvalidColumn { index: usize, count: usize },

    #[error("result set does not contain column '{0}'")]
    UnknownColumn(String),

    #[error("value {value} is not a {target}")]
    TypeCoercion { value: String, target: &'static str },

    #[error("{operation} is not supported by a forward-only read-only cursor")]
    Unsupported { operation: &'static str },

    #[error("config error: {0}")]
    Config(String),

    #[error("response error: {0}")]
    Response(String),
}

impl CursorError {
    pub fn coercion(value: impl fmt::Display, target: &'static str) -> Self {
        Self::TypeCoercion { value: value.to_string(), target }
    }

    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CursorError::Closed => ErrorKind::Closed,
            CursorError::InvalidPosition { .. } => ErrorKind::InvalidPosition,
            CursorError::InvalidColumn { .. } => ErrorKind::InvalidColumn,
            CursorError::UnknownColumn(_) => ErrorKind::UnknownColumn,
            CursorError::TypeCoercion { .. } => ErrorKind::TypeCoercion,
            CursorError::Unsupported { .. } => ErrorKind::Unsupported,
            CursorError::Config(_) => ErrorKind::Config,
            CursorError::Response(_) => ErrorKind::Response,
        }
    }

    /// Add context to the error.
    ///
    /// Only message-carrying variants (`Config`, `Response`) change:
    /// `"context: message"`. Cursor state errors pass through untouched.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        match self {
            CursorError::Config(msg) => CursorError::Config(format!("{ctx}: {msg}")),
            CursorError::Response(msg) => CursorError::Response(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

impl From<serde_json::Error> for CursorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Response(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(CursorError::Closed.kind(), ErrorKind::Closed);
        assert_eq!(CursorError::unsupported("previous").kind(), ErrorKind::Unsupported);
        assert_eq!(CursorError::coercion("abc", "int").kind(), ErrorKind::TypeCoercion);
    }

    #[test]
    fn context_only_touches_message_variants() {
        let err = CursorError::Config("bad offset".into()).with_context("rowset.toml");
        assert_eq!(err, CursorError::Config("rowset.toml: bad offset".into()));

        let err = CursorError::Closed.with_context("ignored");
        assert_eq!(err, CursorError::Closed);
    }

    #[test]
    fn coercion_message_names_value_and_target() {
        let err = CursorError::coercion("\"abc\"", "int");
        assert_eq!(err.to_string(), "value \"abc\" is not a int");
    }
}
