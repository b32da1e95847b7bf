//! Error and warning taxonomy surfaced at the engine boundary.
//!
//! Every failure the session can produce is one of these values; nothing
//! escapes as a panic. The presentation layer decides how to render them.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with the source of a dataset before any parsing happens.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input is empty")]
    EmptyInput,

    #[error("file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("the selected file is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("port must be an integer, got '{0}'")]
    InvalidPort(String),
}

/// A line of line-delimited JSON that could not be turned into a record.
#[derive(Debug, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number in the raw text.
    pub line: usize,
    pub message: String,
}

/// Failures of the remote fetch collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("authentication failed for {user}@{host}")]
    Authentication { user: String, host: String },

    #[error("connection to {host}:{port} failed: {message}")]
    Connection {
        host: String,
        port: u16,
        message: String,
    },

    #[error("remote file does not exist: {0}")]
    RemoteNotFound(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Why a transformation expression did not produce a new dataset.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("no expression entered")]
    Empty,

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("expression rejected: {0}")]
    Rejected(String),

    #[error("result is not a table")]
    NotATable,

    #[error("execution failed: {0}")]
    Execution(String),
}

/// Umbrella error returned by [`crate::services::Session`] operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("JSON parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to execute expression: {0}")]
    Transform(#[from] TransformError),

    #[error("no previous state to revert to")]
    NoCheckpoint,

    #[error("page size {0} is not one of 5, 10, 20, 50, 100")]
    InvalidPageSize(usize),
}

/// Non-fatal conditions reported alongside a best-effort projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionWarning {
    /// Nothing was selected; the full dataset is shown instead.
    NoSelectionFallback,
    /// Requested names that are not columns of the dataset; they were ignored.
    UnknownColumns(Vec<String>),
}

impl std::fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSelectionFallback => write!(f, "No columns selected. Displaying all columns."),
            Self::UnknownColumns(names) => write!(
                f,
                "The following columns do not exist and will be ignored: {}",
                names.join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_wraps_into_engine_error() {
        let err: EngineError = ParseError { line: 3, message: "expected value".into() }.into();
        assert_eq!(err.to_string(), "JSON parsing error: line 3: expected value");
    }

    #[test]
    fn test_unknown_columns_warning_lists_names() {
        let w = SelectionWarning::UnknownColumns(vec!["x".into(), "y".into()]);
        assert!(w.to_string().ends_with("x, y"));
    }
}
