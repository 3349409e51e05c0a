//! Filter error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing, building or translating a filter.
///
/// Every variant names the operator (or dialect) it came from so callers can
/// point at the offending part of the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed filter document: {0}")]
    MalformedInput(String),

    #[error("filter form has no string \"op\" field")]
    MissingOperator,

    #[error("operator '{op}' expects {expected} argument(s), found {found}")]
    InvalidArity {
        op: String,
        expected: usize,
        found: usize,
    },

    #[error("operator '{op}': {reason}")]
    InvalidArgumentShape { op: String, reason: String },

    #[error("operator '{op}': invalid geometry: {reason}")]
    InvalidGeometry { op: String, reason: String },

    #[error("operator '{op}': invalid time value '{value}': {reason}")]
    InvalidTimeFormat {
        op: String,
        value: String,
        reason: String,
    },

    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),

    #[error("{dialect} translator does not support {node} nodes")]
    UnsupportedNodeType {
        dialect: &'static str,
        node: &'static str,
    },
}

impl Error {
    pub(crate) fn shape(op: &str, reason: impl Into<String>) -> Self {
        Error::InvalidArgumentShape {
            op: op.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn geometry(op: &str, reason: impl Into<String>) -> Self {
        Error::InvalidGeometry {
            op: op.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedInput(err.to_string())
    }
}
