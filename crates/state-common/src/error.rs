//! Error types for labeled arrays and axis tokens.

use thiserror::Error;

use crate::direction::Direction;

/// Result type alias using ArrayError.
pub type ArrayResult<T> = Result<T, ArrayError>;

/// Errors raised while constructing or editing a labeled array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    #[error("{dims} dimension names given for an array of rank {ndim}")]
    RankMismatch { dims: usize, ndim: usize },

    #[error("dimension name '{0}' appears more than once")]
    DuplicateDimension(String),

    #[error("array has no dimension named '{0}'")]
    UnknownDimension(String),

    #[error("coordinate for '{dim}' has {found} values, dimension has length {expected}")]
    CoordinateLength {
        dim: String,
        expected: usize,
        found: usize,
    },
}

/// Errors raised while parsing output-dimension tokens such as `["*", "z"]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenParseError {
    #[error("invalid direction token '{0}', expected one of x, y, z, *")]
    InvalidToken(String),

    #[error("direction {0} requested more than once")]
    DuplicateDirection(Direction),

    #[error("wildcard '*' requested more than once")]
    MultipleWildcards,
}
