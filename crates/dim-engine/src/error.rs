//! Error types for dimension resolution and array views.

use state_common::{ArrayError, Direction, TokenParseError};
use thiserror::Error;

use crate::units::UnitError;

/// Errors that can occur while resolving dimensions or building/restoring views.
#[derive(Error, Debug)]
pub enum DimensionError {
    /// Malformed output-dimension tokens, or data dimensions excluded from
    /// the requested output.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// More than one axis of an array satisfies a single direction.
    #[error("multiple dimensions {candidates:?} along {direction} direction")]
    AmbiguousAxis {
        direction: Direction,
        candidates: Vec<String>,
    },

    /// A property spec omits a mandatory field.
    #[error("{field} not specified for quantity {quantity}")]
    MissingAxisSpec {
        quantity: String,
        field: &'static str,
    },

    /// The state (or raw result set) does not fit the requested properties.
    #[error(transparent)]
    StateMismatch(#[from] StateMismatch),

    /// The unit converter rejected a conversion.
    #[error("could not convert quantity {quantity}: {source}")]
    Unit {
        quantity: String,
        #[source]
        source: UnitError,
    },

    /// Two maps being merged share keys.
    #[error("unexpected shared keys: {}", .0.join(", "))]
    SharedKeys(Vec<String>),

    /// A restored array could not be labeled.
    #[error(transparent)]
    Array(#[from] ArrayError),

    /// ndarray refused a reshape.
    #[error("array layout error: {0}")]
    Layout(#[from] ndarray::ShapeError),
}

/// Ways in which a state fails to match a property specification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateMismatch {
    #[error("quantities missing from state: {}", .0.join(", "))]
    MissingQuantities(Vec<String>),

    #[error("quantity {0} is missing units attribute")]
    MissingUnits(String),

    #[error("{quantity} has shape {found:?}, incompatible with {reference} shape {expected:?}")]
    IncompatibleShape {
        quantity: String,
        reference: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("{quantity} axes {found:?} do not line up with {reference} axes {expected:?}")]
    MisalignedAxes {
        quantity: String,
        reference: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("dimension {dim} has conflicting lengths {first} and {second} in different quantities")]
    ConflictingLength {
        dim: String,
        first: usize,
        second: usize,
    },
}

/// Coarse classification of a [`DimensionError`], for callers that only
/// need to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    AmbiguousAxis,
    MissingAxisSpec,
    StateMismatch,
    Unit,
    SharedKey,
    Internal,
}

impl DimensionError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a MissingAxisSpec error.
    pub fn missing_spec(quantity: impl Into<String>, field: &'static str) -> Self {
        Self::MissingAxisSpec {
            quantity: quantity.into(),
            field,
        }
    }

    /// Create an IncompatibleShape state mismatch.
    pub fn incompatible_shape(
        quantity: impl Into<String>,
        reference: impl Into<String>,
        expected: &[usize],
        found: &[usize],
    ) -> Self {
        Self::StateMismatch(StateMismatch::IncompatibleShape {
            quantity: quantity.into(),
            reference: reference.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        })
    }

    /// Create a MisalignedAxes state mismatch.
    pub fn misaligned(
        quantity: impl Into<String>,
        reference: impl Into<String>,
        expected: Vec<String>,
        found: Vec<String>,
    ) -> Self {
        Self::StateMismatch(StateMismatch::MisalignedAxes {
            quantity: quantity.into(),
            reference: reference.into(),
            expected,
            found,
        })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::AmbiguousAxis { .. } => ErrorKind::AmbiguousAxis,
            Self::MissingAxisSpec { .. } => ErrorKind::MissingAxisSpec,
            Self::StateMismatch(_) => ErrorKind::StateMismatch,
            Self::Unit { .. } => ErrorKind::Unit,
            Self::SharedKeys(_) => ErrorKind::SharedKey,
            Self::Array(_) | Self::Layout(_) => ErrorKind::Internal,
        }
    }
}

impl From<TokenParseError> for DimensionError {
    fn from(err: TokenParseError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result type for dimension engine operations.
pub type Result<T> = std::result::Result<T, DimensionError>;
