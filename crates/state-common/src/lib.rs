//! Common types shared by every crate that moves model state around.
//!
//! A model state is a map from quantity name to [`LabeledArray`]: an n-dimensional
//! buffer whose axes carry free-form names (`lon`, `mid_levels`, ...), optional
//! coordinate values and an attribute map holding at least `units`.

pub mod array;
pub mod direction;
pub mod error;

pub use array::{Attrs, Coords, LabeledArray, State, UNITS_ATTR};
pub use direction::{Direction, OutDim};
pub use error::{ArrayError, ArrayResult, TokenParseError};
