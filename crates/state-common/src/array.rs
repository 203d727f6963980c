//! Labeled n-dimensional arrays.

use ndarray::{ArrayD, ArrayViewD, CowArray, IxDyn};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{ArrayError, ArrayResult};

/// Attribute map attached to a labeled array (`units`, `long_name`, ...).
pub type Attrs = serde_json::Map<String, Value>;

/// Coordinate values keyed by dimension name.
pub type Coords = BTreeMap<String, Vec<f64>>;

/// A model state: quantity name to labeled array.
pub type State<'a, A = f64> = BTreeMap<String, LabeledArray<'a, A>>;

/// Attribute key holding the physical units of a quantity.
pub const UNITS_ATTR: &str = "units";

/// A numeric buffer with named axes, optional coordinates and attributes.
///
/// The buffer is either owned or borrowed from another array; restoring a
/// computation result that is still a view of some state quantity produces a
/// borrowed `LabeledArray` that shares memory with that quantity.
#[derive(Debug, Clone)]
pub struct LabeledArray<'a, A = f64> {
    values: CowArray<'a, A, IxDyn>,
    dims: Vec<String>,
    coords: Coords,
    attrs: Attrs,
}

impl<'a, A> LabeledArray<'a, A> {
    /// Create a labeled array from values and one name per axis.
    pub fn new<V, I, S>(values: V, dims: I) -> ArrayResult<Self>
    where
        V: Into<CowArray<'a, A, IxDyn>>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into();
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();

        if dims.len() != values.ndim() {
            return Err(ArrayError::RankMismatch {
                dims: dims.len(),
                ndim: values.ndim(),
            });
        }
        for (i, name) in dims.iter().enumerate() {
            if dims[..i].contains(name) {
                return Err(ArrayError::DuplicateDimension(name.clone()));
            }
        }

        Ok(Self {
            values,
            dims,
            coords: Coords::new(),
            attrs: Attrs::new(),
        })
    }

    /// Replace the attribute map.
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Set a single attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Set the `units` attribute.
    pub fn with_units(self, units: impl Into<String>) -> Self {
        self.with_attr(UNITS_ATTR, units.into())
    }

    /// Attach coordinate values to a dimension.
    pub fn with_coord(mut self, dim: &str, values: Vec<f64>) -> ArrayResult<Self> {
        self.set_coord(dim, values)?;
        Ok(self)
    }

    /// Attach coordinate values to a dimension in place.
    pub fn set_coord(&mut self, dim: &str, values: Vec<f64>) -> ArrayResult<()> {
        let expected = self
            .axis_len(dim)
            .ok_or_else(|| ArrayError::UnknownDimension(dim.to_string()))?;
        if values.len() != expected {
            return Err(ArrayError::CoordinateLength {
                dim: dim.to_string(),
                expected,
                found: values.len(),
            });
        }
        self.coords.insert(dim.to_string(), values);
        Ok(())
    }

    /// Replace all coordinates. Every entry must name one of this array's
    /// dimensions and match its length.
    pub fn with_coords(mut self, coords: &Coords) -> ArrayResult<Self> {
        self.coords.clear();
        for (dim, values) in coords {
            self.set_coord(dim, values.clone())?;
        }
        Ok(self)
    }

    pub fn values(&self) -> &CowArray<'a, A, IxDyn> {
        &self.values
    }

    /// Borrow the values as a plain view.
    pub fn view(&self) -> ArrayViewD<'_, A> {
        self.values.view()
    }

    pub fn into_values(self) -> CowArray<'a, A, IxDyn> {
        self.values
    }

    /// True when the values borrow another array's buffer.
    pub fn is_view(&self) -> bool {
        self.values.is_view()
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn ndim(&self) -> usize {
        self.values.ndim()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of the named axis.
    pub fn axis_index(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Length of the named axis.
    pub fn axis_len(&self, dim: &str) -> Option<usize> {
        self.axis_index(dim).map(|i| self.values.shape()[i])
    }

    pub fn coords(&self) -> &Coords {
        &self.coords
    }

    pub fn coord(&self, dim: &str) -> Option<&[f64]> {
        self.coords.get(dim).map(Vec::as_slice)
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    /// The `units` attribute, if present and a string.
    pub fn units(&self) -> Option<&str> {
        self.attrs.get(UNITS_ATTR).and_then(Value::as_str)
    }
}

impl<'a, A: Clone> LabeledArray<'a, A> {
    /// Detach from any borrowed buffer, copying the values if needed.
    pub fn into_owned(self) -> LabeledArray<'static, A> {
        LabeledArray {
            values: CowArray::from(self.values.into_owned()),
            dims: self.dims,
            coords: self.coords,
            attrs: self.attrs,
        }
    }

    /// Copy of the values as an owned array.
    pub fn to_owned_values(&self) -> ArrayD<A> {
        self.values.to_owned()
    }
}
