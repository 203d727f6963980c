//! Test data generators for labeled arrays and model states.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use ndarray::{Array, ArrayD, IxDyn};
use state_common::{LabeledArray, State};

/// Creates an array whose values are their flat row-major index.
///
/// This makes it easy to verify that a permuted or flattened view reads the
/// right elements: the element at index `[i, j, k]` of a `[ni, nj, nk]`
/// array is `(i * nj + j) * nk + k`.
///
/// # Example
///
/// ```
/// use test_utils::sequential_array;
///
/// let array = sequential_array(&[2, 3]);
/// assert_eq!(array[[0, 1]], 1.0);
/// assert_eq!(array[[1, 0]], 3.0);
/// ```
pub fn sequential_array(shape: &[usize]) -> ArrayD<f64> {
    let len: usize = shape.iter().product();
    Array::from_shape_vec(IxDyn(shape), (0..len).map(|v| v as f64).collect())
        .expect("shape product matches value count")
}

/// Creates a labeled array of [`sequential_array`] values.
///
/// # Arguments
///
/// * `shape` - Axis lengths
/// * `dims` - One axis name per entry of `shape`
/// * `units` - Value of the `units` attribute
pub fn create_labeled_array(
    shape: &[usize],
    dims: &[&str],
    units: &str,
) -> LabeledArray<'static, f64> {
    LabeledArray::new(sequential_array(shape), dims.iter().copied())
        .expect("one dimension name per axis")
        .with_units(units)
}

/// Creates a labeled array with temperature-like values in Kelvin.
///
/// The values increase along the flat index from 250K towards 310K,
/// so every element is distinct.
pub fn create_temperature_array(shape: &[usize], dims: &[&str]) -> LabeledArray<'static, f64> {
    let len: usize = shape.iter().product();
    let step = 60.0 / len.max(1) as f64;
    let values = Array::from_shape_vec(
        IxDyn(shape),
        (0..len).map(|i| 250.0 + i as f64 * step).collect(),
    )
    .expect("shape product matches value count");
    LabeledArray::new(values, dims.iter().copied())
        .expect("one dimension name per axis")
        .with_units("degK")
}

/// Creates a labeled array filled with a constant value.
pub fn create_constant_array(
    shape: &[usize],
    dims: &[&str],
    units: &str,
    value: f64,
) -> LabeledArray<'static, f64> {
    LabeledArray::new(ArrayD::from_elem(IxDyn(shape), value), dims.iter().copied())
        .expect("one dimension name per axis")
        .with_units(units)
}

/// Description of one quantity for [`create_test_state`].
#[derive(Debug, Clone, Copy)]
pub struct QuantitySpec<'a> {
    pub name: &'a str,
    pub dims: &'a [&'a str],
    pub shape: &'a [usize],
    pub units: &'a str,
}

/// Creates a state of sequential labeled arrays.
///
/// # Example
///
/// ```
/// use test_utils::{create_test_state, QuantitySpec};
///
/// let state = create_test_state(&[QuantitySpec {
///     name: "air_temperature",
///     dims: &["lon", "lat"],
///     shape: &[4, 3],
///     units: "degK",
/// }]);
/// assert_eq!(state["air_temperature"].shape(), &[4, 3]);
/// ```
pub fn create_test_state(quantities: &[QuantitySpec<'_>]) -> State<'static, f64> {
    quantities
        .iter()
        .map(|q| {
            (
                q.name.to_string(),
                create_labeled_array(q.shape, q.dims, q.units),
            )
        })
        .collect()
}
