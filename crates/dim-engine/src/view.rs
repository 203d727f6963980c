//! Raw array views in a requested direction order.
//!
//! A [`ViewPlan`] records, for one array, which axes land at each requested
//! output position. Applying the plan permutes the axes, inserts length-1
//! axes for directions the array does not have and flattens the wildcard
//! span into a single axis. Everything stays a view of the original buffer
//! unless the wildcard axes cannot be merged with their current strides, in
//! which case the values are copied into standard layout.
//!
//! ```text
//! dims [lon, lat, lev]      out_dims [*, z]
//!         │
//!         ├─► permute        [lon, lat | lev]
//!         ├─► insert 1s      (none missing)
//!         └─► merge span     [lon*lat, lev]
//! ```

use ndarray::{Array, ArrayBase, ArrayD, ArrayViewD, Axis, CowArray, Data, IxDyn, RawData};
use state_common::{ArrayError, Direction, LabeledArray, OutDim};
use std::ops::Range;
use tracing::{debug, trace};

use crate::error::{DimensionError, Result};
use crate::registry::DimensionRegistry;

/// Axis assignment of one array for an ordered list of output dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPlan {
    out_dims: Vec<OutDim>,
    /// Source axis indices per output position. The wildcard group is in
    /// declaration order unless realigned with [`ViewPlan::with_wildcard_order`].
    groups: Vec<Vec<usize>>,
    dims: Vec<String>,
    source_shape: Vec<usize>,
}

/// Result of rearranging an array according to a plan.
enum Arranged<S: RawData> {
    Flattened(ArrayBase<S, IxDyn>),
    Copied(ArrayD<S::Elem>),
}

impl ViewPlan {
    /// Plan a view of an array with the given axis names and shape.
    pub fn new<S: AsRef<str>>(
        registry: &DimensionRegistry,
        dims: &[String],
        shape: &[usize],
        out_dims: &[S],
    ) -> Result<Self> {
        let out_dims = OutDim::parse_list(out_dims)?;
        Self::from_out_dims(registry, dims, shape, &out_dims)
    }

    /// Plan a view of a labeled array.
    pub fn for_array<A, S: AsRef<str>>(
        registry: &DimensionRegistry,
        array: &LabeledArray<'_, A>,
        out_dims: &[S],
    ) -> Result<Self> {
        Self::new(registry, array.dims(), array.shape(), out_dims)
    }

    /// Plan a view from already parsed output dimensions.
    pub fn from_out_dims(
        registry: &DimensionRegistry,
        dims: &[String],
        shape: &[usize],
        out_dims: &[OutDim],
    ) -> Result<Self> {
        OutDim::check_unique(out_dims)?;
        if dims.len() != shape.len() {
            return Err(ArrayError::RankMismatch {
                dims: dims.len(),
                ndim: shape.len(),
            }
            .into());
        }

        let mut claimed = vec![false; dims.len()];
        let mut groups: Vec<Vec<usize>> = Vec::with_capacity(out_dims.len());
        for out_dim in out_dims {
            let direction = match out_dim {
                OutDim::Axis(direction) => *direction,
                OutDim::Wildcard => {
                    groups.push(Vec::new());
                    continue;
                }
            };
            let matching: Vec<usize> = dims
                .iter()
                .enumerate()
                .filter(|(_, name)| registry.matches(direction, name))
                .map(|(i, _)| i)
                .collect();
            if matching.len() > 1 {
                return Err(DimensionError::AmbiguousAxis {
                    direction,
                    candidates: matching.iter().map(|&i| dims[i].clone()).collect(),
                });
            }
            for &i in &matching {
                if claimed[i] {
                    return Err(DimensionError::configuration(format!(
                        "dimension {} is claimed by more than one requested direction",
                        dims[i]
                    )));
                }
                claimed[i] = true;
            }
            groups.push(matching);
        }

        let unclaimed: Vec<usize> = (0..dims.len()).filter(|&i| !claimed[i]).collect();
        match out_dims.iter().position(OutDim::is_wildcard) {
            Some(position) => groups[position] = unclaimed,
            None if !unclaimed.is_empty() => {
                let names: Vec<&str> = unclaimed.iter().map(|&i| dims[i].as_str()).collect();
                return Err(DimensionError::configuration(format!(
                    "dimensions {names:?} present but not included in output dimensions {:?}",
                    out_dims.iter().map(OutDim::as_str).collect::<Vec<_>>()
                )));
            }
            None => {}
        }

        let plan = Self {
            out_dims: out_dims.to_vec(),
            groups,
            dims: dims.to_vec(),
            source_shape: shape.to_vec(),
        };
        trace!(dims = ?plan.dims, out_dims = ?plan.out_dims, groups = ?plan.groups, "Planned view");
        Ok(plan)
    }

    pub fn out_dims(&self) -> &[OutDim] {
        &self.out_dims
    }

    /// Axis names of the planned array.
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn source_shape(&self) -> &[usize] {
        &self.source_shape
    }

    /// The axis name matched to an explicitly requested direction, if any.
    pub fn explicit_axis(&self, direction: Direction) -> Option<&str> {
        let position = self
            .out_dims
            .iter()
            .position(|d| *d == OutDim::Axis(direction))?;
        self.groups[position].first().map(|&i| self.dims[i].as_str())
    }

    /// Axis names collected by the wildcard, in flattening order.
    pub fn wildcard_axes(&self) -> Vec<&str> {
        self.out_dims
            .iter()
            .position(OutDim::is_wildcard)
            .map(|p| self.groups[p].iter().map(|&i| self.dims[i].as_str()).collect())
            .unwrap_or_default()
    }

    /// Axis names landing at each output position.
    pub fn position_axes(&self) -> Vec<Vec<&str>> {
        self.groups
            .iter()
            .map(|g| g.iter().map(|&i| self.dims[i].as_str()).collect())
            .collect()
    }

    /// The same plan with the wildcard axes flattened in `order`.
    ///
    /// Returns `None` unless `order` names exactly the wildcard axes.
    pub fn with_wildcard_order(&self, order: &[&str]) -> Option<Self> {
        let position = self.out_dims.iter().position(OutDim::is_wildcard)?;
        let group = &self.groups[position];
        if group.len() != order.len() {
            return None;
        }
        let reordered = order
            .iter()
            .map(|name| group.iter().copied().find(|&i| self.dims[i] == *name))
            .collect::<Option<Vec<usize>>>()?;

        let mut plan = self.clone();
        plan.groups[position] = reordered;
        Some(plan)
    }

    /// `name=length` for every axis in output order, with `direction=1`
    /// standing in for synthetic positions.
    pub fn axis_lengths(&self) -> Vec<String> {
        self.out_dims
            .iter()
            .zip(&self.groups)
            .flat_map(|(out_dim, group)| {
                if group.is_empty() {
                    vec![format!("{out_dim}=1")]
                } else {
                    group
                        .iter()
                        .map(|&i| format!("{}={}", self.dims[i], self.source_shape[i]))
                        .collect()
                }
            })
            .collect()
    }

    /// Source axis order after permutation.
    pub fn permutation(&self) -> Vec<usize> {
        self.groups.iter().flatten().copied().collect()
    }

    /// Shape of the planned view: one entry per output position.
    pub fn final_shape(&self) -> Vec<usize> {
        self.groups
            .iter()
            .map(|g| g.iter().map(|&i| self.source_shape[i]).product())
            .collect()
    }

    /// Axis lengths per output position before the wildcard is flattened.
    ///
    /// Explicit positions hold one length (1 when synthetic); the wildcard
    /// holds the lengths of its constituent axes.
    pub fn expanded_lengths(&self) -> Vec<Vec<usize>> {
        self.out_dims
            .iter()
            .zip(&self.groups)
            .map(|(out_dim, group)| {
                if group.is_empty() && !out_dim.is_wildcard() {
                    vec![1]
                } else {
                    group.iter().map(|&i| self.source_shape[i]).collect()
                }
            })
            .collect()
    }

    /// Lengths of the source axes in permuted order.
    fn permuted_shape(&self) -> Vec<usize> {
        self.permutation()
            .into_iter()
            .map(|i| self.source_shape[i])
            .collect()
    }

    /// Apply the plan to a borrowed array, copying only if the wildcard span
    /// cannot be merged in place.
    pub fn apply_view<'v, A: Clone>(
        &self,
        view: ArrayViewD<'v, A>,
    ) -> Result<CowArray<'v, A, IxDyn>> {
        Ok(match self.arrange(view)? {
            Arranged::Flattened(v) => CowArray::from(v),
            Arranged::Copied(a) => CowArray::from(a),
        })
    }

    /// Apply the plan to an owned array.
    pub fn apply_owned<A: Clone>(&self, array: ArrayD<A>) -> Result<ArrayD<A>> {
        Ok(match self.arrange(array)? {
            Arranged::Flattened(a) | Arranged::Copied(a) => a,
        })
    }

    fn arrange<A, S>(&self, array: ArrayBase<S, IxDyn>) -> Result<Arranged<S>>
    where
        A: Clone,
        S: Data<Elem = A>,
    {
        if array.shape() != self.source_shape.as_slice() {
            return Err(DimensionError::configuration(format!(
                "array shape {:?} does not match planned shape {:?}",
                array.shape(),
                self.source_shape
            )));
        }

        let mut arranged = array.permuted_axes(self.permutation());
        let mut cursor = 0;
        let mut span: Option<Range<usize>> = None;
        for (out_dim, group) in self.out_dims.iter().zip(&self.groups) {
            if group.is_empty() {
                arranged = arranged.insert_axis(Axis(cursor));
                cursor += 1;
                continue;
            }
            if out_dim.is_wildcard() && group.len() > 1 {
                span = Some(cursor..cursor + group.len());
            }
            cursor += group.len();
        }

        let Some(span) = span else {
            return Ok(Arranged::Flattened(arranged));
        };
        if arranged.is_empty() {
            // Zero-length spans cannot be merged in place.
            let empty = Array::from_shape_vec(IxDyn(&self.final_shape()), Vec::new())?;
            return Ok(Arranged::Copied(empty));
        }

        // Merge outer axes into the innermost axis of the span, innermost first.
        let into = Axis(span.end - 1);
        for take in (span.start..span.end - 1).rev() {
            if !arranged.merge_axes(Axis(take), into) {
                debug!(
                    dims = ?self.dims,
                    wildcard = ?self.wildcard_axes(),
                    "Wildcard axes not mergeable, copying"
                );
                let values: Vec<A> = arranged.iter().cloned().collect();
                let copied = Array::from_shape_vec(IxDyn(&self.final_shape()), values)?;
                return Ok(Arranged::Copied(copied));
            }
        }
        for take in (span.start..span.end - 1).rev() {
            arranged = arranged.remove_axis(Axis(take));
        }
        Ok(Arranged::Flattened(arranged))
    }

    /// Undo the plan on a raw array shaped like [`ViewPlan::final_shape`].
    ///
    /// Splits the wildcard axis, drops synthetic axes and restores the source
    /// axis order. The result borrows `raw` whenever its strides allow.
    pub fn unflatten<'r, A, S>(
        &self,
        raw: &'r ArrayBase<S, IxDyn>,
    ) -> Result<CowArray<'r, A, IxDyn>>
    where
        A: Clone,
        S: Data<Elem = A>,
    {
        let reshaped = raw.to_shape(IxDyn(&self.permuted_shape()))?;
        let mut inverse = vec![0; self.dims.len()];
        for (position, axis) in self.permutation().into_iter().enumerate() {
            inverse[axis] = position;
        }
        Ok(reshaped.permuted_axes(inverse))
    }
}

/// Return a raw view of `array` with axes in `out_dims` order.
///
/// Tokens are `x`, `y`, `z` and the wildcard `*`. Directions the array lacks
/// become length-1 axes; the wildcard becomes one axis holding every axis
/// not claimed by an explicit direction.
pub fn get_array_view<'s, A, S>(
    registry: &DimensionRegistry,
    array: &'s LabeledArray<'_, A>,
    out_dims: &[S],
) -> Result<CowArray<'s, A, IxDyn>>
where
    A: Clone,
    S: AsRef<str>,
{
    ViewPlan::for_array(registry, array, out_dims)?.apply_view(array.view())
}

/// Byte range spanned by an array's elements.
///
/// Two arrays with the same span over a non-empty buffer share memory. Empty
/// arrays span an empty range at their data pointer.
pub fn memory_span<S, D>(array: &ArrayBase<S, D>) -> Range<usize>
where
    S: RawData,
    D: ndarray::Dimension,
{
    let start = array.as_ptr() as usize;
    if array.is_empty() {
        return start..start;
    }
    let (mut low, mut high) = (0isize, 0isize);
    for (&len, &stride) in array.shape().iter().zip(array.strides()) {
        let extent = (len as isize - 1) * stride;
        if extent < 0 {
            low += extent;
        } else {
            high += extent;
        }
    }
    let size = std::mem::size_of::<S::Elem>() as isize;
    let low = start as isize + low * size;
    let high = start as isize + (high + 1) * size;
    low as usize..high as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DimensionNames;
    use ndarray::{s, Array1};

    fn sequential(shape: &[usize]) -> ArrayD<f64> {
        let n: usize = shape.iter().product();
        Array::from_shape_vec(IxDyn(shape), (0..n).map(|v| v as f64).collect()).unwrap()
    }

    fn build_plan(
        registry: &DimensionRegistry,
        names: &[&str],
        shape: &[usize],
        out: &[&str],
    ) -> ViewPlan {
        let dims: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        ViewPlan::new(registry, &dims, shape, out).unwrap()
    }

    fn plan_err(
        registry: &DimensionRegistry,
        names: &[&str],
        shape: &[usize],
        out: &[&str],
    ) -> DimensionError {
        let dims: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        ViewPlan::new(registry, &dims, shape, out).unwrap_err()
    }

    #[test]
    fn test_plan_groups_and_shapes() {
        let registry = DimensionRegistry::with_names(&DimensionNames::new().z("lev"));
        let plan = build_plan(&registry, &["lon", "lat", "lev"], &[2, 3, 4], &["*", "z"]);
        assert_eq!(plan.wildcard_axes(), vec!["lon", "lat"]);
        assert_eq!(plan.position_axes(), vec![vec!["lon", "lat"], vec!["lev"]]);
        assert_eq!(plan.explicit_axis(Direction::Z), Some("lev"));
        assert_eq!(plan.explicit_axis(Direction::X), None);
        assert_eq!(plan.permutation(), vec![0, 1, 2]);
        assert_eq!(plan.final_shape(), vec![6, 4]);
        assert_eq!(plan.expanded_lengths(), vec![vec![2, 3], vec![4]]);
        assert_eq!(plan.axis_lengths(), vec!["lon=2", "lat=3", "lev=4"]);
    }

    #[test]
    fn test_synthetic_and_empty_wildcard_positions() {
        let registry = DimensionRegistry::default();
        let plan = build_plan(&registry, &["x"], &[5], &["x", "y", "*"]);
        assert_eq!(plan.final_shape(), vec![5, 1, 1]);
        assert_eq!(plan.expanded_lengths(), vec![vec![5], vec![1], vec![]]);
        assert_eq!(plan.axis_lengths(), vec!["x=5", "y=1", "*=1"]);
    }

    #[test]
    fn test_unclaimed_without_wildcard_is_error() {
        let registry = DimensionRegistry::default();
        let err = plan_err(&registry, &["x", "tracer"], &[2, 3], &["x"]);
        assert!(matches!(err, DimensionError::Configuration(msg) if msg.contains("tracer")));

        let err = plan_err(&registry, &["x"], &[2], &[]);
        assert!(matches!(err, DimensionError::Configuration(_)));
    }

    #[test]
    fn test_ambiguous_axis_in_one_array() {
        let registry =
            DimensionRegistry::with_names(&DimensionNames::new().z(vec!["lev", "ilev"]));
        let err = plan_err(&registry, &["lev", "ilev"], &[2, 3], &["z"]);
        assert!(matches!(
            err,
            DimensionError::AmbiguousAxis { direction: Direction::Z, .. }
        ));
    }

    #[test]
    fn test_axis_claimed_by_two_directions() {
        let registry =
            DimensionRegistry::with_names(&DimensionNames::new().x("cell").y("cell"));
        let err = plan_err(&registry, &["cell"], &[4], &["x", "y"]);
        assert!(matches!(err, DimensionError::Configuration(_)));
    }

    #[test]
    fn test_transpose_is_view() {
        let registry = DimensionRegistry::default();
        let data = sequential(&[2, 3, 4]);
        let plan = build_plan(&registry, &["x", "y", "z"], &[2, 3, 4], &["z", "y", "x"]);
        let view = plan.apply_view(data.view()).unwrap();
        assert!(view.is_view());
        assert_eq!(view.shape(), &[4, 3, 2]);
        assert_eq!(view[[3, 2, 1]], data[[1, 2, 3]]);
        assert_eq!(memory_span(&view), memory_span(&data));
    }

    #[test]
    fn test_contiguous_wildcard_merges_without_copy() {
        let registry = DimensionRegistry::default();
        let data = sequential(&[2, 3, 4]);
        let plan = build_plan(&registry, &["a", "b", "z"], &[2, 3, 4], &["*", "z"]);
        let view = plan.apply_view(data.view()).unwrap();
        assert!(view.is_view());
        assert_eq!(view.shape(), &[6, 4]);
        assert_eq!(view[[5, 3]], data[[1, 2, 3]]);
    }

    #[test]
    fn test_strided_wildcard_copies() {
        let registry = DimensionRegistry::default();
        let data = sequential(&[2, 3, 4]);
        // wildcard axes a and c are not adjacent in memory
        let plan = build_plan(&registry, &["a", "y", "c"], &[2, 3, 4], &["y", "*"]);
        let view = plan.apply_view(data.view()).unwrap();
        assert!(!view.is_view());
        assert_eq!(view.shape(), &[3, 8]);
        for a in 0..2 {
            for y in 0..3 {
                for c in 0..4 {
                    assert_eq!(view[[y, a * 4 + c]], data[[a, y, c]]);
                }
            }
        }
    }

    #[test]
    fn test_zero_size_wildcard() {
        let registry = DimensionRegistry::default();
        let data = ArrayD::<f64>::zeros(IxDyn(&[0, 3, 2]));
        let plan = build_plan(&registry, &["a", "b", "z"], &[0, 3, 2], &["z", "*"]);

        let view = plan.apply_view(data.view()).unwrap();
        assert_eq!(view.shape(), &[2, 0]);
        let owned = plan.apply_owned(data.clone()).unwrap();
        assert_eq!(owned.shape(), &[2, 0]);

        let restored = plan.unflatten(&view).unwrap();
        assert_eq!(restored.shape(), &[0, 3, 2]);
    }

    #[test]
    fn test_wildcard_order_realigned() {
        let registry = DimensionRegistry::default();
        let data = sequential(&[2, 3, 4]);
        let plan = build_plan(&registry, &["a", "b", "z"], &[2, 3, 4], &["*", "z"]);

        let realigned = plan.with_wildcard_order(&["b", "a"]).unwrap();
        assert_eq!(realigned.wildcard_axes(), vec!["b", "a"]);
        assert_eq!(realigned.permutation(), vec![1, 0, 2]);
        assert_eq!(realigned.final_shape(), vec![6, 4]);

        let view = realigned.apply_view(data.view()).unwrap();
        assert_eq!(view[[1, 3]], data[[1, 0, 3]]);
        assert_eq!(view[[2, 0]], data[[0, 1, 0]]);
        assert_eq!(realigned.unflatten(&view).unwrap().to_owned(), data);

        assert!(plan.with_wildcard_order(&["a", "c"]).is_none());
        assert!(plan.with_wildcard_order(&["a"]).is_none());
    }

    #[test]
    fn test_apply_owned_matches_view() {
        let registry = DimensionRegistry::default();
        let data = sequential(&[2, 3, 4]);
        let plan = build_plan(&registry, &["a", "y", "c"], &[2, 3, 4], &["*", "y"]);
        let owned = plan.apply_owned(data.clone()).unwrap();
        let view = plan.apply_view(data.view()).unwrap();
        assert_eq!(owned, view.to_owned());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let registry = DimensionRegistry::default();
        let plan = build_plan(&registry, &["x"], &[3], &["x"]);
        assert!(plan.apply_view(sequential(&[4]).view()).is_err());
    }

    #[test]
    fn test_unflatten_inverts_apply() {
        let registry = DimensionRegistry::default();
        let data = sequential(&[2, 3, 4]);
        let plan = build_plan(&registry, &["a", "y", "c"], &[2, 3, 4], &["y", "x", "*"]);
        let view = plan.apply_view(data.view()).unwrap();
        assert_eq!(view.shape(), &[3, 1, 8]);
        let restored = plan.unflatten(&view).unwrap();
        assert_eq!(restored.shape(), &[2, 3, 4]);
        assert_eq!(restored.to_owned(), data);
    }

    #[test]
    fn test_memory_span_of_reversed_and_empty() {
        let data = Array1::from(vec![0.0, 1.0, 2.0, 3.0]);
        let full = memory_span(&data);
        assert_eq!(full.end - full.start, 4 * std::mem::size_of::<f64>());

        let reversed = data.slice(s![..;-1]);
        assert_eq!(memory_span(&reversed), full);

        let empty = ArrayD::<f64>::zeros(IxDyn(&[0, 3]));
        let span = memory_span(&empty);
        assert!(span.is_empty());
    }
}
