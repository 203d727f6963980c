//! Rebuild labeled arrays from raw computation results.

use ndarray::{ArrayBase, Data, IxDyn};
use state_common::{Attrs, LabeledArray};

use crate::error::{DimensionError, Result};
use crate::registry::DimensionRegistry;
use crate::view::ViewPlan;

/// Restore a raw array laid out as `from_dims` to the axes of `template`.
///
/// `raw` must have exactly the shape `get_array_view` would produce for the
/// template under the same `from_dims`. The result carries the template's
/// dims and coords and exactly `result_attrs`; it borrows `raw` whenever the
/// wildcard split allows.
pub fn restore_dimensions<'r, A, S, T>(
    registry: &DimensionRegistry,
    raw: &'r ArrayBase<S, IxDyn>,
    from_dims: &[T],
    template: &LabeledArray<'_, A>,
    result_attrs: Attrs,
) -> Result<LabeledArray<'r, A>>
where
    A: Clone,
    S: Data<Elem = A>,
    T: AsRef<str>,
{
    let plan = ViewPlan::for_array(registry, template, from_dims)?;
    restore_with_plan(&plan, raw, template, result_attrs, "raw", "template")
}

/// Restore with an existing plan; `quantity` and `reference` name the raw
/// array and template in shape errors.
pub(crate) fn restore_with_plan<'r, A, S>(
    plan: &ViewPlan,
    raw: &'r ArrayBase<S, IxDyn>,
    template: &LabeledArray<'_, A>,
    result_attrs: Attrs,
    quantity: &str,
    reference: &str,
) -> Result<LabeledArray<'r, A>>
where
    A: Clone,
    S: Data<Elem = A>,
{
    let expected = plan.final_shape();
    if raw.shape() != expected.as_slice() {
        return Err(DimensionError::incompatible_shape(
            quantity,
            reference,
            &expected,
            raw.shape(),
        ));
    }

    let values = plan.unflatten(raw)?;
    let restored = LabeledArray::new(values, template.dims().iter().cloned())?
        .with_coords(template.coords())?
        .with_attrs(result_attrs);
    Ok(restored)
}
