//! Extract and restore whole sets of quantities.

use ndarray::{ArrayBase, ArrayD, CowArray, Data, IxDyn};
use num_traits::{Float, Zero};
use serde_json::Value;
use state_common::{Attrs, LabeledArray, OutDim, State, UNITS_ATTR};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

use crate::error::{DimensionError, Result, StateMismatch};
use crate::properties::{OutputPropertyMap, PropertyMap};
use crate::registry::DimensionRegistry;
use crate::restore::restore_with_plan;
use crate::units::{convert_array, UnitConverter};
use crate::view::ViewPlan;

/// Raw views of every quantity named in `properties`.
///
/// Each quantity is converted to its requested units when they differ from
/// its `units` attribute (into a new buffer) and laid out in its requested
/// direction order. The result is keyed by alias where one is given and
/// holds exactly the requested quantities.
pub fn get_arrays_with_properties<'s, A, C>(
    registry: &DimensionRegistry,
    converter: &C,
    state: &'s State<'_, A>,
    properties: &PropertyMap,
) -> Result<BTreeMap<String, CowArray<'s, A, IxDyn>>>
where
    A: Float,
    C: UnitConverter + ?Sized,
{
    let missing: Vec<String> = properties
        .keys()
        .filter(|name| !state.contains_key(*name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(StateMismatch::MissingQuantities(missing).into());
    }

    let mut output_names = BTreeSet::new();
    for (name, spec) in properties {
        let output_name = spec.output_name(name);
        if !output_names.insert(output_name) {
            return Err(DimensionError::configuration(format!(
                "output name {output_name} is used by more than one quantity"
            )));
        }
    }

    check_dimension_lengths(properties.keys().filter_map(|name| state.get(name)))?;

    let mut arrays = BTreeMap::new();
    for (name, spec) in properties {
        let Some(array) = state.get(name) else {
            continue;
        };
        let units = array
            .units()
            .ok_or_else(|| StateMismatch::MissingUnits(name.clone()))?;
        let plan = property_plan(registry, state, properties, name)?;

        let values = if units == spec.units {
            plan.apply_view(array.view())?
        } else {
            debug!(quantity = %name, from = units, to = %spec.units, "Converting units");
            let converted = convert_array(converter, array.values(), units, &spec.units)
                .map_err(|source| DimensionError::Unit {
                    quantity: name.clone(),
                    source,
                })?;
            CowArray::from(plan.apply_owned(converted)?)
        };
        arrays.insert(spec.output_name(name).to_string(), values);
    }
    Ok(arrays)
}

/// The view plan used to extract `name` from `state`.
///
/// With `match_dims_like` set, the plan follows the assignment of the
/// reference quantity.
pub fn property_plan<A>(
    registry: &DimensionRegistry,
    state: &State<'_, A>,
    properties: &PropertyMap,
    name: &str,
) -> Result<ViewPlan> {
    let Some(spec) = properties.get(name) else {
        return Err(DimensionError::configuration(format!(
            "quantity {name} is not a requested quantity"
        )));
    };
    let Some(array) = state.get(name) else {
        return Err(StateMismatch::MissingQuantities(vec![name.to_string()]).into());
    };
    let plan = ViewPlan::from_out_dims(registry, array.dims(), array.shape(), &spec.dims)?;
    match &spec.match_dims_like {
        Some(reference) => align_with_reference(registry, state, properties, name, plan, reference),
        None => Ok(plan),
    }
}

/// Labeled arrays for every quantity named in `output_properties`.
///
/// Each raw array (looked up by alias where one is given) is restored to the
/// axes and coordinates of its `dims_like` state quantity. Attributes are
/// exactly `{units}` from the output property; no conversion is done. The
/// result is keyed by quantity name.
pub fn restore_arrays_with_properties<'r, A, S>(
    registry: &DimensionRegistry,
    raw_arrays: &'r BTreeMap<String, ArrayBase<S, IxDyn>>,
    output_properties: &OutputPropertyMap,
    state: &State<'_, A>,
) -> Result<BTreeMap<String, LabeledArray<'r, A>>>
where
    A: Clone,
    S: Data<Elem = A>,
{
    let mut missing = BTreeSet::new();
    for (name, spec) in output_properties {
        let raw_name = spec.raw_name(name);
        if !raw_arrays.contains_key(raw_name) {
            missing.insert(raw_name.to_string());
        }
        if !state.contains_key(&spec.dims_like) {
            missing.insert(spec.dims_like.clone());
        }
    }
    if !missing.is_empty() {
        return Err(StateMismatch::MissingQuantities(missing.into_iter().collect()).into());
    }

    let mut restored = BTreeMap::new();
    for (name, spec) in output_properties {
        let (Some(raw), Some(template)) = (
            raw_arrays.get(spec.raw_name(name)),
            state.get(&spec.dims_like),
        ) else {
            continue;
        };
        let plan =
            ViewPlan::from_out_dims(registry, template.dims(), template.shape(), &spec.dims)?;
        let mut attrs = Attrs::new();
        attrs.insert(UNITS_ATTR.to_string(), Value::String(spec.units.clone()));

        let array = restore_with_plan(&plan, raw, template, attrs, name, &spec.dims_like)?;
        restored.insert(name.clone(), array);
    }
    Ok(restored)
}

/// Zero-filled raw arrays shaped for each output quantity.
///
/// Shapes follow the `dims_like` template under the output's `dims`, so a
/// component can fill them and hand them to
/// [`restore_arrays_with_properties`]. Keyed like the raw arrays that
/// function expects.
pub fn initialize_arrays_with_properties<A>(
    registry: &DimensionRegistry,
    output_properties: &OutputPropertyMap,
    state: &State<'_, A>,
) -> Result<BTreeMap<String, ArrayD<A>>>
where
    A: Clone + Zero,
{
    let missing: BTreeSet<String> = output_properties
        .values()
        .filter(|spec| !state.contains_key(&spec.dims_like))
        .map(|spec| spec.dims_like.clone())
        .collect();
    if !missing.is_empty() {
        return Err(StateMismatch::MissingQuantities(missing.into_iter().collect()).into());
    }

    let mut arrays = BTreeMap::new();
    for (name, spec) in output_properties {
        let Some(template) = state.get(&spec.dims_like) else {
            continue;
        };
        let plan =
            ViewPlan::from_out_dims(registry, template.dims(), template.shape(), &spec.dims)?;
        arrays.insert(
            spec.raw_name(name).to_string(),
            ArrayD::zeros(IxDyn(&plan.final_shape())),
        );
    }
    Ok(arrays)
}

/// Fail if the two maps share any key.
pub fn ensure_no_shared_keys<V, W>(
    first: &BTreeMap<String, V>,
    second: &BTreeMap<String, W>,
) -> Result<()> {
    let shared: Vec<String> = first
        .keys()
        .filter(|key| second.contains_key(*key))
        .cloned()
        .collect();
    if shared.is_empty() {
        Ok(())
    } else {
        Err(DimensionError::SharedKeys(shared))
    }
}

/// Every axis name must have one length across the arrays.
fn check_dimension_lengths<'a, 'b: 'a, A: 'b>(
    arrays: impl Iterator<Item = &'a LabeledArray<'b, A>>,
) -> Result<()> {
    let mut lengths: BTreeMap<&str, usize> = BTreeMap::new();
    for array in arrays {
        for (dim, &len) in array.dims().iter().zip(array.shape()) {
            match lengths.get(dim.as_str()) {
                Some(&first) if first != len => {
                    return Err(StateMismatch::ConflictingLength {
                        dim: dim.clone(),
                        first,
                        second: len,
                    }
                    .into());
                }
                Some(_) => {}
                None => {
                    lengths.insert(dim.as_str(), len);
                }
            }
        }
    }
    Ok(())
}

/// Plan `name` on the assignment computed for `reference`.
///
/// The wildcard axes of `name` are flattened in the order `reference` uses
/// and must be the same axes. Positions where either side has no axis (a
/// synthetic length-1 axis or an empty wildcard) are not compared.
fn align_with_reference<A>(
    registry: &DimensionRegistry,
    state: &State<'_, A>,
    properties: &PropertyMap,
    name: &str,
    plan: ViewPlan,
    reference: &str,
) -> Result<ViewPlan> {
    if !properties.contains_key(reference) {
        return Err(DimensionError::configuration(format!(
            "quantity {name} matches dims like {reference}, which is not a requested quantity"
        )));
    }
    let Some(reference_array) = state.get(reference) else {
        return Err(StateMismatch::MissingQuantities(vec![reference.to_string()]).into());
    };

    let reference_plan = match ViewPlan::from_out_dims(
        registry,
        reference_array.dims(),
        reference_array.shape(),
        plan.out_dims(),
    ) {
        Ok(reference_plan) => reference_plan,
        Err(DimensionError::Configuration(_)) => {
            let expected = reference_array
                .dims()
                .iter()
                .zip(reference_array.shape())
                .map(|(dim, len)| format!("{dim}={len}"))
                .collect();
            return Err(DimensionError::misaligned(
                name,
                reference,
                expected,
                plan.axis_lengths(),
            ));
        }
        Err(other) => return Err(other),
    };
    let misaligned = |plan: &ViewPlan| {
        DimensionError::misaligned(
            name,
            reference,
            reference_plan.axis_lengths(),
            plan.axis_lengths(),
        )
    };

    let reference_wildcard = reference_plan.wildcard_axes();
    let plan = if plan.wildcard_axes().is_empty() || reference_wildcard.is_empty() {
        plan
    } else {
        plan.with_wildcard_order(&reference_wildcard)
            .ok_or_else(|| misaligned(&plan))?
    };

    let compatible = plan
        .out_dims()
        .iter()
        .zip(plan.expanded_lengths())
        .zip(reference_plan.expanded_lengths())
        .all(|((out_dim, ours), theirs)| match out_dim {
            OutDim::Wildcard => ours.is_empty() || theirs.is_empty() || ours == theirs,
            OutDim::Axis(_) => ours == [1] || theirs == [1] || ours == theirs,
        });
    if !compatible {
        return Err(misaligned(&plan));
    }
    trace!(
        quantity = %name,
        reference = %reference,
        wildcard = ?plan.wildcard_axes(),
        "Aligned plan"
    );
    Ok(plan)
}
