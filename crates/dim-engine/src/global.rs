//! Process-wide direction registry and default unit table.
//!
//! Components that do not carry their own [`DimensionRegistry`] share this
//! one. Configure it once before concurrent use; each call below reads a
//! snapshot at its start.

use ndarray::{ArrayBase, CowArray, Data, IxDyn};
use num_traits::Float;
use once_cell::sync::Lazy;
use state_common::{Attrs, LabeledArray, State};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::properties::{OutputPropertyMap, PropertyMap};
use crate::registry::{DimensionNames, DimensionRegistry};
use crate::units::UnitTable;
use crate::{batch, resolve, restore, view};

static REGISTRY: Lazy<RwLock<DimensionRegistry>> =
    Lazy::new(|| RwLock::new(DimensionRegistry::default()));

static UNITS: Lazy<UnitTable> = Lazy::new(UnitTable::builtin);

// The registry is a plain alias table, so a poisoned lock still holds
// usable data.
fn read() -> RwLockReadGuard<'static, DimensionRegistry> {
    REGISTRY.read().unwrap_or_else(|e| e.into_inner())
}

fn write() -> RwLockWriteGuard<'static, DimensionRegistry> {
    REGISTRY.write().unwrap_or_else(|e| e.into_inner())
}

/// Update the global aliases. See [`DimensionRegistry::set_dimension_names`].
pub fn set_dimension_names(names: &DimensionNames) {
    write().set_dimension_names(names);
}

/// Restore every direction of the global registry to its own letter.
pub fn reset_dimension_names() {
    write().reset();
}

/// Replace the global registry wholesale.
pub fn install(registry: DimensionRegistry) {
    *write() = registry;
}

/// Copy of the global registry.
pub fn snapshot() -> DimensionRegistry {
    read().clone()
}

/// The built-in unit table used by [`get_arrays_with_properties`].
pub fn default_units() -> &'static UnitTable {
    &UNITS
}

pub fn combine_dimensions<A, S: AsRef<str>>(
    arrays: &[&LabeledArray<'_, A>],
    out_dims: &[S],
) -> Result<Vec<String>> {
    resolve::combine_dimensions(&snapshot(), arrays, out_dims)
}

pub fn get_array_view<'s, A: Clone, S: AsRef<str>>(
    array: &'s LabeledArray<'_, A>,
    out_dims: &[S],
) -> Result<CowArray<'s, A, IxDyn>> {
    view::get_array_view(&snapshot(), array, out_dims)
}

pub fn restore_dimensions<'r, A, S, T>(
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
    restore::restore_dimensions(&snapshot(), raw, from_dims, template, result_attrs)
}

/// Batch extraction with the global registry and built-in units.
pub fn get_arrays_with_properties<'s, A: Float>(
    state: &'s State<'_, A>,
    properties: &PropertyMap,
) -> Result<BTreeMap<String, CowArray<'s, A, IxDyn>>> {
    batch::get_arrays_with_properties(&snapshot(), default_units(), state, properties)
}

pub fn restore_arrays_with_properties<'r, A, S>(
    raw_arrays: &'r BTreeMap<String, ArrayBase<S, IxDyn>>,
    output_properties: &OutputPropertyMap,
    state: &State<'_, A>,
) -> Result<BTreeMap<String, LabeledArray<'r, A>>>
where
    A: Clone,
    S: Data<Elem = A>,
{
    batch::restore_arrays_with_properties(&snapshot(), raw_arrays, output_properties, state)
}
