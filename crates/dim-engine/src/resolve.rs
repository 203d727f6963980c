//! Resolve requested directions to concrete axis names across arrays.

use state_common::{Direction, LabeledArray};
use std::collections::BTreeSet;
use tracing::trace;

use crate::error::{DimensionError, Result};
use crate::registry::DimensionRegistry;

/// Map each requested direction to the axis name the given arrays use for it.
///
/// Axis names are pooled across all `arrays`. For each direction the pooled
/// names matching its aliases must be unique. A requested direction none of
/// the arrays carries resolves to its own letter. An axis matching a direction
/// that was not requested is an error, since it would be silently dropped.
///
/// The wildcard is not accepted here.
pub fn combine_dimensions<A, S: AsRef<str>>(
    registry: &DimensionRegistry,
    arrays: &[&LabeledArray<'_, A>],
    out_dims: &[S],
) -> Result<Vec<String>> {
    let requested = Direction::parse_list(out_dims)?;

    let all_dims: BTreeSet<&str> = arrays
        .iter()
        .flat_map(|array| array.dims().iter().map(String::as_str))
        .collect();

    let mut resolved: Vec<Option<String>> = vec![None; requested.len()];
    for direction in Direction::ALL {
        let matching: Vec<&str> = all_dims
            .iter()
            .copied()
            .filter(|name| registry.matches(direction, name))
            .collect();
        if matching.len() > 1 {
            return Err(DimensionError::AmbiguousAxis {
                direction,
                candidates: matching.into_iter().map(str::to_string).collect(),
            });
        }

        match requested.iter().position(|d| *d == direction) {
            Some(index) => {
                let name = matching
                    .first()
                    .copied()
                    .unwrap_or_else(|| direction.as_str());
                resolved[index] = Some(name.to_string());
            }
            None => {
                if let Some(name) = matching.first() {
                    return Err(DimensionError::configuration(format!(
                        "dimension {name} along {direction} direction is present but \
                         excluded from output dimensions"
                    )));
                }
            }
        }
    }

    let names: Vec<String> = resolved.into_iter().flatten().collect();
    trace!(out_dims = ?names, "Combined dimensions");
    Ok(names)
}
