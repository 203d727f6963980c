//! State description files.
//!
//! The inspector never reads array data. A state file lists each quantity's
//! axis names, shape and units, and the inspector builds zero-filled arrays
//! from it:
//!
//! ```yaml
//! air_temperature:
//!   dims: [lon, lat, mid_levels]
//!   shape: [4, 3, 10]
//!   units: degK
//! ```

use anyhow::{bail, Context, Result};
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use state_common::{Coords, LabeledArray, State};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Layout of one quantity in a state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityDescription {
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub coords: Coords,
}

pub type StateDescription = BTreeMap<String, QuantityDescription>;

pub fn load_state_description(path: &Path) -> Result<StateDescription> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    parse_state_description(&content)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))
}

pub fn parse_state_description(content: &str) -> Result<StateDescription> {
    Ok(serde_yaml::from_str(content)?)
}

/// Build zero-filled labeled arrays for every described quantity.
pub fn build_state(description: &StateDescription) -> Result<State<'static>> {
    let mut state = State::new();
    for (name, quantity) in description {
        if quantity.dims.len() != quantity.shape.len() {
            bail!(
                "quantity {name} has {} dims but a shape of rank {}",
                quantity.dims.len(),
                quantity.shape.len()
            );
        }
        let mut array = LabeledArray::new(
            ArrayD::<f64>::zeros(IxDyn(&quantity.shape)),
            quantity.dims.iter().cloned(),
        )
        .and_then(|a| a.with_coords(&quantity.coords))
        .with_context(|| format!("Invalid description for quantity {name}"))?;
        if let Some(units) = &quantity.units {
            array = array.with_units(units.clone());
        }
        state.insert(name.clone(), array);
    }
    Ok(state)
}
