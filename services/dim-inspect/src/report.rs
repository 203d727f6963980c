//! Inspection reports and their formatting.

use anyhow::Result;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use dim_engine::{
    get_arrays_with_properties, initialize_arrays_with_properties, property_plan,
    restore_arrays_with_properties, DimensionRegistry, OutputPropertyMap, PropertyMap,
    UnitConverter,
};
use serde::Serialize;
use state_common::State;

/// How one input quantity is handed to a component.
#[derive(Debug, Clone, Serialize)]
pub struct InputReport {
    pub quantity: String,
    pub output_name: String,
    pub out_dims: Vec<String>,
    /// Axis names per output position.
    pub axes: Vec<Vec<String>>,
    pub shape: Vec<usize>,
    pub source_units: String,
    pub units: String,
    pub zero_copy: bool,
}

/// How one output quantity is restored.
#[derive(Debug, Clone, Serialize)]
pub struct OutputReport {
    pub quantity: String,
    pub raw_name: String,
    pub dims_like: String,
    pub raw_shape: Vec<usize>,
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    pub units: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanReport {
    pub inputs: Vec<InputReport>,
    pub outputs: Vec<OutputReport>,
}

impl PlanReport {
    /// Run extraction (and restoration, if outputs are given) over `state`
    /// and record the resulting layouts.
    pub fn build<C: UnitConverter + ?Sized>(
        registry: &DimensionRegistry,
        converter: &C,
        state: &State<'_>,
        properties: &PropertyMap,
        outputs: &OutputPropertyMap,
    ) -> Result<Self> {
        let arrays = get_arrays_with_properties(registry, converter, state, properties)?;

        let mut report = PlanReport::default();
        for (name, spec) in properties {
            let Some(array) = state.get(name) else {
                continue;
            };
            let output_name = spec.output_name(name);
            let Some(raw) = arrays.get(output_name) else {
                continue;
            };
            let plan = property_plan(registry, state, properties, name)?;
            report.inputs.push(InputReport {
                quantity: name.clone(),
                output_name: output_name.to_string(),
                out_dims: spec.dims.iter().map(|d| d.to_string()).collect(),
                axes: plan
                    .position_axes()
                    .into_iter()
                    .map(|names| names.into_iter().map(str::to_string).collect())
                    .collect(),
                shape: raw.shape().to_vec(),
                source_units: array.units().unwrap_or_default().to_string(),
                units: spec.units.clone(),
                zero_copy: raw.is_view(),
            });
        }

        if outputs.is_empty() {
            return Ok(report);
        }
        let raw_arrays = initialize_arrays_with_properties(registry, outputs, state)?;
        let restored = restore_arrays_with_properties(registry, &raw_arrays, outputs, state)?;
        for (name, spec) in outputs {
            let raw_name = spec.raw_name(name);
            let (Some(raw), Some(array)) = (raw_arrays.get(raw_name), restored.get(name)) else {
                continue;
            };
            report.outputs.push(OutputReport {
                quantity: name.clone(),
                raw_name: raw_name.to_string(),
                dims_like: spec.dims_like.clone(),
                raw_shape: raw.shape().to_vec(),
                dims: array.dims().to_vec(),
                shape: array.shape().to_vec(),
                units: spec.units.clone(),
            });
        }
        Ok(report)
    }

    /// Format the report as console tables.
    pub fn format_table(&self) -> String {
        let mut inputs = Table::new();
        inputs
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Input", "Key", "Dims", "Axes", "Shape", "Units", "Zero copy"]);
        for input in &self.inputs {
            inputs.add_row(vec![
                input.quantity.clone(),
                input.output_name.clone(),
                input.out_dims.join(", "),
                format_axes(&input.axes),
                format_shape(&input.shape),
                format_units(&input.source_units, &input.units),
                if input.zero_copy { "yes" } else { "no" }.to_string(),
            ]);
        }

        let mut out = inputs.to_string();
        if !self.outputs.is_empty() {
            let mut outputs = Table::new();
            outputs
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    "Output", "Raw key", "Like", "Raw shape", "Dims", "Shape", "Units",
                ]);
            for output in &self.outputs {
                outputs.add_row(vec![
                    output.quantity.clone(),
                    output.raw_name.clone(),
                    output.dims_like.clone(),
                    format_shape(&output.raw_shape),
                    output.dims.join(", "),
                    format_shape(&output.shape),
                    output.units.clone(),
                ]);
            }
            out.push('\n');
            out.push_str(&outputs.to_string());
        }
        out
    }

    /// Format the report as JSON.
    pub fn format_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn format_shape(shape: &[usize]) -> String {
    let parts: Vec<String> = shape.iter().map(usize::to_string).collect();
    format!("({})", parts.join(", "))
}

fn format_axes(axes: &[Vec<String>]) -> String {
    axes.iter()
        .map(|names| match names.len() {
            0 => "-".to_string(),
            1 => names[0].clone(),
            _ => format!("[{}]", names.join(" ")),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_units(source: &str, target: &str) -> String {
    if source == target {
        target.to_string()
    } else {
        format!("{source} -> {target}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dim_engine::{DimensionNames, OutputPropertySpec, PropertySpec, UnitTable};
    use test_utils::{create_test_state, QuantitySpec};

    fn state() -> State<'static> {
        create_test_state(&[QuantitySpec {
            name: "air_temperature",
            dims: &["lon", "lat", "mid_levels"],
            shape: &[4, 3, 2],
            units: "degK",
        }])
    }

    #[test]
    fn test_report_records_layouts() {
        let registry = DimensionRegistry::with_names(&DimensionNames::new().z("mid_levels"));
        let mut properties = PropertyMap::new();
        properties.insert(
            "air_temperature".to_string(),
            PropertySpec::new(&["*", "z"], "degC").unwrap(),
        );
        let mut outputs = OutputPropertyMap::new();
        outputs.insert(
            "heating".to_string(),
            OutputPropertySpec::new(&["z", "*"], "K/s", "air_temperature").unwrap(),
        );

        let units = UnitTable::builtin();
        let report =
            PlanReport::build(&registry, &units, &state(), &properties, &outputs).unwrap();
        let input = &report.inputs[0];
        assert_eq!(input.shape, vec![12, 2]);
        assert_eq!(input.axes, vec![vec!["lon", "lat"], vec!["mid_levels"]]);
        assert!(!input.zero_copy);

        let output = &report.outputs[0];
        assert_eq!(output.raw_shape, vec![2, 12]);
        assert_eq!(output.shape, vec![4, 3, 2]);

        let table = report.format_table();
        assert!(table.contains("degK -> degC"));
        assert!(table.contains("(12, 2)"));
        assert!(report.format_json().unwrap().contains("\"zero_copy\": false"));
    }

    #[test]
    fn test_format_axes() {
        let axes = vec![
            vec![],
            vec!["lev".to_string()],
            vec!["lon".to_string(), "lat".to_string()],
        ];
        assert_eq!(format_axes(&axes), "-, lev, [lon lat]");
    }
}
