//! Physical unit conversion.
//!
//! Conversion is injected through the [`UnitConverter`] trait. The default
//! [`UnitTable`] defines every unit as an affine map onto a reference unit of
//! its physical kind (`reference = value * scale + offset`), so any two units
//! of the same kind convert through one linear transform.

use ndarray::{ArrayBase, ArrayD, Data, IxDyn};
use num_traits::{Float, NumCast};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from unit conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("cannot convert {from} ({from_kind}) to {to} ({to_kind})")]
    Incompatible {
        from: String,
        to: String,
        from_kind: String,
        to_kind: String,
    },
}

/// Converts values between unit strings.
pub trait UnitConverter: Send + Sync {
    /// Convert a single value.
    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, UnitError>;

    /// Convert a buffer in place.
    fn convert_slice(&self, values: &mut [f64], from: &str, to: &str) -> Result<(), UnitError> {
        for value in values.iter_mut() {
            *value = self.convert(*value, from, to)?;
        }
        Ok(())
    }
}

/// Convert an array into a new owned buffer. The source is not modified.
pub fn convert_array<A, S, C>(
    converter: &C,
    array: &ArrayBase<S, IxDyn>,
    from: &str,
    to: &str,
) -> Result<ArrayD<A>, UnitError>
where
    A: Float,
    S: Data<Elem = A>,
    C: UnitConverter + ?Sized,
{
    let mut values = array.mapv(|v| v.to_f64().unwrap_or(f64::NAN));
    match values.as_slice_memory_order_mut() {
        Some(slice) => converter.convert_slice(slice, from, to)?,
        None => {
            for value in values.iter_mut() {
                *value = converter.convert(*value, from, to)?;
            }
        }
    }
    Ok(values.mapv(|v| <A as NumCast>::from(v).unwrap_or_else(A::nan)))
}

/// `value * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTransform {
    pub scale: f64,
    pub offset: f64,
}

impl LinearTransform {
    pub const IDENTITY: LinearTransform = LinearTransform {
        scale: 1.0,
        offset: 0.0,
    };

    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// A unit defined relative to the reference unit of its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Unit string as it appears in `units` attributes.
    pub name: String,

    /// Physical kind, e.g. `temperature`. Only units of the same kind convert.
    pub kind: String,

    /// Multiplier onto the reference unit.
    pub scale: f64,

    /// Offset added after scaling.
    #[serde(default)]
    pub offset: f64,
}

impl UnitDefinition {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, scale: f64, offset: f64) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            scale,
            offset,
        }
    }

    /// Validate the definition.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim() != self.name {
            return Err(format!("unit name '{}' has surrounding whitespace", self.name));
        }
        if self.kind.is_empty() {
            return Err(format!("unit '{}' has no kind", self.name));
        }
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(format!("unit '{}' must have a finite non-zero scale", self.name));
        }
        if !self.offset.is_finite() {
            return Err(format!("unit '{}' must have a finite offset", self.name));
        }
        Ok(())
    }
}

const SECONDS_PER_DAY: f64 = 86_400.0;

/// (name, kind, scale, offset)
const BUILTIN_UNITS: &[(&str, &str, f64, f64)] = &[
    // temperature, reference K
    ("K", "temperature", 1.0, 0.0),
    ("degK", "temperature", 1.0, 0.0),
    ("kelvin", "temperature", 1.0, 0.0),
    ("degC", "temperature", 1.0, 273.15),
    ("celsius", "temperature", 1.0, 273.15),
    ("degF", "temperature", 5.0 / 9.0, 273.15 - 32.0 * 5.0 / 9.0),
    ("degR", "temperature", 5.0 / 9.0, 0.0),
    // pressure, reference Pa
    ("Pa", "pressure", 1.0, 0.0),
    ("hPa", "pressure", 100.0, 0.0),
    ("mb", "pressure", 100.0, 0.0),
    ("mbar", "pressure", 100.0, 0.0),
    ("kPa", "pressure", 1_000.0, 0.0),
    ("bar", "pressure", 100_000.0, 0.0),
    ("atm", "pressure", 101_325.0, 0.0),
    // length, reference m
    ("m", "length", 1.0, 0.0),
    ("km", "length", 1_000.0, 0.0),
    ("cm", "length", 0.01, 0.0),
    ("mm", "length", 0.001, 0.0),
    // time, reference s
    ("s", "time", 1.0, 0.0),
    ("min", "time", 60.0, 0.0),
    ("h", "time", 3_600.0, 0.0),
    ("hour", "time", 3_600.0, 0.0),
    ("d", "time", SECONDS_PER_DAY, 0.0),
    ("day", "time", SECONDS_PER_DAY, 0.0),
    // speed, reference m/s
    ("m/s", "speed", 1.0, 0.0),
    ("m s^-1", "speed", 1.0, 0.0),
    ("km/h", "speed", 1.0 / 3.6, 0.0),
    ("knots", "speed", 1_852.0 / 3_600.0, 0.0),
    ("kt", "speed", 1_852.0 / 3_600.0, 0.0),
    ("mph", "speed", 0.447_04, 0.0),
    ("mm/day", "speed", 0.001 / SECONDS_PER_DAY, 0.0),
    // mass, reference kg
    ("kg", "mass", 1.0, 0.0),
    ("g", "mass", 0.001, 0.0),
    // mixing ratio, reference kg/kg
    ("kg/kg", "mixing_ratio", 1.0, 0.0),
    ("kg kg^-1", "mixing_ratio", 1.0, 0.0),
    ("g/kg", "mixing_ratio", 0.001, 0.0),
    ("g kg^-1", "mixing_ratio", 0.001, 0.0),
    // energy flux, reference W/m^2
    ("W/m^2", "energy_flux", 1.0, 0.0),
    ("W m^-2", "energy_flux", 1.0, 0.0),
    // heating rate, reference K/s
    ("K/s", "heating_rate", 1.0, 0.0),
    ("K s^-1", "heating_rate", 1.0, 0.0),
    ("degK/s", "heating_rate", 1.0, 0.0),
    ("K/day", "heating_rate", 1.0 / SECONDS_PER_DAY, 0.0),
    ("K day^-1", "heating_rate", 1.0 / SECONDS_PER_DAY, 0.0),
    ("degK/day", "heating_rate", 1.0 / SECONDS_PER_DAY, 0.0),
    // dimensionless
    ("dimensionless", "dimensionless", 1.0, 0.0),
    ("", "dimensionless", 1.0, 0.0),
    ("1", "dimensionless", 1.0, 0.0),
    ("%", "dimensionless", 0.01, 0.0),
    ("percent", "dimensionless", 0.01, 0.0),
];

/// Table of affine unit definitions.
#[derive(Debug, Clone)]
pub struct UnitTable {
    units: HashMap<String, UnitDefinition>,
}

impl Default for UnitTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl UnitTable {
    /// An empty table. Only identical unit strings convert.
    pub fn empty() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// The table of built-in atmospheric units.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for &(name, kind, scale, offset) in BUILTIN_UNITS {
            table.insert(UnitDefinition::new(name, kind, scale, offset));
        }
        table
    }

    /// Add or replace a unit.
    pub fn with_unit(mut self, unit: UnitDefinition) -> Self {
        self.insert(unit);
        self
    }

    pub fn insert(&mut self, unit: UnitDefinition) {
        self.units.insert(unit.name.clone(), unit);
    }

    pub fn get(&self, name: &str) -> Option<&UnitDefinition> {
        self.units.get(name.trim())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Resolve the transform taking values in `from` to values in `to`.
    pub fn transform(&self, from: &str, to: &str) -> Result<LinearTransform, UnitError> {
        if from.trim() == to.trim() {
            return Ok(LinearTransform::IDENTITY);
        }
        let source = self
            .get(from)
            .ok_or_else(|| UnitError::UnknownUnit(from.to_string()))?;
        let target = self
            .get(to)
            .ok_or_else(|| UnitError::UnknownUnit(to.to_string()))?;
        if source.kind != target.kind {
            return Err(UnitError::Incompatible {
                from: from.to_string(),
                to: to.to_string(),
                from_kind: source.kind.clone(),
                to_kind: target.kind.clone(),
            });
        }
        Ok(LinearTransform {
            scale: source.scale / target.scale,
            offset: (source.offset - target.offset) / target.scale,
        })
    }
}

impl UnitConverter for UnitTable {
    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
        Ok(self.transform(from, to)?.apply(value))
    }

    fn convert_slice(&self, values: &mut [f64], from: &str, to: &str) -> Result<(), UnitError> {
        let transform = self.transform(from, to)?;
        if !transform.is_identity() {
            for value in values.iter_mut() {
                *value = transform.apply(*value);
            }
        }
        Ok(())
    }
}
