//! Per-quantity property specifications.
//!
//! Specs arrive as loosely typed [`RawPropertySpec`] records (every field
//! optional, as read from YAML or JSON) and are validated into
//! [`PropertySpec`] for extraction or [`OutputPropertySpec`] for restoration
//! before any state is touched.

use serde::{Deserialize, Serialize};
use state_common::OutDim;
use std::collections::BTreeMap;

use crate::error::{DimensionError, Result};

/// Validated input properties keyed by quantity name.
pub type PropertyMap = BTreeMap<String, PropertySpec>;

/// Validated output properties keyed by quantity name.
pub type OutputPropertyMap = BTreeMap<String, OutputPropertySpec>;

/// Unvalidated property record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPropertySpec {
    pub dims: Option<Vec<String>>,
    pub units: Option<String>,
    pub match_dims_like: Option<String>,
    pub dims_like: Option<String>,
    pub alias: Option<String>,
}

/// How a quantity is extracted from state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub dims: Vec<OutDim>,
    pub units: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_dims_like: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl PropertySpec {
    pub fn new<S: AsRef<str>>(dims: &[S], units: impl Into<String>) -> Result<Self> {
        Ok(Self {
            dims: OutDim::parse_list(dims)?,
            units: units.into(),
            match_dims_like: None,
            alias: None,
        })
    }

    pub fn match_dims_like(mut self, quantity: impl Into<String>) -> Self {
        self.match_dims_like = Some(quantity.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Validate a raw record for `quantity`.
    pub fn from_raw(quantity: &str, raw: &RawPropertySpec) -> Result<Self> {
        let dims = raw
            .dims
            .as_ref()
            .ok_or_else(|| DimensionError::missing_spec(quantity, "dims"))?;
        let units = raw
            .units
            .as_ref()
            .ok_or_else(|| DimensionError::missing_spec(quantity, "units"))?;
        Ok(Self {
            dims: parse_dims(quantity, dims)?,
            units: units.clone(),
            match_dims_like: raw.match_dims_like.clone(),
            alias: raw.alias.clone(),
        })
    }

    /// Key of this quantity in extraction output.
    pub fn output_name<'a>(&'a self, quantity: &'a str) -> &'a str {
        self.alias.as_deref().unwrap_or(quantity)
    }
}

/// How a raw result is restored to a labeled array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPropertySpec {
    /// Layout of the raw result.
    pub dims: Vec<OutDim>,
    pub units: String,
    /// State quantity whose axes and coordinates the result takes.
    pub dims_like: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl OutputPropertySpec {
    pub fn new<S: AsRef<str>>(
        dims: &[S],
        units: impl Into<String>,
        dims_like: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            dims: OutDim::parse_list(dims)?,
            units: units.into(),
            dims_like: dims_like.into(),
            alias: None,
        })
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn from_raw(quantity: &str, raw: &RawPropertySpec) -> Result<Self> {
        let dims = raw
            .dims
            .as_ref()
            .ok_or_else(|| DimensionError::missing_spec(quantity, "dims"))?;
        let units = raw
            .units
            .as_ref()
            .ok_or_else(|| DimensionError::missing_spec(quantity, "units"))?;
        let dims_like = raw
            .dims_like
            .as_ref()
            .ok_or_else(|| DimensionError::missing_spec(quantity, "dims_like"))?;
        Ok(Self {
            dims: parse_dims(quantity, dims)?,
            units: units.clone(),
            dims_like: dims_like.clone(),
            alias: raw.alias.clone(),
        })
    }

    /// Key of this quantity's raw array.
    pub fn raw_name<'a>(&'a self, quantity: &'a str) -> &'a str {
        self.alias.as_deref().unwrap_or(quantity)
    }
}

fn parse_dims(quantity: &str, dims: &[String]) -> Result<Vec<OutDim>> {
    OutDim::parse_list(dims).map_err(|e| {
        DimensionError::configuration(format!("invalid dims for quantity {quantity}: {e}"))
    })
}

/// Validate a whole map of raw input specs.
pub fn properties_from_raw(raw: &BTreeMap<String, RawPropertySpec>) -> Result<PropertyMap> {
    raw.iter()
        .map(|(name, spec)| Ok((name.clone(), PropertySpec::from_raw(name, spec)?)))
        .collect()
}

/// Validate a whole map of raw output specs.
pub fn output_properties_from_raw(
    raw: &BTreeMap<String, RawPropertySpec>,
) -> Result<OutputPropertyMap> {
    raw.iter()
        .map(|(name, spec)| Ok((name.clone(), OutputPropertySpec::from_raw(name, spec)?)))
        .collect()
}
