//! Engine configuration: dimension aliases, extra units and property files.

use serde::{Deserialize, Serialize};
use state_common::Direction;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::DimensionError;
use crate::properties::{
    output_properties_from_raw, properties_from_raw, OutputPropertyMap, PropertyMap,
    RawPropertySpec,
};
use crate::registry::{AliasNames, DimensionNames, DimensionRegistry};
use crate::units::{UnitDefinition, UnitTable};

/// Errors raised while loading configuration or property files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid property specs in {path}: {source}")]
    Properties {
        path: PathBuf,
        #[source]
        source: DimensionError,
    },
}

/// Dimension alias and unit configuration.
///
/// ```yaml
/// dimension_names:
///   x: lon
///   y: [lat, latitude]
///   z: [mid_levels, interface_levels]
/// units:
///   - { name: dam, kind: length, scale: 10.0 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Extra axis names per direction.
    pub dimension_names: DimensionNames,

    /// Units added to the built-in table.
    pub units: Vec<UnitDefinition>,
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read_file(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// `DIM_NAMES_X`, `DIM_NAMES_Y` and `DIM_NAMES_Z` hold comma-separated
    /// alias lists. An empty value resets the direction to its own letter.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("DIM_NAMES_X") {
            config.dimension_names.x = Some(parse_alias_list(&val));
        }

        if let Ok(val) = std::env::var("DIM_NAMES_Y") {
            config.dimension_names.y = Some(parse_alias_list(&val));
        }

        if let Ok(val) = std::env::var("DIM_NAMES_Z") {
            config.dimension_names.z = Some(parse_alias_list(&val));
        }

        config
    }

    /// Overlay environment aliases on top of this configuration.
    pub fn with_env_overrides(mut self) -> Self {
        let env = Self::from_env();
        for direction in Direction::ALL {
            if let Some(names) = env.dimension_names.get(direction) {
                let slot = match direction {
                    Direction::X => &mut self.dimension_names.x,
                    Direction::Y => &mut self.dimension_names.y,
                    Direction::Z => &mut self.dimension_names.z,
                };
                *slot = Some(names.clone());
            }
        }
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        let mut owners: BTreeMap<&str, Direction> = BTreeMap::new();
        for direction in Direction::ALL {
            owners.insert(direction.as_str(), direction);
        }
        for direction in Direction::ALL {
            let Some(names) = self.dimension_names.get(direction) else {
                continue;
            };
            for name in names.names() {
                if name.trim().is_empty() {
                    return Err(format!("empty dimension name for {direction} direction"));
                }
                match owners.get(name.as_str()) {
                    Some(owner) if *owner != direction => {
                        return Err(format!(
                            "dimension name {name} is claimed by both {owner} and {direction}"
                        ));
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(name.as_str(), direction);
                    }
                }
            }
        }

        for unit in &self.units {
            unit.validate()?;
        }
        Ok(())
    }

    /// Registry with the configured aliases applied to the defaults.
    pub fn build_registry(&self) -> DimensionRegistry {
        DimensionRegistry::with_names(&self.dimension_names)
    }

    /// Built-in unit table extended with the configured units.
    pub fn build_unit_table(&self) -> UnitTable {
        self.units
            .iter()
            .cloned()
            .fold(UnitTable::builtin(), UnitTable::with_unit)
    }
}

fn parse_alias_list(value: &str) -> AliasNames {
    AliasNames::Many(
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_raw_properties(path: &Path) -> Result<BTreeMap<String, RawPropertySpec>, ConfigError> {
    let content = read_file(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Load and validate a YAML map of input property specs.
pub fn load_input_properties(path: impl AsRef<Path>) -> Result<PropertyMap, ConfigError> {
    let path = path.as_ref();
    let raw = load_raw_properties(path)?;
    properties_from_raw(&raw).map_err(|source| ConfigError::Properties {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate a YAML map of output property specs.
pub fn load_output_properties(path: impl AsRef<Path>) -> Result<OutputPropertyMap, ConfigError> {
    let path = path.as_ref();
    let raw = load_raw_properties(path)?;
    output_properties_from_raw(&raw).map_err(|source| ConfigError::Properties {
        path: path.to_path_buf(),
        source,
    })
}
