//! Direction registry: which axis names count as `x`, `y` and `z`.

use serde::{Deserialize, Serialize};
use state_common::Direction;
use tracing::debug;

/// Extra axis names for one direction, as a single name or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasNames {
    One(String),
    Many(Vec<String>),
}

impl AliasNames {
    pub fn names(&self) -> &[String] {
        match self {
            AliasNames::One(name) => std::slice::from_ref(name),
            AliasNames::Many(names) => names,
        }
    }
}

impl From<&str> for AliasNames {
    fn from(name: &str) -> Self {
        AliasNames::One(name.to_string())
    }
}

impl From<String> for AliasNames {
    fn from(name: String) -> Self {
        AliasNames::One(name)
    }
}

impl From<Vec<String>> for AliasNames {
    fn from(names: Vec<String>) -> Self {
        AliasNames::Many(names)
    }
}

impl From<Vec<&str>> for AliasNames {
    fn from(names: Vec<&str>) -> Self {
        AliasNames::Many(names.into_iter().map(str::to_string).collect())
    }
}

/// Requested alias changes, one optional entry per direction.
///
/// `None` leaves the direction as it is. An empty list resets it to its own
/// letter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionNames {
    pub x: Option<AliasNames>,
    pub y: Option<AliasNames>,
    pub z: Option<AliasNames>,
}

impl DimensionNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, names: impl Into<AliasNames>) -> Self {
        self.x = Some(names.into());
        self
    }

    pub fn y(mut self, names: impl Into<AliasNames>) -> Self {
        self.y = Some(names.into());
        self
    }

    pub fn z(mut self, names: impl Into<AliasNames>) -> Self {
        self.z = Some(names.into());
        self
    }

    pub fn get(&self, direction: Direction) -> Option<&AliasNames> {
        match direction {
            Direction::X => self.x.as_ref(),
            Direction::Y => self.y.as_ref(),
            Direction::Z => self.z.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

/// Ordered alias lists for the three canonical directions.
///
/// Each list always starts with the direction letter itself. Aliases are not
/// checked for disjointness across directions; an axis name claimed by two
/// directions is matched by both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionRegistry {
    x: Vec<String>,
    y: Vec<String>,
    z: Vec<String>,
}

impl Default for DimensionRegistry {
    fn default() -> Self {
        Self {
            x: vec![Direction::X.as_str().to_string()],
            y: vec![Direction::Y.as_str().to_string()],
            z: vec![Direction::Z.as_str().to_string()],
        }
    }
}

impl DimensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the given alias changes applied to the defaults.
    pub fn with_names(names: &DimensionNames) -> Self {
        let mut registry = Self::default();
        registry.set_dimension_names(names);
        registry
    }

    /// Replace the alias list of every direction present in `names` with its
    /// letter followed by the supplied names.
    pub fn set_dimension_names(&mut self, names: &DimensionNames) {
        for direction in Direction::ALL {
            if let Some(extra) = names.get(direction) {
                self.set_aliases(direction, extra.names());
            }
        }
    }

    /// Replace one direction's aliases with its letter plus `extra`.
    pub fn set_aliases<S: AsRef<str>>(&mut self, direction: Direction, extra: &[S]) {
        let mut aliases = vec![direction.as_str().to_string()];
        for name in extra {
            let name = name.as_ref();
            if !aliases.iter().any(|a| a == name) {
                aliases.push(name.to_string());
            }
        }
        debug!(direction = %direction, aliases = ?aliases, "Set dimension aliases");
        *self.list_mut(direction) = aliases;
    }

    /// Restore every direction to its own letter.
    pub fn reset(&mut self) {
        debug!("Reset dimension aliases");
        *self = Self::default();
    }

    /// Alias list for a direction, letter first.
    pub fn aliases(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::X => &self.x,
            Direction::Y => &self.y,
            Direction::Z => &self.z,
        }
    }

    /// Whether `name` is an alias of `direction`.
    pub fn matches(&self, direction: Direction, name: &str) -> bool {
        self.aliases(direction).iter().any(|a| a == name)
    }

    /// Every direction that claims `name`.
    pub fn directions_of(&self, name: &str) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.matches(*d, name))
            .collect()
    }

    fn list_mut(&mut self, direction: Direction) -> &mut Vec<String> {
        match direction {
            Direction::X => &mut self.x,
            Direction::Y => &mut self.y,
            Direction::Z => &mut self.z,
        }
    }
}
