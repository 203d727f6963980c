//! Canonical physical directions and the tokens used to request output axes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TokenParseError;

/// A canonical physical direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    X,
    Y,
    Z,
}

impl Direction {
    /// All directions in registry order.
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];

    /// The direction letter, which is also its default axis name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::X => "x",
            Direction::Y => "y",
            Direction::Z => "z",
        }
    }

    /// Parse a direction letter (`x`, `y` or `z`). The wildcard is not a direction.
    pub fn from_token(token: &str) -> Result<Self, TokenParseError> {
        match token {
            "x" => Ok(Direction::X),
            "y" => Ok(Direction::Y),
            "z" => Ok(Direction::Z),
            other => Err(TokenParseError::InvalidToken(other.to_string())),
        }
    }

    /// Parse a list of direction letters, rejecting duplicates.
    pub fn parse_list<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Self>, TokenParseError> {
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            let direction = Direction::from_token(token.as_ref())?;
            if out.contains(&direction) {
                return Err(TokenParseError::DuplicateDirection(direction));
            }
            out.push(direction);
        }
        Ok(out)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = TokenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::from_token(s)
    }
}

/// One requested output axis: an explicit direction or the wildcard `*`.
///
/// The wildcard collects every axis of an array that no explicit direction
/// claims, flattened into a single output axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutDim {
    Axis(Direction),
    Wildcard,
}

impl OutDim {
    pub const WILDCARD_TOKEN: &'static str = "*";

    /// Parse a single token from `{x, y, z, *}`.
    pub fn parse(token: &str) -> Result<Self, TokenParseError> {
        if token == Self::WILDCARD_TOKEN {
            Ok(OutDim::Wildcard)
        } else {
            Direction::from_token(token).map(OutDim::Axis)
        }
    }

    /// Parse an ordered token list.
    ///
    /// Each direction may appear at most once and there is at most one wildcard.
    pub fn parse_list<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Self>, TokenParseError> {
        let dims = tokens
            .iter()
            .map(|t| OutDim::parse(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::check_unique(&dims)?;
        Ok(dims)
    }

    /// Check an already-typed list for repeated directions or wildcards.
    pub fn check_unique(dims: &[OutDim]) -> Result<(), TokenParseError> {
        for (i, dim) in dims.iter().enumerate() {
            if dims[..i].contains(dim) {
                return Err(match dim {
                    OutDim::Axis(direction) => TokenParseError::DuplicateDirection(*direction),
                    OutDim::Wildcard => TokenParseError::MultipleWildcards,
                });
            }
        }
        Ok(())
    }

    /// The explicit direction, or `None` for the wildcard.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            OutDim::Axis(direction) => Some(*direction),
            OutDim::Wildcard => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, OutDim::Wildcard)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutDim::Axis(direction) => direction.as_str(),
            OutDim::Wildcard => Self::WILDCARD_TOKEN,
        }
    }
}

impl fmt::Display for OutDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutDim {
    type Err = TokenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutDim::parse(s)
    }
}

impl From<Direction> for OutDim {
    fn from(direction: Direction) -> Self {
        OutDim::Axis(direction)
    }
}

impl TryFrom<String> for OutDim {
    type Error = TokenParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OutDim::parse(&value)
    }
}

impl From<OutDim> for String {
    fn from(dim: OutDim) -> Self {
        dim.as_str().to_string()
    }
}
