//! Scalar attribute values exchanged with the host object store.
//!
//! Hosts hand back loosely-typed scalars; coordinates in particular arrive
//! as numeric text as often as numbers. `Value` keeps the raw shape and
//! defers interpretation to the extraction site.

use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Value
///
/// Scalar attribute value. `Empty` models an unset attribute and renders as
/// the empty string, matching how hosts serialize absent values.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Text(String),
    Float(f64),
    Int(i64),
    #[default]
    Empty,
}

impl Value {
    /// Render the value as host-facing text. `Empty` is the empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Float(f) => f.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Empty => String::new(),
        }
    }

    /// True when the value carries no usable text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Float(_) | Self::Int(_) => false,
            Self::Empty => true,
        }
    }

    /// Interpret the value as one coordinate axis.
    ///
    /// Numeric text parses after trimming; empty and non-numeric text do
    /// not. Callers distinguish "empty" from "malformed" via [`Self::is_empty`].
    #[must_use]
    pub fn coord(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            #[expect(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
            Self::Empty => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}
