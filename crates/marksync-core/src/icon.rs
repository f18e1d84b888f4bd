//! Module: icon
//! Responsibility: marker icon selection and the vector symbol table.
//! Does not own: image asset resolution (host URL space) or rendering.
//!
//! Precedence, evaluated in order: enum-image match, configured default
//! icon, color-derived vector symbol. The per-shape scale tables encode
//! visual calibration and are preserved exactly.

use crate::config::IconConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

// Custom path-space symbols. Pin carries its classic teardrop-with-eye
// outline; the star is a five-point outline in the same coordinate space.
const PIN_PATH: &str = "M 0,0 C -2,-20 -10,-22 -10,-30 A 10,10 0 1,1 10,-30 C 10,-22 2,-20 0,0 z M -2,-30 a 2,2 0 1,1 4,0 2,2 0 1,1 -4,0";
const STAR_PATH: &str =
    "M 0,-24 L 5.6,-7.2 23,-7.2 9,3.6 14,20 0,10 -14,20 -9,3.6 -23,-7.2 -5.6,-7.2 z";

const STROKE_COLOR: &str = "#000";
const STROKE_WEIGHT: u32 = 1;

///
/// IconError
///

#[derive(Debug, ThisError)]
pub enum IconError {
    #[error("symbol table entry ({shape}, {size}) has no path data")]
    MissingPath { shape: Shape, size: SymbolSize },

    #[error("symbol table entry ({shape}, {size}) has non-positive scale {scale}")]
    InvalidScale {
        shape: Shape,
        size: SymbolSize,
        scale: f64,
    },
}

///
/// Shape
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[remain::sorted]
pub enum Shape {
    BackwardClosedArrow,
    BackwardOpenArrow,
    Circle,
    ForwardClosedArrow,
    ForwardOpenArrow,
    Marker,
    Star,
}

impl Shape {
    pub const ALL: [Self; 7] = [
        Self::BackwardClosedArrow,
        Self::BackwardOpenArrow,
        Self::Circle,
        Self::ForwardClosedArrow,
        Self::ForwardOpenArrow,
        Self::Marker,
        Self::Star,
    ];
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BackwardClosedArrow => "BACKWARD_CLOSED_ARROW",
            Self::BackwardOpenArrow => "BACKWARD_OPEN_ARROW",
            Self::Circle => "CIRCLE",
            Self::ForwardClosedArrow => "FORWARD_CLOSED_ARROW",
            Self::ForwardOpenArrow => "FORWARD_OPEN_ARROW",
            Self::Marker => "MARKER",
            Self::Star => "STAR",
        };
        write!(f, "{label}")
    }
}

///
/// SymbolSize
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[remain::sorted]
pub enum SymbolSize {
    L,
    M,
    S,
    Xs,
    Xxs,
}

impl SymbolSize {
    pub const ALL: [Self; 5] = [Self::L, Self::M, Self::S, Self::Xs, Self::Xxs];
}

impl fmt::Display for SymbolSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::L => "L",
            Self::M => "M",
            Self::S => "S",
            Self::Xs => "XS",
            Self::Xxs => "XXS",
        };
        write!(f, "{label}")
    }
}

///
/// BuiltinSymbol
///
/// Provider-builtin symbol paths; the surface maps these onto the SDK's
/// own constants.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum BuiltinSymbol {
    BackwardClosedArrow,
    BackwardOpenArrow,
    Circle,
    ForwardClosedArrow,
    ForwardOpenArrow,
}

///
/// PathData
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum PathData {
    Svg(&'static str),
    Builtin(BuiltinSymbol),
}

///
/// SymbolSpec
///

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SymbolSpec {
    pub path: PathData,
    pub scale: f64,
}

/// Static symbol table: `(Shape, Size) → (PathData, Scale)`.
#[must_use]
pub const fn symbol_spec(shape: Shape, size: SymbolSize) -> SymbolSpec {
    SymbolSpec {
        path: path_data(shape),
        scale: scale_for(shape, size),
    }
}

const fn path_data(shape: Shape) -> PathData {
    match shape {
        Shape::Marker => PathData::Svg(PIN_PATH),
        Shape::Star => PathData::Svg(STAR_PATH),
        Shape::Circle => PathData::Builtin(BuiltinSymbol::Circle),
        Shape::BackwardClosedArrow => PathData::Builtin(BuiltinSymbol::BackwardClosedArrow),
        Shape::BackwardOpenArrow => PathData::Builtin(BuiltinSymbol::BackwardOpenArrow),
        Shape::ForwardClosedArrow => PathData::Builtin(BuiltinSymbol::ForwardClosedArrow),
        Shape::ForwardOpenArrow => PathData::Builtin(BuiltinSymbol::ForwardOpenArrow),
    }
}

// Scales differ per shape family: custom path-space symbols (pin, star)
// are drawn at unit scale; builtin symbols are sized in pixels.
const fn scale_for(shape: Shape, size: SymbolSize) -> f64 {
    match shape {
        Shape::Marker | Shape::Star => match size {
            SymbolSize::L => 1.0,
            SymbolSize::M => 0.8,
            SymbolSize::S => 0.5,
            SymbolSize::Xs => 0.3,
            SymbolSize::Xxs => 0.1,
        },
        _ => match size {
            SymbolSize::L => 10.0,
            SymbolSize::M => 8.0,
            SymbolSize::S => 5.0,
            SymbolSize::Xs => 3.0,
            SymbolSize::Xxs => 1.0,
        },
    }
}

/// Validate the symbol table for completeness at startup.
pub fn validate_symbol_table() -> Result<(), IconError> {
    for shape in Shape::ALL {
        for size in SymbolSize::ALL {
            let spec = symbol_spec(shape, size);
            if let PathData::Svg(svg) = spec.path
                && svg.is_empty()
            {
                return Err(IconError::MissingPath { shape, size });
            }
            if spec.scale <= 0.0 {
                return Err(IconError::InvalidScale {
                    shape,
                    size,
                    scale: spec.scale,
                });
            }
        }
    }

    Ok(())
}

///
/// VectorIcon
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VectorIcon {
    pub path: PathData,
    pub scale: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub stroke_color: String,
    pub stroke_weight: u32,
}

impl VectorIcon {
    #[must_use]
    pub fn from_symbol(spec: SymbolSpec, fill_color: &str) -> Self {
        Self {
            path: spec.path,
            scale: spec.scale,
            fill_color: fill_color.to_string(),
            fill_opacity: 1.0,
            stroke_color: STROKE_COLOR.to_string(),
            stroke_weight: STROKE_WEIGHT,
        }
    }
}

///
/// IconSpec
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum IconSpec {
    Image { url: String },
    Vector(VectorIcon),
}

/// Pick the icon for one marker view.
#[must_use]
pub fn choose_icon(enum_key: &str, color: &str, icons: &IconConfig) -> IconSpec {
    if !enum_key.is_empty()
        && let Some(entry) = icons.enum_images.iter().find(|entry| entry.key == enum_key)
    {
        return IconSpec::Image {
            url: entry.image.clone(),
        };
    }

    if let Some(default) = &icons.default_icon {
        return IconSpec::Image {
            url: default.clone(),
        };
    }

    IconSpec::Vector(VectorIcon::from_symbol(
        symbol_spec(icons.symbol, icons.size),
        color,
    ))
}
