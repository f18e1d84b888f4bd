//! Core runtime for marksync: schema resolution, record normalization,
//! marker reconciliation, fetch planning, drag synchronization, and the
//! ergonomics exported via the `prelude`.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod drag;
pub mod effect;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod icon;
pub mod mapper;
pub mod obs;
pub mod reconcile;
pub mod record;
pub mod schema;
pub mod source;
pub mod surface;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Decimal digits persisted for dragged coordinates.
///
/// Host stores index coordinates as fixed-precision text; eight digits is
/// roughly millimetre resolution and matches what hosts round-trip.
pub const COORD_DECIMALS: usize = 8;

/// Delay applied to provider reflow signaling; bursts collapse to the last
/// call inside this window.
pub const RESIZE_DEBOUNCE_MS: u64 = 250;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        config::WidgetConfig,
        effect::{Effect, Generation, MapEvent},
        engine::MarkerEngine,
        geometry::{LatLng, ViewportFrame},
        mapper::MarkerView,
        record::{Guid, SourceRecord},
        surface::MapSurface,
        value::Value,
    };
}
