//! ## Crate layout
//! - `core`: the engine — schema resolution, record normalization, marker
//!   reconciliation, fetch planning, drag synchronization, observability.
//!
//! The `prelude` module mirrors the runtime surface host glue uses to embed
//! the engine.

pub use marksync_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Host Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        config::{ClusterConfig, IconConfig, LineConfig, MapOptions, WidgetConfig},
        effect::{ActionOutcome, Effect, Generation, GeocodeOutcome, MapEvent, QueryOutcome},
        engine::MarkerEngine,
        geometry::{Bounds, LatLng, ViewportFrame},
        icon::{IconSpec, PathData, Shape, SymbolSize, VectorIcon},
        mapper::MarkerView,
        obs::{metrics_report, metrics_reset_all},
        record::{Guid, SourceRecord},
        schema::RoleBindings,
        source::QueryRequest,
        surface::{MapSurface, MarkerInit, SurfaceMarkerId},
        value::Value,
    };
    pub use serde::{Deserialize, Serialize};
}
