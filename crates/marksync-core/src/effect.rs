//! Module: effect
//! Responsibility: the asynchronous boundary vocabulary — requests the
//! engine hands to the host, and the completion payloads the host hands
//! back.
//! Does not own: any execution; the host performs every effect.
//!
//! Generation tagging: every data-producing request carries the fetch
//! generation that issued it. Completions for a stale generation are
//! discarded, so a late callback can never reconcile over a newer context.

use crate::{
    geometry::LatLng,
    record::{Guid, SourceRecord},
    source::QueryRequest,
};
use derive_more::Display;
use serde::Serialize;

///
/// Generation
///
/// Monotonic fetch-cycle counter scoped to one engine instance.
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

///
/// Effect
///
/// One request to the host. Effects are returned from engine entry points
/// in issue order; the host executes them and reports completions through
/// the matching `on_*` entry point.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Query the host object store.
    RunQuery {
        generation: Generation,
        request: QueryRequest,
    },
    /// Invoke the configured object-producing host action.
    RunAction {
        generation: Generation,
        action: String,
        target: Guid,
    },
    /// Fire-and-forget host action from a marker interaction.
    TriggerAction { action: String, target: Guid },
    /// Reverse-geocode a dragged marker's position.
    Geocode {
        generation: Generation,
        guid: Guid,
        position: LatLng,
    },
    /// Persist one attribute on a host record.
    WriteAttribute {
        guid: Guid,
        attribute: String,
        value: String,
    },
    /// Subscribe to host change notifications for one record.
    Subscribe { guid: Guid },
    /// Drop the active change subscription for one record.
    Unsubscribe { guid: Guid },
    /// Call back `on_resize_flush(token)` after the debounce delay.
    ScheduleResizeFlush { token: u64, delay_ms: u64 },
    /// Surface a diagnostic to the host (classified display string).
    NotifyHostError { message: String },
}

///
/// MapEvent
///
/// Marker interaction delivered by the host glue, keyed by the record
/// identity the marker was tagged with at placement.
///

#[derive(Clone, Debug, PartialEq)]
pub enum MapEvent {
    MarkerClicked { guid: Guid },
    MarkerDragEnded { guid: Guid, position: LatLng },
    /// The provider finished materializing an info window's content.
    InfoWindowReady { guid: Guid },
    /// The user activated the action control inside an info window.
    InfoWindowActionClicked { guid: Guid },
}

///
/// QueryOutcome
///

#[derive(Clone, Debug, PartialEq)]
pub enum QueryOutcome {
    Records(Vec<SourceRecord>),
    Failed(String),
}

///
/// ActionOutcome
///

#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    Records(Vec<SourceRecord>),
    Failed(String),
}

///
/// GeocodeOutcome
///

#[derive(Clone, Debug, PartialEq)]
pub enum GeocodeOutcome {
    Address(String),
    NoResults,
    Failed(String),
}
