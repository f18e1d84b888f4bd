//! Module: drag
//! Responsibility: propagating user marker relocation back into the host
//! object graph, and interpreting the reverse-geocode round trip.
//! Does not own: geocoder execution (host) or info-window display (engine).

use crate::{
    COORD_DECIMALS,
    effect::{Effect, GeocodeOutcome},
    error::InternalError,
    geometry::LatLng,
    record::{Guid, SourceRecord},
    schema::RoleBindings,
};
use tracing::error;

/// Shown in place of an address when reverse geocoding cannot produce one.
pub const GEOCODE_FAILURE_TEXT: &str = "Cannot determine address at this location.";

///
/// DragWrites
///
/// Host writes produced by one completed drag, plus whether an address
/// round trip is still owed.
///

#[derive(Debug)]
pub(crate) struct DragWrites {
    pub(crate) effects: Vec<Effect>,
    pub(crate) wants_geocode: bool,
}

/// Apply one completed drag against the last-seen record batch.
///
/// Returns `None` when the identity has no matching record — possible when
/// the record was never committed to the host store before dragging began.
pub(crate) fn apply_drag(
    guid: &Guid,
    position: LatLng,
    last_seen: &[SourceRecord],
    bindings: &RoleBindings,
) -> Option<DragWrites> {
    last_seen.iter().find(|record| record.guid() == guid)?;

    let mut effects = Vec::new();
    for (attribute, axis) in [(&bindings.lat, position.lat), (&bindings.lng, position.lng)] {
        if !attribute.is_empty() {
            effects.push(Effect::WriteAttribute {
                guid: guid.clone(),
                attribute: attribute.clone(),
                value: fixed_coord(axis),
            });
        }
    }

    Some(DragWrites {
        effects,
        wants_geocode: !bindings.address.is_empty(),
    })
}

/// Format one coordinate axis for host persistence.
#[must_use]
pub(crate) fn fixed_coord(axis: f64) -> String {
    format!("{axis:.prec$}", prec = COORD_DECIMALS)
}

///
/// GeocodeResolution
///

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum GeocodeResolution {
    /// Persist and display the formatted address.
    Persist(String),
    /// Display the failure reason; nothing is persisted but the handle's
    /// cached text is still overwritten so it never goes stale.
    Failure(&'static str),
}

/// Degrade a geocode outcome to a resolution. Failures never escape this
/// boundary.
pub(crate) fn resolve_geocode(outcome: GeocodeOutcome) -> GeocodeResolution {
    match outcome {
        GeocodeOutcome::Address(address) => GeocodeResolution::Persist(address),
        GeocodeOutcome::NoResults => GeocodeResolution::Failure(GEOCODE_FAILURE_TEXT),
        GeocodeOutcome::Failed(reason) => {
            let err = InternalError::geocode_external(format!("reverse geocoding failed: {reason}"));
            error!("{}", err.display_with_class());
            GeocodeResolution::Failure(GEOCODE_FAILURE_TEXT)
        }
    }
}

/// Info-window body shown after an address round trip.
#[must_use]
pub(crate) fn address_window_content(text: &str) -> String {
    format!("<b>{text}</b><br>Drag the marker to update the formatted address field!")
}
