//! Module: mapper
//! Responsibility: normalizing host records into rendering-ready marker
//! views and extracting role values through the schema plan.
//! Does not own: fetching, caching, or marker lifecycle.
//!
//! Invariants:
//! - Output length equals input length; order is preserved; no filtering.
//! - Association extraction is zero-or-one: first child wins, empty if none.

use crate::{
    geometry::LatLng,
    record::{Guid, SourceRecord},
    schema::{AttributePath, Role, RoleBindings, SchemaPlan},
    value::Value,
};
use serde::Serialize;

///
/// PositionOutcome
///
/// Interpretation of one view's coordinate pair.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PositionOutcome {
    Resolved(LatLng),
    /// Both coordinates are unset; the configured default position applies.
    DefaultPosition,
    /// At least one coordinate is present but not numeric.
    Unresolvable,
}

///
/// MarkerView
///
/// Normalized, rendering-ready record. `guid` is the per-record identity
/// used for cache reconciliation; `context_guid` preserves the batch's
/// context-object identity for callers that still key on it.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkerView {
    pub guid: Guid,
    pub context_guid: Option<Guid>,
    pub entity_label: String,
    pub label: String,
    pub lat: Value,
    pub lng: Value,
    pub color: String,
    pub address: String,
    pub enum_key: String,
}

impl MarkerView {
    /// Resolve the raw coordinate pair.
    ///
    /// Both unset is a deliberate "place at default" case; a present but
    /// non-numeric coordinate makes the pair unresolvable.
    #[must_use]
    pub fn position(&self) -> PositionOutcome {
        if self.lat.is_empty() && self.lng.is_empty() {
            return PositionOutcome::DefaultPosition;
        }

        match (self.lat.coord(), self.lng.coord()) {
            (Some(lat), Some(lng)) => PositionOutcome::Resolved(LatLng::new(lat, lng)),
            _ => PositionOutcome::Unresolvable,
        }
    }
}

/// Normalize one record batch into marker views.
///
/// Every input record yields exactly one view, in input order.
#[must_use]
pub fn normalize(
    records: &[SourceRecord],
    plan: &SchemaPlan,
    bindings: &RoleBindings,
    context_guid: Option<&Guid>,
) -> Vec<MarkerView> {
    records
        .iter()
        .map(|record| MarkerView {
            guid: record.guid().clone(),
            context_guid: context_guid.cloned(),
            entity_label: record.entity_label().to_string(),
            label: extract_role(record, Role::Marker, plan, bindings).to_text(),
            lat: extract_role(record, Role::Lat, plan, bindings),
            lng: extract_role(record, Role::Lng, plan, bindings),
            color: extract_role(record, Role::Color, plan, bindings).to_text(),
            address: extract_role(record, Role::Address, plan, bindings).to_text(),
            enum_key: extract_role(record, Role::Enum, plan, bindings).to_text(),
        })
        .collect()
}

/// Extract one role's value from a record.
///
/// Traversal paths read the first associated child; direct roles read the
/// record's own attribute under the originally configured name.
#[must_use]
pub fn extract_role(
    record: &SourceRecord,
    role: Role,
    plan: &SchemaPlan,
    bindings: &RoleBindings,
) -> Value {
    match plan.path(role) {
        Some(AttributePath::ViaAssociation {
            association,
            attribute,
            ..
        }) => record
            .first_child(association)
            .map_or(Value::Empty, |child| child.attribute(attribute)),
        Some(AttributePath::Direct(_)) | None => {
            let configured = bindings.get(role);
            if configured.is_empty() {
                Value::Empty
            } else {
                record.attribute(configured)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use proptest::prelude::*;

    fn depot(guid: &str, lat: &str, lng: &str) -> SourceRecord {
        SourceRecord::new(guid, "Logistics.Depot")
            .with_attribute("Name", format!("Depot {guid}"))
            .with_attribute("Latitude", lat)
            .with_attribute("Longitude", lng)
    }

    fn direct_bindings() -> RoleBindings {
        RoleBindings {
            marker: "Name".to_string(),
            lat: "Latitude".to_string(),
            lng: "Longitude".to_string(),
            ..RoleBindings::default()
        }
    }

    #[test]
    fn normalize_preserves_length_and_order() {
        let bindings = direct_bindings();
        let plan = schema::resolve(&bindings).expect("resolve");
        let records = vec![depot("a", "51.0", "4.0"), depot("b", "52.0", "5.0")];

        let views = normalize(&records, &plan, &bindings, None);

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].guid.as_str(), "a");
        assert_eq!(views[1].guid.as_str(), "b");
        assert_eq!(views[0].label, "Depot a");
        assert_eq!(views[0].entity_label, "Depot");
    }

    #[test]
    fn traversal_reads_first_child_attribute() {
        let bindings = RoleBindings {
            lat: "Location/GeoRef/Lat".to_string(),
            lng: "Location/GeoRef/Lng".to_string(),
            ..RoleBindings::default()
        };
        let plan = schema::resolve(&bindings).expect("resolve");
        let record = SourceRecord::new("a", "Logistics.Depot").with_child(
            "Location",
            SourceRecord::new("c", "GeoRef")
                .with_attribute("Lat", "51.91")
                .with_attribute("Lng", "4.47"),
        );

        let views = normalize(&[record], &plan, &bindings, None);

        assert_eq!(views[0].lat, Value::from("51.91"));
        assert_eq!(
            views[0].position(),
            PositionOutcome::Resolved(LatLng::new(51.91, 4.47))
        );
    }

    #[test]
    fn traversal_without_child_reads_empty() {
        let bindings = RoleBindings {
            lat: "Location/GeoRef/Lat".to_string(),
            ..RoleBindings::default()
        };
        let plan = schema::resolve(&bindings).expect("resolve");
        let record = SourceRecord::new("a", "Logistics.Depot");

        let views = normalize(&[record], &plan, &bindings, None);

        assert_eq!(views[0].lat, Value::Empty);
    }

    #[test]
    fn both_empty_coordinates_resolve_to_default_position() {
        let bindings = direct_bindings();
        let plan = schema::resolve(&bindings).expect("resolve");
        let views = normalize(&[depot("a", "", "")], &plan, &bindings, None);

        assert_eq!(views[0].position(), PositionOutcome::DefaultPosition);
    }

    #[test]
    fn malformed_coordinate_is_unresolvable() {
        let bindings = direct_bindings();
        let plan = schema::resolve(&bindings).expect("resolve");
        let views = normalize(&[depot("a", "abc", "12.0")], &plan, &bindings, None);

        assert_eq!(views[0].position(), PositionOutcome::Unresolvable);
    }

    #[test]
    fn context_guid_is_carried_on_every_view() {
        let bindings = direct_bindings();
        let plan = schema::resolve(&bindings).expect("resolve");
        let context = Guid::from("ctx");

        let views = normalize(
            &[depot("a", "1", "2"), depot("b", "3", "4")],
            &plan,
            &bindings,
            Some(&context),
        );

        assert!(views.iter().all(|v| v.context_guid.as_ref() == Some(&context)));
    }

    prop_compose! {
        fn arb_record()(guid in "[a-z0-9]{1,8}", lat in "[0-9.]{0,6}", lng in "[0-9.]{0,6}") -> SourceRecord {
            depot(&guid, &lat, &lng)
        }
    }

    proptest! {
        // Output length equals input length and order is preserved, for any batch.
        #[test]
        fn normalize_is_one_to_one(records in prop::collection::vec(arb_record(), 0..24)) {
            let bindings = direct_bindings();
            let plan = schema::resolve(&bindings).expect("resolve");

            let views = normalize(&records, &plan, &bindings, None);

            prop_assert_eq!(views.len(), records.len());
            for (record, view) in records.iter().zip(&views) {
                prop_assert_eq!(record.guid(), &view.guid);
            }
        }
    }
}
