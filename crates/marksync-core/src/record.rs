//! Module: record
//! Responsibility: host-record snapshots and their stable identities.
//! Does not own: host persistence, change notification, or query execution.
//! Boundary: everything the engine knows about a host object passes through
//! [`SourceRecord`].

use crate::value::Value;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Guid
///
/// Stable unique identifier of a host-managed business object.
/// Host-owned and opaque; the engine never mints one.
///

#[derive(
    Clone, Debug, Display, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Guid(String);

impl Guid {
    #[must_use]
    pub fn new(guid: impl Into<String>) -> Self {
        Self(guid.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

///
/// SourceRecord
///
/// Snapshot of a host business object: identity, entity name, scalar
/// attributes, and one hop of resolved associations. Write-back never
/// mutates a snapshot; it is expressed as attribute-write effects to the
/// host.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SourceRecord {
    guid: Guid,
    entity: String,
    attributes: BTreeMap<String, Value>,
    children: BTreeMap<String, Vec<SourceRecord>>,
}

impl SourceRecord {
    #[must_use]
    pub fn new(guid: impl Into<Guid>, entity: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            entity: entity.into(),
            attributes: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, association: impl Into<String>, child: Self) -> Self {
        self.children.entry(association.into()).or_default().push(child);
        self
    }

    #[must_use]
    pub const fn guid(&self) -> &Guid {
        &self.guid
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Human-readable entity label: the qualified name with any namespace
    /// prefix before the last separator stripped (`Logistics.Depot` →
    /// `Depot`).
    #[must_use]
    pub fn entity_label(&self) -> &str {
        self.entity
            .rsplit_once('.')
            .map_or(self.entity.as_str(), |(_, label)| label)
    }

    /// Read one scalar attribute; unset attributes read as [`Value::Empty`].
    #[must_use]
    pub fn attribute(&self, name: &str) -> Value {
        self.attributes.get(name).cloned().unwrap_or_default()
    }

    /// First associated record under `association`, if any.
    ///
    /// Associations are resolved as zero-or-one even when modeled as
    /// zero-or-many: first result wins.
    #[must_use]
    pub fn first_child(&self, association: &str) -> Option<&Self> {
        self.children.get(association).and_then(|children| children.first())
    }
}

impl From<Guid> for String {
    fn from(guid: Guid) -> Self {
        guid.0
    }
}
