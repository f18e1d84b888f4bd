//! Module: schema
//! Responsibility: role-to-attribute bindings and their resolution into a
//! query projection plus a per-role extraction table.
//! Does not own: record extraction (mapper) or query execution (host).
//! Boundary: all attribute-path parsing happens here, once per fetch cycle.
//!
//! Invariants:
//! - A role is present in a plan only if its configured binding is non-empty.
//! - Paths are `Direct` (1 segment) or `ViaAssociation` (exactly 3 segments,
//!   fixed format `Assoc/Entity/Attr`); anything else is rejected.
//! - An empty plan falls back to a single placeholder attribute so the host
//!   never receives an unconstrained full-object projection.


use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

/// Placeholder requested when no role resolves to any attribute.
///
/// System-provided creation-timestamp field; a cost-control fallback that
/// keeps the host from serving a full-object fetch, not a semantic
/// requirement.
pub const PLACEHOLDER_ATTR: &str = "createdDate";

///
/// SchemaError
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("attribute path '{path}' for role {role} has {segments} segments (expected 1 or 3)")]
    MalformedPath {
        role: Role,
        path: String,
        segments: usize,
    },

    #[error("attribute path '{path}' for role {role} contains an empty segment")]
    EmptySegment { role: Role, path: String },
}

///
/// Role
///
/// Semantic roles a configured attribute can play in a marker view.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[remain::sorted]
pub enum Role {
    Address,
    Color,
    Enum,
    Lat,
    Lng,
    Marker,
}

impl Role {
    pub const ALL: [Self; 6] = [
        Self::Address,
        Self::Color,
        Self::Enum,
        Self::Lat,
        Self::Lng,
        Self::Marker,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Address => "address",
            Self::Color => "color",
            Self::Enum => "enum",
            Self::Lat => "lat",
            Self::Lng => "lng",
            Self::Marker => "marker",
        };
        write!(f, "{label}")
    }
}

///
/// AttributePath
///
/// Parsed form of one configured attribute binding. The middle token of a
/// 3-token path names the target entity; it is structurally required by the
/// fixed path format but unused for resolution.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AttributePath {
    Direct(String),
    ViaAssociation {
        association: String,
        entity: String,
        attribute: String,
    },
}

impl AttributePath {
    /// Parse one configured binding. Callers guarantee `raw` is non-empty.
    pub fn parse(role: Role, raw: &str) -> Result<Self, SchemaError> {
        let segments: Vec<&str> = raw.split('/').collect();

        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(SchemaError::EmptySegment {
                role,
                path: raw.to_string(),
            });
        }

        match segments.as_slice() {
            [attribute] => Ok(Self::Direct((*attribute).to_string())),
            [association, entity, attribute] => Ok(Self::ViaAssociation {
                association: (*association).to_string(),
                entity: (*entity).to_string(),
                attribute: (*attribute).to_string(),
            }),
            _ => Err(SchemaError::MalformedPath {
                role,
                path: raw.to_string(),
                segments: segments.len(),
            }),
        }
    }
}

///
/// RoleBindings
///
/// Configured attribute strings per role, exactly as entered by the user.
/// An empty string means the role is not configured.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RoleBindings {
    pub marker: String,
    pub lat: String,
    pub lng: String,
    pub color: String,
    pub address: String,
    pub enum_key: String,
}

impl RoleBindings {
    #[must_use]
    pub fn get(&self, role: Role) -> &str {
        match role {
            Role::Address => &self.address,
            Role::Color => &self.color,
            Role::Enum => &self.enum_key,
            Role::Lat => &self.lat,
            Role::Lng => &self.lng,
            Role::Marker => &self.marker,
        }
    }
}

///
/// SchemaPlan
///
/// Resolution output: the query projection (direct attributes), referenced
/// associated-entity attributes, and the per-role path table used for
/// generic extraction. Plans are disposable; resolution re-runs every fetch
/// cycle.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SchemaPlan {
    projection: Vec<String>,
    references: BTreeMap<String, Vec<String>>,
    paths: BTreeMap<Role, AttributePath>,
}

impl SchemaPlan {
    #[must_use]
    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    #[must_use]
    pub const fn references(&self) -> &BTreeMap<String, Vec<String>> {
        &self.references
    }

    #[must_use]
    pub fn path(&self, role: Role) -> Option<&AttributePath> {
        self.paths.get(&role)
    }
}

/// Resolve configured bindings into a schema plan.
///
/// Pure function of configuration; deterministic; no I/O.
pub fn resolve(bindings: &RoleBindings) -> Result<SchemaPlan, SchemaError> {
    let mut plan = SchemaPlan::default();

    for role in Role::ALL {
        let raw = bindings.get(role);
        if raw.is_empty() {
            continue;
        }

        let path = AttributePath::parse(role, raw)?;
        match &path {
            AttributePath::Direct(attribute) => {
                plan.projection.push(attribute.clone());
            }
            AttributePath::ViaAssociation {
                association,
                attribute,
                ..
            } => {
                plan.references
                    .entry(association.clone())
                    .or_default()
                    .push(attribute.clone());
            }
        }
        plan.paths.insert(role, path);
    }

    if plan.projection.is_empty() && plan.references.is_empty() {
        plan.projection.push(PLACEHOLDER_ATTR.to_string());
    }

    Ok(plan)
}
