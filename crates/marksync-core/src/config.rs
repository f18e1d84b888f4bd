//! Module: config
//! Responsibility: the read-only configuration surface and its startup
//! validation.
//! Does not own: runtime state; every field is fixed for the instance's
//! lifetime.

use crate::{
    geometry::LatLng,
    icon::{self, IconError, Shape, SymbolSize},
    schema::{self, RoleBindings, SchemaError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Context placeholder recognized inside constraint templates.
pub const CONTEXT_PLACEHOLDER: &str = "[%CurrentObject%]";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("target entity must not be empty")]
    MissingEntity,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Icon(#[from] IconError),

    #[error("marker opacity {opacity} is outside 0.0..=1.0")]
    OpacityOutOfRange { opacity: f64 },

    #[error("line opacity {opacity} is outside 0.0..=1.0")]
    LineOpacityOutOfRange { opacity: f64 },

    #[error("tilt '{raw}' is not a degree value (expected e.g. '45d')")]
    MalformedTilt { raw: String },
}

///
/// MapType
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[remain::sorted]
pub enum MapType {
    Hybrid,
    #[default]
    Roadmap,
    Satellite,
    Terrain,
}

///
/// MapOptions
///
/// Initial provider surface options. `style` is an opaque provider style
/// blob configured as JSON text in the host and parsed once here.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MapOptions {
    pub zoom: u8,
    pub map_type: MapType,
    pub style: Option<serde_json::Value>,
    pub draggable: bool,
    pub scroll_wheel: bool,
    pub map_type_control: bool,
    pub street_view_control: bool,
    pub zoom_control: bool,
    pub tilt: String,
    pub border_color: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            zoom: 11,
            map_type: MapType::Roadmap,
            style: None,
            draggable: true,
            scroll_wheel: true,
            map_type_control: true,
            street_view_control: false,
            zoom_control: true,
            tilt: "0d".to_string(),
            border_color: String::new(),
        }
    }
}

impl MapOptions {
    /// Parse the `"45d"`-style tilt setting into degrees.
    pub fn tilt_degrees(&self) -> Result<u16, ConfigError> {
        self.tilt
            .trim_end_matches('d')
            .parse::<u16>()
            .map_err(|_| ConfigError::MalformedTilt {
                raw: self.tilt.clone(),
            })
    }
}

///
/// EnumImage
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumImage {
    pub key: String,
    pub image: String,
}

///
/// IconConfig
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct IconConfig {
    pub enum_images: Vec<EnumImage>,
    pub default_icon: Option<String>,
    pub symbol: Shape,
    pub size: SymbolSize,
    pub opacity: f64,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            enum_images: Vec::new(),
            default_icon: None,
            symbol: Shape::Marker,
            size: SymbolSize::L,
            opacity: 1.0,
        }
    }
}

///
/// ClusterConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub enabled: bool,
    pub grid_size: u32,
    pub max_zoom: u8,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            grid_size: 60,
            max_zoom: 15,
        }
    }
}

///
/// LineConfig
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct LineConfig {
    pub enabled: bool,
    pub color: String,
    pub opacity: f64,
    pub weight: u32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#0595db".to_string(),
            opacity: 0.8,
            weight: 2,
        }
    }
}

///
/// WidgetConfig
///
/// Full configuration surface for one engine instance. Validated once at
/// construction; read-only afterwards.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Target entity name, possibly namespace-qualified.
    pub entity: String,
    /// Query constraint template; may contain [`CONTEXT_PLACEHOLDER`].
    pub constraint: String,
    pub roles: RoleBindings,
    /// Host-side object-producing action, used instead of a direct query.
    pub data_action: Option<String>,
    /// Host action triggered from a marker's info window or click.
    pub on_click_action: Option<String>,
    /// Always refetch from the store on context updates, bypassing the cache.
    pub refresh_on_update: bool,
    /// Frame the context object when no result constraint applies.
    pub go_to_context: bool,
    pub default_position: LatLng,
    /// Zoom level used when the result set cannot be bounds-fitted.
    pub lowest_zoom: u8,
    pub icons: IconConfig,
    pub cluster: ClusterConfig,
    pub line: LineConfig,
    /// Render the polyline only; marker handles are neither created nor
    /// attached.
    pub suppress_markers: bool,
    /// Offer the drag toggle; drag handlers are registered regardless.
    pub dragging_toggle: bool,
    pub disable_info_window: bool,
    pub info_window_label: String,
    /// Verbose per-cycle logging.
    pub debug: bool,
    pub map: MapOptions,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            entity: String::new(),
            constraint: String::new(),
            roles: RoleBindings::default(),
            data_action: None,
            on_click_action: None,
            refresh_on_update: false,
            go_to_context: false,
            default_position: LatLng::new(0.0, 0.0),
            lowest_zoom: 7,
            icons: IconConfig::default(),
            cluster: ClusterConfig::default(),
            line: LineConfig::default(),
            suppress_markers: false,
            dragging_toggle: false,
            disable_info_window: false,
            info_window_label: "Name".to_string(),
            debug: false,
            map: MapOptions::default(),
        }
    }
}

impl WidgetConfig {
    /// Validate the whole surface. Run once at engine construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity.is_empty() {
            return Err(ConfigError::MissingEntity);
        }

        // Malformed role paths fail here rather than on the first fetch.
        schema::resolve(&self.roles)?;

        icon::validate_symbol_table()?;

        if !(0.0..=1.0).contains(&self.icons.opacity) {
            return Err(ConfigError::OpacityOutOfRange {
                opacity: self.icons.opacity,
            });
        }
        if !(0.0..=1.0).contains(&self.line.opacity) {
            return Err(ConfigError::LineOpacityOutOfRange {
                opacity: self.line.opacity,
            });
        }

        self.map.tilt_degrees()?;

        Ok(())
    }

    /// True when the constraint template cannot run without a bound context.
    #[must_use]
    pub fn constraint_requires_context(&self) -> bool {
        self.constraint.contains(CONTEXT_PLACEHOLDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> WidgetConfig {
        WidgetConfig {
            entity: "Logistics.Depot".to_string(),
            ..WidgetConfig::default()
        }
    }

    #[test]
    fn default_surface_validates_once_entity_is_set() {
        valid().validate().expect("valid config");
    }

    #[test]
    fn missing_entity_is_rejected() {
        let err = WidgetConfig::default().validate().expect_err("must reject");
        assert!(matches!(err, ConfigError::MissingEntity));
    }

    #[test]
    fn malformed_role_path_is_rejected_at_construction() {
        let mut config = valid();
        config.roles.lat = "Location/Lat".to_string();
        let err = config.validate().expect_err("must reject");
        assert!(matches!(err, ConfigError::Schema(_)));
    }

    #[test]
    fn opacity_out_of_range_is_rejected() {
        let mut config = valid();
        config.icons.opacity = 1.5;
        let err = config.validate().expect_err("must reject");
        assert!(matches!(err, ConfigError::OpacityOutOfRange { .. }));
    }

    #[test]
    fn tilt_parses_degree_suffix() {
        let mut config = valid();
        config.map.tilt = "45d".to_string();
        assert_eq!(config.map.tilt_degrees().expect("parse"), 45);

        config.map.tilt = "wide".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn constraint_placeholder_detection() {
        let mut config = valid();
        assert!(!config.constraint_requires_context());
        config.constraint = "[ParentGuid = '[%CurrentObject%]']".to_string();
        assert!(config.constraint_requires_context());
    }

    #[test]
    fn style_blob_round_trips_as_json() {
        let raw = r#"{ "map": { "style": [ { "featureType": "water" } ] } }"#;
        let config: WidgetConfig = serde_json::from_str(raw).expect("deserialize");
        assert!(config.map.style.is_some());
    }
}
