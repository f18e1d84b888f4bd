//! Module: surface
//! Responsibility: the synchronous boundary to the map provider SDK.
//! Does not own: provider rendering, projection, or gesture handling.
//! Boundary: the engine never talks to a provider except through
//! [`MapSurface`]; asynchronous provider work (geocoding, script load,
//! info-window content attachment) arrives back as events and completions.

use crate::{
    config::{ClusterConfig, LineConfig},
    geometry::{Bounds, LatLng, ViewportFrame},
    icon::IconSpec,
    record::Guid,
};
use derive_more::Display;
use serde::Serialize;

///
/// SurfaceMarkerId
///
/// Provider-side marker identity, minted by the surface when a marker is
/// placed. Opaque to the engine beyond equality.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SurfaceMarkerId(pub u64);

///
/// MarkerInit
///
/// Placement payload. `key` is the record identity the host tags the
/// provider marker with, so interaction events can name it.
///

#[derive(Debug)]
pub struct MarkerInit<'a> {
    pub key: &'a Guid,
    pub position: LatLng,
    pub title: &'a str,
    pub icon: &'a IconSpec,
    pub draggable: bool,
    pub opacity: f64,
}

///
/// MapSurface
///
/// Synchronous provider operations. Implementations attach newly placed
/// markers to the map immediately; attachment and placement are separate
/// because cached markers can exist detached.
///

pub trait MapSurface {
    fn place_marker(&mut self, init: &MarkerInit<'_>) -> SurfaceMarkerId;
    fn attach_marker(&mut self, id: SurfaceMarkerId);
    fn detach_marker(&mut self, id: SurfaceMarkerId);
    fn remove_marker(&mut self, id: SurfaceMarkerId);
    fn set_marker_draggable(&mut self, id: SurfaceMarkerId, draggable: bool);

    fn fit_bounds(&mut self, bounds: Bounds);
    fn pan_to(&mut self, position: LatLng);
    fn set_zoom(&mut self, zoom: u8);

    fn draw_polyline(&mut self, path: &[LatLng], style: &LineConfig);
    fn clear_polyline(&mut self);

    /// Hand the given markers to the clustering wrapper, which owns their
    /// map attachment until [`Self::clear_clusters`].
    fn cluster_markers(&mut self, ids: &[SurfaceMarkerId], config: &ClusterConfig);
    fn clear_clusters(&mut self);

    fn open_info_window(&mut self, anchor: SurfaceMarkerId, content: &str);
    fn set_info_window_content(&mut self, anchor: SurfaceMarkerId, content: &str);
    fn close_info_window(&mut self);

    fn trigger_resize(&mut self);
}

/// Apply a framing decision to the surface.
pub fn apply_frame(surface: &mut dyn MapSurface, frame: ViewportFrame) {
    match frame {
        ViewportFrame::Fit(bounds) => surface.fit_bounds(bounds),
        ViewportFrame::Center { position, zoom } => {
            surface.set_zoom(zoom);
            surface.pan_to(position);
        }
    }
}
