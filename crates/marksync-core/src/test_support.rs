//! Shared in-crate test doubles.

use crate::{
    config::{ClusterConfig, LineConfig},
    geometry::{Bounds, LatLng},
    icon::IconSpec,
    record::Guid,
    surface::{MapSurface, MarkerInit, SurfaceMarkerId},
};
use std::collections::BTreeSet;

///
/// SurfaceCall
///
/// One recorded provider operation, in call order.
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SurfaceCall {
    Place {
        id: SurfaceMarkerId,
        key: Guid,
        position: LatLng,
        title: String,
        icon: IconSpec,
        draggable: bool,
    },
    Attach(SurfaceMarkerId),
    Detach(SurfaceMarkerId),
    Remove(SurfaceMarkerId),
    SetDraggable(SurfaceMarkerId, bool),
    FitBounds(Bounds),
    PanTo(LatLng),
    SetZoom(u8),
    DrawPolyline { path: Vec<LatLng>, color: String },
    ClearPolyline,
    Cluster { ids: Vec<SurfaceMarkerId> },
    ClearClusters,
    OpenInfoWindow { anchor: SurfaceMarkerId, content: String },
    SetInfoWindowContent { anchor: SurfaceMarkerId, content: String },
    CloseInfoWindow,
    TriggerResize,
}

///
/// FakeSurface
///
/// Recording surface double with enough attachment state to assert the
/// "one live marker per identity" property.
///

#[derive(Debug, Default)]
pub(crate) struct FakeSurface {
    next_id: u64,
    pub(crate) calls: Vec<SurfaceCall>,
    attached: BTreeSet<SurfaceMarkerId>,
}

impl FakeSurface {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn live_markers(&self) -> usize {
        self.attached.len()
    }

    pub(crate) fn count_calls(&self, matches: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(call)).count()
    }
}

impl MapSurface for FakeSurface {
    fn place_marker(&mut self, init: &MarkerInit<'_>) -> SurfaceMarkerId {
        self.next_id += 1;
        let id = SurfaceMarkerId(self.next_id);
        self.attached.insert(id);
        self.calls.push(SurfaceCall::Place {
            id,
            key: init.key.clone(),
            position: init.position,
            title: init.title.to_string(),
            icon: init.icon.clone(),
            draggable: init.draggable,
        });
        id
    }

    fn attach_marker(&mut self, id: SurfaceMarkerId) {
        self.attached.insert(id);
        self.calls.push(SurfaceCall::Attach(id));
    }

    fn detach_marker(&mut self, id: SurfaceMarkerId) {
        self.attached.remove(&id);
        self.calls.push(SurfaceCall::Detach(id));
    }

    fn remove_marker(&mut self, id: SurfaceMarkerId) {
        self.attached.remove(&id);
        self.calls.push(SurfaceCall::Remove(id));
    }

    fn set_marker_draggable(&mut self, id: SurfaceMarkerId, draggable: bool) {
        self.calls.push(SurfaceCall::SetDraggable(id, draggable));
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.calls.push(SurfaceCall::FitBounds(bounds));
    }

    fn pan_to(&mut self, position: LatLng) {
        self.calls.push(SurfaceCall::PanTo(position));
    }

    fn set_zoom(&mut self, zoom: u8) {
        self.calls.push(SurfaceCall::SetZoom(zoom));
    }

    fn draw_polyline(&mut self, path: &[LatLng], style: &LineConfig) {
        self.calls.push(SurfaceCall::DrawPolyline {
            path: path.to_vec(),
            color: style.color.clone(),
        });
    }

    fn clear_polyline(&mut self) {
        self.calls.push(SurfaceCall::ClearPolyline);
    }

    fn cluster_markers(&mut self, ids: &[SurfaceMarkerId], _config: &ClusterConfig) {
        self.calls.push(SurfaceCall::Cluster { ids: ids.to_vec() });
    }

    fn clear_clusters(&mut self) {
        self.calls.push(SurfaceCall::ClearClusters);
    }

    fn open_info_window(&mut self, anchor: SurfaceMarkerId, content: &str) {
        self.calls.push(SurfaceCall::OpenInfoWindow {
            anchor,
            content: content.to_string(),
        });
    }

    fn set_info_window_content(&mut self, anchor: SurfaceMarkerId, content: &str) {
        self.calls.push(SurfaceCall::SetInfoWindowContent {
            anchor,
            content: content.to_string(),
        });
    }

    fn close_info_window(&mut self) {
        self.calls.push(SurfaceCall::CloseInfoWindow);
    }

    fn trigger_resize(&mut self) {
        self.calls.push(SurfaceCall::TriggerResize);
    }
}
