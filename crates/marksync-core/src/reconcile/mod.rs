//! Module: reconcile
//! Responsibility: the marker cache and its reconciliation against each
//! incoming view batch, marker attachment lifecycle, clustering delegation,
//! polyline rendering, and viewport framing.
//! Does not own: fetching (source), normalization (mapper), or provider
//! internals (surface).
//!
//! Invariants:
//! - The cache is keyed by per-record identity; one live marker per identity.
//! - Replacement is replace-not-mutate: a cache hit detaches the old handle
//!   and constructs a fresh one with current attributes.
//! - Detaching never evicts; identity entries persist until an explicit
//!   full invalidation.


use crate::{
    config::WidgetConfig,
    geometry::{FrameTracker, LatLng, ViewportFrame},
    icon::{self, IconSpec},
    mapper::{MarkerView, PositionOutcome},
    record::Guid,
    surface::{MapSurface, MarkerInit, SurfaceMarkerId},
};
use derive_more::Deref;
use std::collections::BTreeMap;
use tracing::{debug, warn};

///
/// MarkerHandle
///
/// Live on-map marker entity. Owned exclusively by the reconciler; the
/// engine reaches handles through lookup, never holds them.
///

#[derive(Clone, Debug)]
pub struct MarkerHandle {
    guid: Guid,
    context_guid: Option<Guid>,
    surface_id: SurfaceMarkerId,
    position: LatLng,
    title: String,
    icon: IconSpec,
    draggable: bool,
    attached: bool,
    formatted_address: Option<String>,
}

impl MarkerHandle {
    #[must_use]
    pub const fn guid(&self) -> &Guid {
        &self.guid
    }

    #[must_use]
    pub const fn surface_id(&self) -> SurfaceMarkerId {
        self.surface_id
    }

    #[must_use]
    pub const fn position(&self) -> LatLng {
        self.position
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn icon(&self) -> &IconSpec {
        &self.icon
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub const fn is_draggable(&self) -> bool {
        self.draggable
    }

    #[must_use]
    pub fn formatted_address(&self) -> Option<&str> {
        self.formatted_address.as_deref()
    }

    pub(crate) const fn set_position(&mut self, position: LatLng) {
        self.position = position;
    }

    pub(crate) fn set_formatted_address(&mut self, address: impl Into<String>) {
        self.formatted_address = Some(address.into());
    }
}

///
/// MarkerCache
///
/// Identity-keyed handle cache. Read access derefs to the underlying map;
/// mutation is explicit and confined to this module.
///

#[derive(Debug, Default, Deref)]
pub struct MarkerCache(BTreeMap<Guid, MarkerHandle>);

impl MarkerCache {
    fn insert(&mut self, handle: MarkerHandle) {
        self.0.insert(handle.guid.clone(), handle);
    }

    fn evict(&mut self, guid: &Guid) -> Option<MarkerHandle> {
        self.0.remove(guid)
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

///
/// ReconcileOutcome
///

#[derive(Debug)]
pub struct ReconcileOutcome {
    pub frame: ViewportFrame,
    /// Identities placed this pass, in view order.
    pub placed: Vec<Guid>,
    /// Identities whose previous handle was replaced (cache hits).
    pub replaced: Vec<Guid>,
    /// Views suppressed for unresolvable geometry.
    pub suppressed: u32,
}

///
/// Reconciler
///

#[derive(Debug, Default)]
pub struct Reconciler {
    cache: MarkerCache,
    cluster_active: bool,
}

impl Reconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn cache(&self) -> &MarkerCache {
        &self.cache
    }

    #[must_use]
    pub fn handle(&self, guid: &Guid) -> Option<&MarkerHandle> {
        self.cache.get(guid)
    }

    pub(crate) fn handle_mut(&mut self, guid: &Guid) -> Option<&mut MarkerHandle> {
        self.cache.0.get_mut(guid)
    }

    /// Reconcile one normalized view batch against the cache.
    ///
    /// Starts from a blank map (all cached handles detached), then places
    /// one marker per resolvable view, replacing any cached handle with the
    /// same identity.
    pub fn reconcile(
        &mut self,
        views: &[MarkerView],
        surface: &mut dyn MapSurface,
        config: &WidgetConfig,
    ) -> ReconcileOutcome {
        self.detach_all(surface);
        surface.clear_polyline();

        let mut tracker = FrameTracker::new();
        let mut placed = Vec::new();
        let mut replaced = Vec::new();
        let mut suppressed = 0u32;
        let mut line_path = Vec::new();

        for view in views {
            let position = match view.position() {
                PositionOutcome::Resolved(position) => position,
                PositionOutcome::DefaultPosition => config.default_position,
                PositionOutcome::Unresolvable => {
                    warn!(
                        guid = %view.guid,
                        lat = %view.lat,
                        lng = %view.lng,
                        "incorrect coordinates; marker suppressed"
                    );
                    suppressed = suppressed.saturating_add(1);
                    continue;
                }
            };

            tracker.observe(position);
            if config.line.enabled {
                line_path.push(position);
            }
            if config.suppress_markers {
                continue;
            }

            if let Some(old) = self.cache.evict(&view.guid) {
                surface.remove_marker(old.surface_id);
                replaced.push(view.guid.clone());
            }

            let icon = icon::choose_icon(&view.enum_key, &view.color, &config.icons);
            let surface_id = surface.place_marker(&MarkerInit {
                key: &view.guid,
                position,
                title: &view.label,
                icon: &icon,
                draggable: false,
                opacity: config.icons.opacity,
            });

            self.cache.insert(MarkerHandle {
                guid: view.guid.clone(),
                context_guid: view.context_guid.clone(),
                surface_id,
                position,
                title: view.label.clone(),
                icon,
                draggable: false,
                attached: true,
                formatted_address: None,
            });
            placed.push(view.guid.clone());
        }

        if config.line.enabled {
            surface.draw_polyline(&line_path, &config.line);
        }

        if config.cluster.enabled && placed.len() > 1 {
            let ids: Vec<SurfaceMarkerId> = placed
                .iter()
                .filter_map(|guid| self.cache.get(guid))
                .map(|handle| handle.surface_id)
                .collect();
            surface.cluster_markers(&ids, &config.cluster);
            self.cluster_active = true;
        }

        debug!(
            placed = placed.len(),
            replaced = replaced.len(),
            suppressed,
            "reconcile pass complete"
        );

        ReconcileOutcome {
            frame: tracker.frame(config.default_position, config.lowest_zoom),
            placed,
            replaced,
            suppressed,
        }
    }

    /// Re-display the cached marker set without fetching.
    ///
    /// With a bound context, only handles captured under that context are
    /// attached; returns `None` (caller falls back to the store) when
    /// nothing matches.
    pub fn serve_from_cache(
        &mut self,
        context: Option<&Guid>,
        surface: &mut dyn MapSurface,
        config: &WidgetConfig,
    ) -> Option<ViewportFrame> {
        if self.cache.is_empty() {
            return None;
        }

        let mut tracker = FrameTracker::new();
        let mut served: Vec<SurfaceMarkerId> = Vec::new();

        for handle in self.cache.0.values_mut() {
            if let Some(context) = context
                && handle.context_guid.as_ref() != Some(context)
            {
                continue;
            }
            surface.attach_marker(handle.surface_id);
            handle.attached = true;
            tracker.observe(handle.position);
            served.push(handle.surface_id);
        }

        if served.is_empty() {
            return None;
        }

        if config.cluster.enabled && served.len() > 1 {
            surface.cluster_markers(&served, &config.cluster);
            self.cluster_active = true;
        }

        debug!(served = served.len(), "serving markers from cache");
        Some(tracker.frame(config.default_position, config.lowest_zoom))
    }

    /// Detach every cached handle and clear any active clustering wrapper.
    /// Identity entries persist for later reuse.
    pub fn remove_all(&mut self, surface: &mut dyn MapSurface) {
        self.detach_all(surface);
    }

    /// Full cache invalidation: detach everything and drop identity entries.
    pub fn invalidate(&mut self, surface: &mut dyn MapSurface) {
        self.detach_all(surface);
        self.cache.clear();
    }

    /// Flip the draggable flag on every currently known handle. Handles not
    /// yet created are unaffected.
    pub fn set_dragging(&mut self, surface: &mut dyn MapSurface, enabled: bool) {
        for handle in self.cache.0.values_mut() {
            surface.set_marker_draggable(handle.surface_id, enabled);
            handle.draggable = enabled;
        }
    }

    fn detach_all(&mut self, surface: &mut dyn MapSurface) {
        for handle in self.cache.0.values_mut() {
            if handle.attached {
                surface.detach_marker(handle.surface_id);
                handle.attached = false;
            }
        }
        if self.cluster_active {
            surface.clear_clusters();
            self.cluster_active = false;
        }
    }
}
