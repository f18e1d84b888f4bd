//! Module: geometry
//! Responsibility: positions, bounding regions, and viewport framing policy.
//! Does not own: provider projection math or pan/zoom gesture handling.
//! Boundary: all framing decisions flow through [`FrameTracker`].

use serde::{Deserialize, Serialize};

///
/// LatLng
///

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

///
/// Bounds
///
/// Axis-aligned bounding region accumulated over marker positions.
/// Always contains at least the position it was seeded with.
///

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}

impl Bounds {
    #[must_use]
    pub const fn of(position: LatLng) -> Self {
        Self {
            south: position.lat,
            west: position.lng,
            north: position.lat,
            east: position.lng,
        }
    }

    pub const fn extend(&mut self, position: LatLng) {
        if position.lat < self.south {
            self.south = position.lat;
        }
        if position.lat > self.north {
            self.north = position.lat;
        }
        if position.lng < self.west {
            self.west = position.lng;
        }
        if position.lng > self.east {
            self.east = position.lng;
        }
    }

    #[must_use]
    pub const fn south_west(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    #[must_use]
    pub const fn north_east(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }
}

///
/// ViewportFrame
///
/// Deterministic framing outcome for one reconcile cycle.
///

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum ViewportFrame {
    /// Fit the viewport to the bounding region exactly.
    Fit(Bounds),
    /// Degenerate result set: re-center at a fixed minimum zoom.
    Center { position: LatLng, zoom: u8 },
}

///
/// FrameTracker
///
/// Running bounding region over the positions of one reconcile pass.
///
/// A bounds fit on 0 or 1 points is degenerate (undefined or zero-area box),
/// so those cases fall back to center-plus-zoom framing on the last
/// resolvable position, or the configured default position if none.
///

#[derive(Debug, Default)]
pub struct FrameTracker {
    bounds: Option<Bounds>,
    last: Option<LatLng>,
    resolved: u32,
}

impl FrameTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bounds: None,
            last: None,
            resolved: 0,
        }
    }

    /// Record one resolvable position.
    pub const fn observe(&mut self, position: LatLng) {
        match &mut self.bounds {
            Some(bounds) => bounds.extend(position),
            None => self.bounds = Some(Bounds::of(position)),
        }
        self.last = Some(position);
        self.resolved = self.resolved.saturating_add(1);
    }

    #[must_use]
    pub const fn resolved(&self) -> u32 {
        self.resolved
    }

    /// Close the pass and pick the frame.
    #[must_use]
    pub fn frame(&self, default_position: LatLng, lowest_zoom: u8) -> ViewportFrame {
        match self.bounds {
            Some(bounds) if self.resolved >= 2 => ViewportFrame::Fit(bounds),
            _ => ViewportFrame::Center {
                position: self.last.unwrap_or(default_position),
                zoom: lowest_zoom,
            },
        }
    }
}
