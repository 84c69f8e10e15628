//! Map click routing for the spot editor.
//!
//! A click on the map becomes exactly one of: append a marker (adding
//! mode), move the primary marker, or move the selected additional marker.
//! Duplicate events fired by the map widget within the debounce window are
//! dropped, and clicks without finite coordinates are discarded.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::marker::{LatLng, MarkerIndex};
use crate::marker_manager::MarkerManager;

/// Minimum spacing between two processed clicks.
pub const DEFAULT_CLICK_DEBOUNCE: Duration = Duration::from_millis(100);

/// A raw click event as emitted by the map widget.
///
/// Either component may be missing when the widget fires a click outside of
/// the projected area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapClick {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl MapClick {
    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    /// The clicked position, if both components are present and finite.
    pub fn position(&self) -> Option<LatLng> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)).filter(LatLng::is_finite),
            _ => None,
        }
    }
}

/// What a routed click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    MovedPrimary,
    MovedMarker(usize),
    AddedMarker(usize),
    /// Arrived inside the debounce window and was dropped.
    Debounced,
    /// Missing or non-finite coordinates.
    Rejected,
}

impl ClickOutcome {
    /// Whether the click changed any marker.
    pub fn is_mutation(self) -> bool {
        !matches!(self, Self::Debounced | Self::Rejected)
    }
}

/// Rate limiter holding the instant of the last processed click.
#[derive(Debug, Clone)]
pub struct ClickDebouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Default for ClickDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_DEBOUNCE)
    }
}

impl ClickDebouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns `true` and records `now` if the click should be processed.
    /// Dropped clicks do not extend the window.
    pub fn accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        self.last = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Interprets map clicks against a [`MarkerManager`].
#[derive(Debug, Clone, Default)]
pub struct MapClickRouter {
    debouncer: ClickDebouncer,
}

impl MapClickRouter {
    pub fn new(debouncer: ClickDebouncer) -> Self {
        Self { debouncer }
    }

    /// Route one click received at `now`.
    pub fn route(&mut self, markers: &mut MarkerManager, click: MapClick, now: Instant) -> ClickOutcome {
        let Some(position) = click.position() else {
            tracing::warn!(lat = ?click.lat, lng = ?click.lng, "Discarding map click with invalid coordinates");
            return ClickOutcome::Rejected;
        };

        if !self.debouncer.accept(now) {
            tracing::debug!(lat = position.lat, lng = position.lng, "Dropping duplicate map click");
            return ClickOutcome::Debounced;
        }

        if markers.is_adding_marker() {
            if let Some(index) = markers.add_marker(position, now) {
                return ClickOutcome::AddedMarker(index);
            }
        }

        match markers.selected_index() {
            Some(MarkerIndex::Additional(i)) => {
                if markers.move_marker(i, position).is_ok() {
                    return ClickOutcome::MovedMarker(i);
                }
                tracing::warn!(index = i, "Selected marker no longer exists, moving primary instead");
            }
            Some(MarkerIndex::Primary) | None => {}
        }

        markers.move_primary(position);
        ClickOutcome::MovedPrimary
    }

    /// Route a click using the current time.
    pub fn handle_map_click(&mut self, markers: &mut MarkerManager, click: MapClick) -> ClickOutcome {
        self.route(markers, click, Instant::now())
    }
}
