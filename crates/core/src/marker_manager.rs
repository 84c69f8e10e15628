//! Marker state machine for the spot editor.
//!
//! [`MarkerManager`] owns the spot's primary position, its additional
//! markers, the single selection, and the adding-mode flag. The map click
//! router and the editor page drive it; it never performs I/O.
//!
//! ```text
//! Idle ──select(i)──> Selected(i) ──toggle_adding──> Adding
//!   ^                   │   ^                          │
//!   └──remove(i)────────┘   └──add_marker / select(i)──┘
//! ```

use std::time::Instant;

use crate::error::CoreError;
use crate::focus::{MarkerFocus, PanCommand};
use crate::marker::{LatLng, Marker, MarkerIndex, SingleMarkerSelection};

/// Observable mode of the editor, derived from the selection and the
/// adding flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Idle,
    Selected(MarkerIndex),
    Adding,
}

#[derive(Debug, Clone)]
pub struct MarkerManager {
    primary: LatLng,
    coordinates: Vec<Marker>,
    selection: SingleMarkerSelection,
    adding: bool,
    focus: MarkerFocus,
}

impl MarkerManager {
    /// Editor state for a spot that does not exist yet.
    ///
    /// The primary marker starts selected and has no position until the
    /// first map click (or form input) sets one.
    pub fn for_new_spot() -> Self {
        Self::new(LatLng::new(f64::NAN, f64::NAN), Vec::new())
    }

    /// Editor state for an existing spot, primary marker selected.
    pub fn new(primary: LatLng, coordinates: Vec<Marker>) -> Self {
        Self {
            primary,
            coordinates,
            selection: SingleMarkerSelection::primary(),
            adding: false,
            focus: MarkerFocus::default(),
        }
    }

    /// Replace the focus timing (tests use a zero delay).
    pub fn with_focus(mut self, focus: MarkerFocus) -> Self {
        self.focus = focus;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn primary(&self) -> LatLng {
        self.primary
    }

    pub fn coordinates(&self) -> &[Marker] {
        &self.coordinates
    }

    pub fn into_coordinates(self) -> Vec<Marker> {
        self.coordinates
    }

    pub fn selection(&self) -> SingleMarkerSelection {
        self.selection
    }

    pub fn selected_index(&self) -> Option<MarkerIndex> {
        self.selection.get()
    }

    pub fn is_adding_marker(&self) -> bool {
        self.adding
    }

    pub fn mode(&self) -> EditorMode {
        if self.adding {
            return EditorMode::Adding;
        }
        match self.selection.get() {
            Some(index) => EditorMode::Selected(index),
            None => EditorMode::Idle,
        }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Append a marker at `position` and select it.
    ///
    /// Only valid in adding mode; outside of it the call is ignored and
    /// `None` is returned. Returns the new marker's position in
    /// `coordinates` otherwise.
    pub fn add_marker(&mut self, position: LatLng, now: Instant) -> Option<usize> {
        if !self.adding {
            tracing::debug!("Ignoring add_marker outside of adding mode");
            return None;
        }
        let index = self.coordinates.len();
        self.coordinates
            .push(Marker::new(position.lat, position.lng, Marker::default_name(index)));
        self.adding = false;
        self.select(MarkerIndex::Additional(index), now);
        tracing::debug!(index, lat = position.lat, lng = position.lng, "Marker added");
        Some(index)
    }

    /// Delete the additional marker at `index`, repairing the selection.
    ///
    /// References held by events or catches are not touched here.
    pub fn remove_marker(&mut self, index: usize) -> Result<Marker, CoreError> {
        self.ensure_exists(index)?;
        let removed = self.coordinates.remove(index);
        self.selection = self.selection.after_removal(index);
        self.focus.after_removal(index);
        tracing::debug!(index, remaining = self.coordinates.len(), "Marker removed");
        Ok(removed)
    }

    /// Select a marker, leaving adding mode and queueing a pan to it.
    pub fn select_marker(&mut self, index: MarkerIndex, now: Instant) -> Result<(), CoreError> {
        if !index.exists_in(self.coordinates.len()) {
            return Err(CoreError::MarkerOutOfRange {
                index: index.to_wire(),
                len: self.coordinates.len(),
            });
        }
        self.adding = false;
        self.select(index, now);
        Ok(())
    }

    /// Rename an additional marker. Names need not be unique.
    pub fn update_marker_name(&mut self, index: usize, name: impl Into<String>) -> Result<(), CoreError> {
        self.ensure_exists(index)?;
        self.coordinates[index].name = Some(name.into());
        Ok(())
    }

    /// Flip adding mode. The current selection is kept so cancelling returns
    /// to it.
    pub fn toggle_adding_mode(&mut self) -> bool {
        self.adding = !self.adding;
        self.adding
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.focus.cancel();
    }

    /// Overwrite the primary marker position.
    pub fn move_primary(&mut self, position: LatLng) {
        self.primary = position;
    }

    /// Overwrite an additional marker's position, keeping its name.
    pub fn move_marker(&mut self, index: usize, position: LatLng) -> Result<(), CoreError> {
        self.ensure_exists(index)?;
        self.coordinates[index].move_to(position);
        Ok(())
    }

    /// Resolve a due focus request into a pan command for the map widget.
    pub fn poll_focus(&mut self, now: Instant) -> Option<PanCommand> {
        self.focus.poll(now, self.primary, &self.coordinates)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn select(&mut self, index: MarkerIndex, now: Instant) {
        self.selection.set(index);
        self.focus.request(index, now);
    }

    fn ensure_exists(&self, index: usize) -> Result<(), CoreError> {
        if index < self.coordinates.len() {
            Ok(())
        } else {
            Err(CoreError::MarkerOutOfRange {
                index: i32::try_from(index).unwrap_or(i32::MAX),
                len: self.coordinates.len(),
            })
        }
    }
}
