//! Marker types shared by spots, events, and catches.
//!
//! A spot has one primary marker (its own `latitude`/`longitude`) and zero or
//! more additional markers stored in its `coordinates` sequence. Other records
//! reference markers by position using the wire convention `-1` = primary,
//! `0..n-1` = additional.
//!
//! Two selection cardinalities exist and are kept as distinct types:
//! [`SingleMarkerSelection`] drives the spot editor, [`MarkerSelectionSet`]
//! is what events and catches store.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Wire value denoting the primary marker.
pub const PRIMARY_MARKER_INDEX: i32 = -1;

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A geographic position in floating point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `true` when both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Validate that the position is finite and inside the WGS84 ranges.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.is_finite() {
            return Err(CoreError::Validation(format!(
                "Coordinates must be finite numbers, got ({}, {})",
                self.lat, self.lng
            )));
        }
        let (lat_min, lat_max) = LATITUDE_RANGE;
        if !(lat_min..=lat_max).contains(&self.lat) {
            return Err(CoreError::Validation(format!(
                "Latitude {} is outside [{lat_min}, {lat_max}]",
                self.lat
            )));
        }
        let (lng_min, lng_max) = LONGITUDE_RANGE;
        if !(lng_min..=lng_max).contains(&self.lng) {
            return Err(CoreError::Validation(format!(
                "Longitude {} is outside [{lng_min}, {lng_max}]",
                self.lng
            )));
        }
        Ok(())
    }
}

/// An additional marker of a spot (`{lat, lng, name?}` on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Marker {
    pub fn new(lat: f64, lng: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            name: Some(name.into()),
        }
    }

    /// Auto-generated name for the additional marker at `index`.
    ///
    /// The primary marker is conceptually "Marker 1", so position 0 in the
    /// `coordinates` sequence is displayed as "Marker 2".
    pub fn default_name(index: usize) -> String {
        format!("Marker {}", index + 2)
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Move the marker, keeping its name.
    pub fn move_to(&mut self, position: LatLng) {
        self.lat = position.lat;
        self.lng = position.lng;
    }
}

// ---------------------------------------------------------------------------
// Marker index
// ---------------------------------------------------------------------------

/// Reference to one marker of a spot.
///
/// Ordering puts the primary marker first, then additional markers by
/// position, which matches how marker lists are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum MarkerIndex {
    Primary,
    Additional(usize),
}

impl MarkerIndex {
    /// Parse the wire convention (`-1` = primary, `0..` = additional).
    pub fn from_wire(raw: i32) -> Result<Self, CoreError> {
        match raw {
            PRIMARY_MARKER_INDEX => Ok(Self::Primary),
            n if n >= 0 => Ok(Self::Additional(n as usize)),
            n => Err(CoreError::Validation(format!(
                "Invalid marker index {n}. Must be -1 (primary) or a non-negative position"
            ))),
        }
    }

    pub fn to_wire(self) -> i32 {
        match self {
            Self::Primary => PRIMARY_MARKER_INDEX,
            // Saturates; no spot holds that many markers, so it stays out of range.
            Self::Additional(i) => i32::try_from(i).unwrap_or(i32::MAX),
        }
    }

    /// Whether this index refers to an existing marker of a spot with `len`
    /// additional markers. The primary marker always exists.
    pub fn exists_in(self, len: usize) -> bool {
        match self {
            Self::Primary => true,
            Self::Additional(i) => i < len,
        }
    }

    /// Every marker of a spot with `len` additional markers, primary first.
    pub fn all(len: usize) -> impl Iterator<Item = MarkerIndex> {
        std::iter::once(Self::Primary).chain((0..len).map(Self::Additional))
    }
}

impl TryFrom<i32> for MarkerIndex {
    type Error = CoreError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::from_wire(raw)
    }
}

impl From<MarkerIndex> for i32 {
    fn from(index: MarkerIndex) -> Self {
        index.to_wire()
    }
}

impl fmt::Display for MarkerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Additional(i) => write!(f, "#{i}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Single selection (spot editor)
// ---------------------------------------------------------------------------

/// The marker currently targeted by map clicks in the spot editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleMarkerSelection(Option<MarkerIndex>);

impl SingleMarkerSelection {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn primary() -> Self {
        Self(Some(MarkerIndex::Primary))
    }

    pub fn of(index: MarkerIndex) -> Self {
        Self(Some(index))
    }

    pub fn get(&self) -> Option<MarkerIndex> {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn set(&mut self, index: MarkerIndex) {
        self.0 = Some(index);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// `None`, the primary marker, or an existing additional marker.
    pub fn is_valid_for(&self, len: usize) -> bool {
        self.0.map_or(true, |index| index.exists_in(len))
    }

    /// Selection repair after the additional marker at `removed` is deleted.
    ///
    /// Removing the selected marker clears the selection; removing one in
    /// front of it shifts the selection down so it keeps pointing at the same
    /// logical marker.
    pub fn after_removal(self, removed: usize) -> Self {
        match self.0 {
            Some(MarkerIndex::Additional(i)) if i == removed => Self(None),
            Some(MarkerIndex::Additional(i)) if i > removed => {
                Self(Some(MarkerIndex::Additional(i - 1)))
            }
            _ => self,
        }
    }
}

// ---------------------------------------------------------------------------
// Multi selection (events and catches)
// ---------------------------------------------------------------------------

/// A set of markers of one spot, as referenced by an event or a catch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct MarkerSelectionSet(BTreeSet<MarkerIndex>);

impl MarkerSelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a wire array, dropping duplicates.
    pub fn from_wire(raw: &[i32]) -> Result<Self, CoreError> {
        raw.iter()
            .map(|&i| MarkerIndex::from_wire(i))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    /// Wire array in display order (primary first).
    pub fn to_wire(&self) -> Vec<i32> {
        self.0.iter().map(|i| i.to_wire()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: MarkerIndex) -> bool {
        self.0.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = MarkerIndex> + '_ {
        self.0.iter().copied()
    }

    /// Flip membership of a single marker.
    pub fn toggle(&mut self, index: MarkerIndex) {
        if !self.0.remove(&index) {
            self.0.insert(index);
        }
    }

    /// Whether every marker of a spot with `len` additional markers is in
    /// the set.
    pub fn is_all_selected(&self, len: usize) -> bool {
        MarkerIndex::all(len).all(|i| self.0.contains(&i))
    }

    /// The "select all / deselect all" toggle.
    ///
    /// If every marker is already selected the set becomes empty, otherwise
    /// it becomes exactly the full marker set.
    pub fn toggle_all(&mut self, len: usize) {
        if self.is_all_selected(len) {
            self.0.clear();
        } else {
            self.0 = MarkerIndex::all(len).collect();
        }
    }

    /// Every index must refer to an existing marker right now.
    pub fn validate_against(&self, len: usize) -> Result<(), CoreError> {
        match self.0.iter().find(|i| !i.exists_in(len)) {
            Some(stale) => Err(CoreError::MarkerOutOfRange {
                index: stale.to_wire(),
                len,
            }),
            None => Ok(()),
        }
    }

    /// Drop indices that no longer exist. Returns `true` if anything changed.
    pub fn retain_in_range(&mut self, len: usize) -> bool {
        let before = self.0.len();
        self.0.retain(|i| i.exists_in(len));
        self.0.len() != before
    }
}

impl TryFrom<Vec<i32>> for MarkerSelectionSet {
    type Error = CoreError;

    fn try_from(raw: Vec<i32>) -> Result<Self, Self::Error> {
        Self::from_wire(&raw)
    }
}

impl From<MarkerSelectionSet> for Vec<i32> {
    fn from(set: MarkerSelectionSet) -> Self {
        set.to_wire()
    }
}

impl FromIterator<MarkerIndex> for MarkerSelectionSet {
    fn from_iter<T: IntoIterator<Item = MarkerIndex>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
