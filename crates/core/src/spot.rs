//! Spot constants and validation.
//!
//! Used by the API handlers before persisting and by the editor page before
//! any network call is made.

use crate::error::CoreError;
use crate::marker::{LatLng, Marker};

/// Maximum length of a spot name (characters).
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of free-text notes (characters).
pub const MAX_NOTES_LENGTH: usize = 10_000;

/// Maximum number of additional markers per spot.
pub const MAX_ADDITIONAL_MARKERS: usize = 100;

/// Maximum length of a marker name (characters).
pub const MAX_MARKER_NAME_LENGTH: usize = 100;

/// Required prefix of an uploaded map screenshot.
pub const MAP_IMAGE_PREFIX: &str = "data:image/";

/// Maximum size of an uploaded map screenshot data URL (bytes).
pub const MAX_MAP_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Plain-field form state of the spot editor, as typed by the user.
///
/// Latitude and longitude stay as text until submit so that a half-typed
/// value does not fight the map click router.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpotForm {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    pub notes: String,
    pub map_image: Option<String>,
}

impl SpotForm {
    /// Write a position into the text fields.
    pub fn set_position(&mut self, position: LatLng) {
        self.latitude = position.lat.to_string();
        self.longitude = position.lng.to_string();
    }

    /// Parse the primary position from the text fields.
    pub fn parse_position(&self) -> Result<LatLng, CoreError> {
        let lat = parse_degrees("Latitude", &self.latitude)?;
        let lng = parse_degrees("Longitude", &self.longitude)?;
        let position = LatLng::new(lat, lng);
        position.validate()?;
        Ok(position)
    }
}

fn parse_degrees(field: &str, raw: &str) -> Result<f64, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoreError::Validation(format!("{field} must be a number, got '{trimmed}'")))
}

/// Validate a spot name: non-empty after trimming and within the length cap.
pub fn validate_spot_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Spot name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Spot name exceeds {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_notes(notes: &str) -> Result<(), CoreError> {
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(CoreError::Validation(format!(
            "Notes exceed {MAX_NOTES_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate the additional marker sequence of a spot.
pub fn validate_coordinates(coordinates: &[Marker]) -> Result<(), CoreError> {
    if coordinates.len() > MAX_ADDITIONAL_MARKERS {
        return Err(CoreError::Validation(format!(
            "A spot may have at most {MAX_ADDITIONAL_MARKERS} additional markers, got {}",
            coordinates.len()
        )));
    }
    for (i, marker) in coordinates.iter().enumerate() {
        marker
            .position()
            .validate()
            .map_err(|e| CoreError::Validation(format!("Marker {i}: {e}")))?;
        if let Some(name) = &marker.name {
            if name.chars().count() > MAX_MARKER_NAME_LENGTH {
                return Err(CoreError::Validation(format!(
                    "Marker {i}: name exceeds {MAX_MARKER_NAME_LENGTH} characters"
                )));
            }
        }
    }
    Ok(())
}

/// Validate an uploaded map screenshot (a `data:image/...` URL).
pub fn validate_map_image(data_url: &str) -> Result<(), CoreError> {
    if !data_url.starts_with(MAP_IMAGE_PREFIX) {
        return Err(CoreError::Validation(
            "Map image must be an image data URL".to_string(),
        ));
    }
    if data_url.len() > MAX_MAP_IMAGE_BYTES {
        return Err(CoreError::Validation(format!(
            "Map image exceeds {MAX_MAP_IMAGE_BYTES} bytes"
        )));
    }
    Ok(())
}
