//! Fishing event constants and validation.

use crate::error::CoreError;
use crate::marker::MarkerSelectionSet;
use crate::types::DbId;

/// Maximum length of an event title (characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Validate an event title: non-empty after trimming and within the cap.
pub fn validate_event_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Event title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Event title exceeds {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Markers may only be referenced together with a spot.
pub fn validate_marker_reference(
    spot_id: Option<DbId>,
    markers: &MarkerSelectionSet,
) -> Result<(), CoreError> {
    if spot_id.is_none() && !markers.is_empty() {
        return Err(CoreError::Validation(
            "selectedMarkerIndexes requires a spotId".to_string(),
        ));
    }
    Ok(())
}
