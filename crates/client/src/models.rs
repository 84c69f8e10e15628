//! Wire types exchanged with the spot API.

use catchlog_core::marker::{LatLng, Marker};
use catchlog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// A persisted spot as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: DbId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub coordinates: Vec<Marker>,
    #[serde(default)]
    pub notes: String,
    pub map_image_url: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Spot {
    pub fn primary(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Body of `POST /api/spots` and `PUT /api/spots/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotPayload {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub coordinates: Vec<Marker>,
    pub notes: String,
    /// Map screenshot as a data URL; omitted when capture failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_image: Option<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_uses_camel_case_and_skips_missing_image() {
        let payload = SpotPayload {
            name: "Pier".into(),
            latitude: 1.0,
            longitude: 2.0,
            coordinates: vec![Marker::new(1.5, 2.5, "Marker 2")],
            notes: String::new(),
            map_image: None,
        };

        let json = serde_json::to_value(&payload).unwrap();

        assert!(json.get("mapImage").is_none());
        assert_eq!(json["coordinates"][0]["name"], "Marker 2");
    }

    #[test]
    fn test_spot_tolerates_missing_optional_fields() {
        let spot: Spot = serde_json::from_str(
            r#"{"id": 7, "name": "Bay", "latitude": 1.0, "longitude": 2.0, "mapImageUrl": null}"#,
        )
        .unwrap();

        assert!(spot.coordinates.is_empty());
        assert!(!spot.is_favorite);
        assert_eq!(spot.primary(), LatLng::new(1.0, 2.0));
    }
}
