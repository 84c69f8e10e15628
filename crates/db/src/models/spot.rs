//! Spot models and DTOs.

use catchlog_core::marker::Marker;
use catchlog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `spots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub coordinates: Json<Vec<Marker>>,
    pub notes: String,
    pub map_image_url: Option<String>,
    pub is_favorite: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Spot {
    /// Number of additional markers, i.e. the valid index range `0..len`.
    pub fn marker_count(&self) -> usize {
        self.coordinates.0.len()
    }
}

/// Result of a spot update, including how many event/catch marker
/// references were pruned because their marker no longer exists.
#[derive(Debug, Clone)]
pub struct UpdatedSpot {
    pub spot: Spot,
    pub pruned_references: u64,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a spot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpot {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub coordinates: Vec<Marker>,
    #[serde(default)]
    pub notes: String,
    /// Map screenshot as a `data:image/...` URL.
    pub map_image: Option<String>,
}

/// DTO for partially updating a spot.
///
/// `coordinates`, when present, replaces the whole marker sequence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpot {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub coordinates: Option<Vec<Marker>>,
    pub notes: Option<String>,
    pub map_image: Option<String>,
}

/// DTO for the favorite flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFavorite {
    pub is_favorite: bool,
}
