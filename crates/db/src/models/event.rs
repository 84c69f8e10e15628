//! Fishing event models and DTOs.

use catchlog_core::marker::MarkerSelectionSet;
use catchlog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: DbId,
    pub user_id: DbId,
    pub spot_id: Option<DbId>,
    pub title: String,
    pub starts_at: Timestamp,
    pub notes: String,
    pub selected_marker_indexes: Vec<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    pub spot_id: Option<DbId>,
    pub title: String,
    pub starts_at: Timestamp,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub selected_marker_indexes: MarkerSelectionSet,
}

/// DTO for partially updating an event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    pub spot_id: Option<DbId>,
    pub title: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub selected_marker_indexes: Option<MarkerSelectionSet>,
}
