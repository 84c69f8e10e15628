//! Catch models and DTOs.

use catchlog_core::marker::MarkerSelectionSet;
use catchlog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `catches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catch {
    pub id: DbId,
    pub user_id: DbId,
    pub spot_id: Option<DbId>,
    pub species: String,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub caught_at: Timestamp,
    pub notes: String,
    pub selected_marker_indexes: Vec<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for logging a catch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatch {
    pub spot_id: Option<DbId>,
    pub species: String,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub caught_at: Timestamp,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub selected_marker_indexes: MarkerSelectionSet,
}

/// DTO for partially updating a catch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCatch {
    pub spot_id: Option<DbId>,
    pub species: Option<String>,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub caught_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub selected_marker_indexes: Option<MarkerSelectionSet>,
}
