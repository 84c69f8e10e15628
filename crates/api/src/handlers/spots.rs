//! Handlers for the spot persistence API.
//!
//! A spot's primary marker and its additional `coordinates` are written
//! together; the editor merges them into one payload on submit.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catchlog_core::error::CoreError;
use catchlog_core::marker::LatLng;
use catchlog_core::spot::{
    validate_coordinates, validate_map_image, validate_notes, validate_spot_name,
};
use catchlog_core::types::DbId;
use catchlog_db::models::spot::{CreateSpot, SetFavorite, UpdateSpot};
use catchlog_db::repositories::SpotRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

fn spot_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Spot", id })
}

fn validate_create(input: &CreateSpot) -> Result<(), CoreError> {
    validate_spot_name(&input.name)?;
    LatLng::new(input.latitude, input.longitude).validate()?;
    validate_coordinates(&input.coordinates)?;
    validate_notes(&input.notes)?;
    if let Some(image) = &input.map_image {
        validate_map_image(image)?;
    }
    Ok(())
}

fn validate_update(input: &UpdateSpot) -> Result<(), CoreError> {
    if let Some(name) = &input.name {
        validate_spot_name(name)?;
    }
    match (input.latitude, input.longitude) {
        (Some(lat), Some(lng)) => LatLng::new(lat, lng).validate()?,
        (None, None) => {}
        _ => {
            return Err(CoreError::Validation(
                "latitude and longitude must be updated together".to_string(),
            ))
        }
    }
    if let Some(coordinates) = &input.coordinates {
        validate_coordinates(coordinates)?;
    }
    if let Some(notes) = &input.notes {
        validate_notes(notes)?;
    }
    if let Some(image) = &input.map_image {
        validate_map_image(image)?;
    }
    Ok(())
}

/// GET /api/spots
pub async fn list_spots(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let spots = SpotRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(spots))
}

/// GET /api/spots/{id}
pub async fn get_spot(
    user: AuthUser,
    State(state): State<AppState>,
    Path(spot_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let spot = SpotRepo::find_for_user(&state.pool, user.user_id, spot_id)
        .await?
        .ok_or_else(|| spot_not_found(spot_id))?;
    Ok(Json(spot))
}

/// POST /api/spots
///
/// The primary marker is required; additional markers are optional.
pub async fn create_spot(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSpot>,
) -> AppResult<impl IntoResponse> {
    validate_create(&input)?;

    let spot = SpotRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        spot_id = spot.id,
        user_id = user.user_id,
        markers = spot.marker_count(),
        has_map_image = spot.map_image_url.is_some(),
        "Spot created"
    );

    Ok((StatusCode::CREATED, Json(spot)))
}

/// PUT /api/spots/{id}
///
/// Partially update a spot. Replacing `coordinates` prunes event and catch
/// references to markers that no longer exist.
pub async fn update_spot(
    user: AuthUser,
    State(state): State<AppState>,
    Path(spot_id): Path<DbId>,
    Json(input): Json<UpdateSpot>,
) -> AppResult<impl IntoResponse> {
    validate_update(&input)?;

    let updated = SpotRepo::update(&state.pool, user.user_id, spot_id, &input)
        .await?
        .ok_or_else(|| spot_not_found(spot_id))?;

    if updated.pruned_references > 0 {
        tracing::warn!(
            spot_id,
            pruned = updated.pruned_references,
            "Pruned marker references to removed markers"
        );
    }
    tracing::info!(spot_id, user_id = user.user_id, "Spot updated");

    Ok(Json(updated.spot))
}

/// PUT /api/spots/{id}/favorite
pub async fn set_favorite(
    user: AuthUser,
    State(state): State<AppState>,
    Path(spot_id): Path<DbId>,
    Json(input): Json<SetFavorite>,
) -> AppResult<impl IntoResponse> {
    let spot = SpotRepo::set_favorite(&state.pool, user.user_id, spot_id, input.is_favorite)
        .await?
        .ok_or_else(|| spot_not_found(spot_id))?;

    tracing::info!(spot_id, is_favorite = input.is_favorite, "Spot favorite flag set");

    Ok(Json(spot))
}

/// DELETE /api/spots/{id}
pub async fn delete_spot(
    user: AuthUser,
    State(state): State<AppState>,
    Path(spot_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !SpotRepo::delete(&state.pool, user.user_id, spot_id).await? {
        return Err(spot_not_found(spot_id));
    }

    tracing::info!(spot_id, user_id = user.user_id, "Spot deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use catchlog_core::marker::Marker;

    use super::*;

    fn create(lat: f64, lng: f64) -> CreateSpot {
        CreateSpot {
            name: "Bay".into(),
            latitude: lat,
            longitude: lng,
            coordinates: vec![Marker::new(1.0, 1.0, "Marker 2")],
            notes: String::new(),
            map_image: None,
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(validate_create(&create(54.5, 26.0)).is_ok());
        assert!(validate_create(&create(154.5, 26.0)).is_err());

        let mut bad_image = create(1.0, 1.0);
        bad_image.map_image = Some("not-a-data-url".into());
        assert!(validate_create(&bad_image).is_err());
    }

    #[test]
    fn test_update_requires_both_coordinates() {
        let half = UpdateSpot {
            latitude: Some(1.0),
            ..Default::default()
        };
        assert!(validate_update(&half).is_err());

        let both = UpdateSpot {
            latitude: Some(1.0),
            longitude: Some(2.0),
            ..Default::default()
        };
        assert!(validate_update(&both).is_ok());
        assert!(validate_update(&UpdateSpot::default()).is_ok());
    }
}
