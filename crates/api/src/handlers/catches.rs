//! Handlers for logged catches.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catchlog_core::catch::{
    validate_measurement, validate_species, MAX_LENGTH_CM, MAX_WEIGHT_KG,
};
use catchlog_core::error::CoreError;
use catchlog_core::spot::validate_notes;
use catchlog_core::types::DbId;
use catchlog_db::models::catch::{CreateCatch, UpdateCatch};
use catchlog_db::repositories::CatchRepo;

use super::marker_refs::{check_marker_reference, reference_changed, stored_markers};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

fn catch_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Catch", id })
}

fn validate_measurements(weight_kg: Option<f64>, length_cm: Option<f64>) -> Result<(), CoreError> {
    validate_measurement("weightKg", weight_kg, MAX_WEIGHT_KG)?;
    validate_measurement("lengthCm", length_cm, MAX_LENGTH_CM)
}

/// GET /api/catches
pub async fn list_catches(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let catches = CatchRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(catches))
}

/// GET /api/catches/{id}
pub async fn get_catch(
    user: AuthUser,
    State(state): State<AppState>,
    Path(catch_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let logged = CatchRepo::find_for_user(&state.pool, user.user_id, catch_id)
        .await?
        .ok_or_else(|| catch_not_found(catch_id))?;
    Ok(Json(logged))
}

/// POST /api/catches
pub async fn create_catch(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCatch>,
) -> AppResult<impl IntoResponse> {
    validate_species(&input.species)?;
    validate_measurements(input.weight_kg, input.length_cm)?;
    validate_notes(&input.notes)?;
    let mut tx = state.pool.begin().await?;
    check_marker_reference(
        &mut tx,
        user.user_id,
        input.spot_id,
        &input.selected_marker_indexes,
    )
    .await?;
    let logged = CatchRepo::create(&mut tx, user.user_id, &input).await?;
    tx.commit().await?;

    tracing::info!(
        catch_id = logged.id,
        spot_id = ?logged.spot_id,
        species = %logged.species,
        "Catch logged"
    );

    Ok((StatusCode::CREATED, Json(logged)))
}

/// PUT /api/catches/{id}
pub async fn update_catch(
    user: AuthUser,
    State(state): State<AppState>,
    Path(catch_id): Path<DbId>,
    Json(input): Json<UpdateCatch>,
) -> AppResult<impl IntoResponse> {
    if let Some(species) = &input.species {
        validate_species(species)?;
    }
    validate_measurements(input.weight_kg, input.length_cm)?;
    if let Some(notes) = &input.notes {
        validate_notes(notes)?;
    }

    let mut tx = state.pool.begin().await?;
    let existing = CatchRepo::find_in_tx(&mut tx, user.user_id, catch_id)
        .await?
        .ok_or_else(|| catch_not_found(catch_id))?;

    if reference_changed(
        existing.spot_id,
        input.spot_id,
        input.selected_marker_indexes.as_ref(),
    ) {
        let spot_id = input.spot_id.or(existing.spot_id);
        let markers = match &input.selected_marker_indexes {
            Some(markers) => markers.clone(),
            None => stored_markers(&existing.selected_marker_indexes)?,
        };
        check_marker_reference(&mut tx, user.user_id, spot_id, &markers).await?;
    }

    let logged = CatchRepo::update(&mut tx, user.user_id, catch_id, &input)
        .await?
        .ok_or_else(|| catch_not_found(catch_id))?;
    tx.commit().await?;

    tracing::info!(catch_id, "Catch updated");

    Ok(Json(logged))
}

/// DELETE /api/catches/{id}
pub async fn delete_catch(
    user: AuthUser,
    State(state): State<AppState>,
    Path(catch_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !CatchRepo::delete(&state.pool, user.user_id, catch_id).await? {
        return Err(catch_not_found(catch_id));
    }
    tracing::info!(catch_id, "Catch deleted");
    Ok(StatusCode::NO_CONTENT)
}
