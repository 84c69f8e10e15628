//! Handlers for fishing events.
//!
//! An event may pin itself to a subset of a spot's markers through
//! `selectedMarkerIndexes`; the indices are checked against the spot's
//! current marker list on every write.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catchlog_core::error::CoreError;
use catchlog_core::event::validate_event_title;
use catchlog_core::spot::validate_notes;
use catchlog_core::types::DbId;
use catchlog_db::models::event::{CreateEvent, UpdateEvent};
use catchlog_db::repositories::EventRepo;

use super::marker_refs::{check_marker_reference, reference_changed, stored_markers};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

fn event_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Event", id })
}

/// GET /api/events
pub async fn list_events(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let events = EventRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(events))
}

/// GET /api/events/{id}
pub async fn get_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = EventRepo::find_for_user(&state.pool, user.user_id, event_id)
        .await?
        .ok_or_else(|| event_not_found(event_id))?;
    Ok(Json(event))
}

/// POST /api/events
pub async fn create_event(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEvent>,
) -> AppResult<impl IntoResponse> {
    validate_event_title(&input.title)?;
    validate_notes(&input.notes)?;
    let mut tx = state.pool.begin().await?;
    check_marker_reference(
        &mut tx,
        user.user_id,
        input.spot_id,
        &input.selected_marker_indexes,
    )
    .await?;
    let event = EventRepo::create(&mut tx, user.user_id, &input).await?;
    tx.commit().await?;

    tracing::info!(
        event_id = event.id,
        spot_id = ?event.spot_id,
        markers = input.selected_marker_indexes.len(),
        "Event created"
    );

    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/events/{id}
///
/// The marker check runs only when the patch touches `spotId` or
/// `selectedMarkerIndexes`, against the effective spot and selection after the
/// patch. Moving an event to another spot re-validates the indices it
/// already carries.
pub async fn update_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<impl IntoResponse> {
    if let Some(title) = &input.title {
        validate_event_title(title)?;
    }
    if let Some(notes) = &input.notes {
        validate_notes(notes)?;
    }

    let mut tx = state.pool.begin().await?;
    let existing = EventRepo::find_in_tx(&mut tx, user.user_id, event_id)
        .await?
        .ok_or_else(|| event_not_found(event_id))?;

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

    let event = EventRepo::update(&mut tx, user.user_id, event_id, &input)
        .await?
        .ok_or_else(|| event_not_found(event_id))?;
    tx.commit().await?;

    tracing::info!(event_id, "Event updated");

    Ok(Json(event))
}

/// DELETE /api/events/{id}
pub async fn delete_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !EventRepo::delete(&state.pool, user.user_id, event_id).await? {
        return Err(event_not_found(event_id));
    }
    tracing::info!(event_id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}
