//! Route definitions for spots.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::spots;
use crate::state::AppState;

/// Spot routes mounted at `/spots`.
///
/// ```text
/// GET    /               -> list_spots
/// POST   /               -> create_spot
/// GET    /{id}           -> get_spot
/// PUT    /{id}           -> update_spot
/// DELETE /{id}           -> delete_spot
/// PUT    /{id}/favorite  -> set_favorite
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(spots::list_spots).post(spots::create_spot))
        .route(
            "/{id}",
            get(spots::get_spot)
                .put(spots::update_spot)
                .delete(spots::delete_spot),
        )
        .route("/{id}/favorite", put(spots::set_favorite))
}
