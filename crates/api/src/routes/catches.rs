use axum::routing::get;
use axum::Router;

use crate::handlers::catches;
use crate::state::AppState;

/// Catch routes mounted at `/catches`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(catches::list_catches).post(catches::create_catch))
        .route(
            "/{id}",
            get(catches::get_catch)
                .put(catches::update_catch)
                .delete(catches::delete_catch),
        )
}
