pub mod catches;
pub mod events;
pub mod health;
pub mod spots;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /spots                     list, create
/// /spots/{id}                get, update, delete
/// /spots/{id}/favorite       set favorite flag (PUT)
///
/// /events                    list, create
/// /events/{id}               get, update, delete
///
/// /catches                   list, create
/// /catches/{id}              get, update, delete
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/spots", spots::router())
        .nest("/events", events::router())
        .nest("/catches", catches::router())
}
