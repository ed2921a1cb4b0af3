pub mod documents;
pub mod health;
pub mod uploads;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::middleware;
use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config().upload_max_bytes;
    Router::new()
        .merge(health::routes())
        .merge(documents::routes())
        .merge(uploads::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::body_limit::body_limit_layer(body_limit))
        .with_state(state)
}
