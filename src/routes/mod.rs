pub mod health;
pub mod progress;
pub mod reviews;
pub mod stats;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::middleware::request_id;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/reviews", reviews::router())
        .nest("/progress", progress::router())
        .nest("/stats", stats::router())
        .layer(DefaultBodyLimit::max(state.config().body_limit_bytes));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}
