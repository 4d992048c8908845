//! HTTP route handlers.

pub mod feedback;
pub mod report;
pub mod upload;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

/// Build the main Axum router with all routes.
pub fn build_router(state: SharedState) -> Router {
    let uploads = ServeDir::new(&state.config.data_paths.uploads);
    Router::new()
        .merge(upload::routes(state.config.max_upload_bytes))
        .merge(report::routes())
        .merge(feedback::routes())
        .nest_service("/uploads", uploads)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
