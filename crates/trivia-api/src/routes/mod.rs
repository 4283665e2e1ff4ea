//! Route modules and the assembled API router.

use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod quiz;

/// Builds the full route tree, without middleware layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/quiz", quiz::router())
}
