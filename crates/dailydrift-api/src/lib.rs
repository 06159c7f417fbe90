//! Daily Drift: HTTP API.
//!
//! Serves story sets to the player and accepts editorial changes from the
//! dashboard.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router. `main.rs` adds the HTTP layers on top.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/stories", routes::stories::router())
        .nest("/api/v1/categories", routes::categories::router())
        .with_state(state)
}
