//! Routes for story set categories.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use dailydrift_stories::application::{command_handlers, query_handlers};
use dailydrift_stories::domain::category::Category;
use dailydrift_stories::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// Display name; the slug is derived from it.
    pub name: String,
}

/// GET /
#[instrument(skip(state))]
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = query_handlers::list_categories(&*state.story_sets).await?;
    Ok(Json(categories))
}

/// POST /
#[instrument(skip(state, request), fields(name = %request.name))]
async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let command = commands::CreateCategory {
        correlation_id: Uuid::new_v4(),
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling create_category command");

    let category =
        command_handlers::handle_create_category(&command, state.clock.as_ref(), &*state.story_sets)
            .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Returns the router for categories.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories).post(create_category))
}
