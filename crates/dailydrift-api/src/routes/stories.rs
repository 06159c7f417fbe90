//! Routes for the Stories bounded context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use dailydrift_stories::application::query_handlers::{self, StorySetPlaybackView};
use dailydrift_stories::application::command_handlers;
use dailydrift_stories::domain::commands;
use dailydrift_stories::domain::editorial::StorySetEdit;
use dailydrift_stories::domain::story::StorySetSummary;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for POST /.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    /// Identifier of the new story set.
    pub id: Uuid,
    /// Slug generated from the title.
    pub slug: String,
}

/// Response body for PUT /{id}.
#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    /// Identifier of the edited story set.
    pub id: Uuid,
    /// Title after the edit.
    pub title: String,
    /// Slug regenerated from the title.
    pub slug: String,
}

/// GET /
#[instrument(skip(state))]
async fn list_story_sets(
    State(state): State<AppState>,
) -> Result<Json<Vec<StorySetSummary>>, ApiError> {
    let sets = query_handlers::list_public_story_sets(&*state.story_sets).await?;
    Ok(Json(sets))
}

/// GET /{slug}
#[instrument(skip(state))]
async fn get_story_set(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<StorySetPlaybackView>, ApiError> {
    let view = query_handlers::get_story_set_for_playback(&slug, &*state.story_sets).await?;
    Ok(Json(view))
}

/// POST /
#[instrument(skip(state, request), fields(title = %request.title))]
async fn create_story_set(
    State(state): State<AppState>,
    Json(request): Json<StorySetEdit>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let command = commands::CreateStorySet {
        correlation_id: Uuid::new_v4(),
        edit: request,
    };

    info!(correlation_id = %command.correlation_id, "handling create_story_set command");

    let summary = command_handlers::handle_create_story_set(
        &command,
        state.clock.as_ref(),
        &*state.story_sets,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: summary.id,
            slug: summary.slug,
        }),
    ))
}

/// PUT /{id}
#[instrument(skip(state, request), fields(story_set_id = %id))]
async fn update_story_set(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StorySetEdit>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let command = commands::UpdateStorySet {
        correlation_id: Uuid::new_v4(),
        story_set_id: id,
        edit: request,
    };

    info!(correlation_id = %command.correlation_id, "handling update_story_set command");

    let summary = command_handlers::handle_update_story_set(
        &command,
        state.clock.as_ref(),
        &*state.story_sets,
    )
    .await?;

    Ok(Json(UpdatedResponse {
        id: summary.id,
        title: summary.title,
        slug: summary.slug,
    }))
}

/// DELETE /{id}
#[instrument(skip(state), fields(story_set_id = %id))]
async fn delete_story_set(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = commands::DeleteStorySet {
        correlation_id: Uuid::new_v4(),
        story_set_id: id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_story_set command");

    command_handlers::handle_delete_story_set(&command, &*state.story_sets).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for the stories context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_story_sets).post(create_story_set))
        .route(
            "/{key}",
            get(get_story_set)
                .put(update_story_set)
                .delete(delete_story_set),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{DateTime, Utc};
    use dailydrift_core::error::DomainError;
    use dailydrift_stories::application::memory::InMemoryStorySetRepository;
    use dailydrift_stories::application::repository::{NewStorySet, StorySetRepository};
    use dailydrift_stories::domain::category::Category;
    use dailydrift_stories::domain::story::StorySet;
    use dailydrift_test_support::{FixedClock, fixed_now};
    use serde_json::Value;
    use tower::ServiceExt;

    /// Repository whose every call fails as if the database were down.
    struct FailingStorySetRepository;

    fn down() -> DomainError {
        DomainError::Infrastructure("connection refused".into())
    }

    #[async_trait]
    impl StorySetRepository for FailingStorySetRepository {
        async fn find_by_slug(&self, _slug: &str) -> Result<Option<StorySet>, DomainError> {
            Err(down())
        }

        async fn list_playable(&self) -> Result<Vec<StorySetSummary>, DomainError> {
            Err(down())
        }

        async fn list_public(&self) -> Result<Vec<StorySetSummary>, DomainError> {
            Err(down())
        }

        async fn create(&self, _set: NewStorySet) -> Result<StorySetSummary, DomainError> {
            Err(down())
        }

        async fn apply_edit(
            &self,
            _id: Uuid,
            _slug: &str,
            _edit: &StorySetEdit,
            _at: DateTime<Utc>,
        ) -> Result<StorySetSummary, DomainError> {
            Err(down())
        }

        async fn soft_delete(&self, _id: Uuid) -> Result<(), DomainError> {
            Err(down())
        }

        async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
            Err(down())
        }

        async fn create_category(&self, _category: Category) -> Result<Category, DomainError> {
            Err(down())
        }
    }

    const CATEGORY: Uuid = Uuid::from_u128(0x0c47);

    fn repo() -> InMemoryStorySetRepository {
        InMemoryStorySetRepository::with_categories(vec![Category {
            id: CATEGORY,
            name: "World".into(),
            slug: "world".into(),
            created_at: fixed_now(),
        }])
    }

    fn app_state_with(story_sets: Arc<dyn StorySetRepository>) -> AppState {
        AppState::new(Arc::new(FixedClock(fixed_now())), story_sets)
    }

    fn edit_body(title: &str) -> Value {
        serde_json::json!({
            "title": title,
            "thumbnail": "https://cdn.example.com/t.jpg",
            "categories": [CATEGORY],
            "tags": ["daily"],
            "storiesToCreate": [
                { "mediaUrl": "https://cdn.example.com/1.jpg", "type": "IMAGE", "duration": 5 }
            ]
        })
    }

    fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_story_set_returns_201_with_slug() {
        // Arrange
        let app = router().with_state(app_state_with(Arc::new(repo())));

        // Act
        let response = app
            .oneshot(json_request("POST", "/", &edit_body("Good Morning")))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["slug"], "good-morning");
        assert!(json["id"].as_str().and_then(|s| Uuid::parse_str(s).ok()).is_some());
    }

    #[tokio::test]
    async fn test_create_story_set_with_blank_title_returns_400() {
        let app = router().with_state(app_state_with(Arc::new(repo())));

        let response = app
            .oneshot(json_request("POST", "/", &edit_body("   ")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_get_story_set_returns_404_for_unknown_slug() {
        let app = router().with_state(app_state_with(Arc::new(repo())));
        let request = Request::builder()
            .uri("/missing")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "not_found");
    }

    #[tokio::test]
    async fn test_list_story_sets_returns_500_when_store_is_down() {
        // Arrange
        let app = router().with_state(app_state_with(Arc::new(FailingStorySetRepository)));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "infrastructure_error");
        assert!(json["message"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_delete_story_set_returns_204() {
        let repo = Arc::new(repo());
        let created = repo
            .create(NewStorySet {
                id: Uuid::new_v4(),
                slug: "doomed".into(),
                created_at: fixed_now(),
                edit: serde_json::from_value(edit_body("Doomed")).unwrap(),
            })
            .await
            .unwrap();
        let app = router().with_state(app_state_with(repo.clone()));
        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/{}", created.id))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(repo.find_by_slug("doomed").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_story_set_returns_404_for_unknown_id() {
        let app = router().with_state(app_state_with(Arc::new(repo())));

        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/{}", Uuid::new_v4()),
                &edit_body("Anything"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
