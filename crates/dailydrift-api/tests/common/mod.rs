//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dailydrift_core::clock::Clock;
use dailydrift_stories::application::memory::InMemoryStorySetRepository;
use dailydrift_stories::application::repository::StorySetRepository;
use dailydrift_store::pg_story_set_repository::PgStorySetRepository;
use dailydrift_test_support::{FixedClock, ManualClock, fixed_now};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use dailydrift_api::state::AppState;

fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(fixed_now()))
}

/// Build the full app router on an in-memory store.
pub fn build_memory_app() -> Router {
    dailydrift_api::app(AppState::new(
        fixed_clock(),
        Arc::new(InMemoryStorySetRepository::new()),
    ))
}

/// Build the full app router on an in-memory store with a clock the test
/// advances, so sets created one after another get distinct timestamps.
pub fn build_memory_app_with_clock(clock: Arc<ManualClock>) -> Router {
    let story_sets: Arc<dyn StorySetRepository> = Arc::new(InMemoryStorySetRepository::new());
    dailydrift_api::app(AppState::new(clock, story_sets))
}

/// Build the full app router on a real `PgStorySetRepository`.
pub fn build_test_app(pool: PgPool) -> Router {
    dailydrift_api::app(AppState::new(
        fixed_clock(),
        Arc::new(PgStorySetRepository::new(pool)),
    ))
}

/// Create a category through the API and return its id.
pub async fn create_category(app: Router, name: &str) -> uuid::Uuid {
    let (status, json) =
        post_json(app, "/api/v1/categories", &serde_json::json!({ "name": name })).await;
    assert_eq!(status, StatusCode::CREATED, "category create failed: {json}");
    json["id"].as_str().unwrap().parse().unwrap()
}

/// A valid editorial body with one image story per url.
pub fn edit_body(title: &str, category: uuid::Uuid, urls: &[&str]) -> serde_json::Value {
    let stories: Vec<serde_json::Value> = urls
        .iter()
        .map(|url| serde_json::json!({ "mediaUrl": url, "type": "IMAGE", "duration": 4 }))
        .collect();
    serde_json::json!({
        "title": title,
        "thumbnail": "https://cdn.example.com/thumb.jpg",
        "categories": [category],
        "tags": ["morning"],
        "storiesToCreate": stories,
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a request with a JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, body).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a DELETE request and return the status.
pub async fn delete(app: Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await.0
}
