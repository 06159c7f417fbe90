//! Daily Drift API server entry point.

use std::sync::Arc;

use dailydrift_api::config::{Config, StoreBackend};
use dailydrift_api::error::AppError;
use dailydrift_api::state::AppState;
use dailydrift_core::clock::SystemClock;
use dailydrift_stories::application::memory::InMemoryStorySetRepository;
use dailydrift_stories::application::repository::StorySetRepository;
use dailydrift_store::pg_story_set_repository::PgStorySetRepository;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

async fn story_set_store(config: &Config) -> Result<Arc<dyn StorySetRepository>, AppError> {
    match (config.store, config.database_url.as_deref()) {
        (StoreBackend::Memory, _) => {
            tracing::warn!("using in-memory story set store; data is lost on restart");
            Ok(Arc::new(InMemoryStorySetRepository::new()))
        }
        (StoreBackend::Postgres, Some(database_url)) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;
            sqlx::migrate!("../../migrations").run(&pool).await?;
            Ok(Arc::new(PgStorySetRepository::new(pool)))
        }
        (StoreBackend::Postgres, None) => Err(AppError::Config(
            "DATABASE_URL environment variable must be set".to_string(),
        )),
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Daily Drift API server");

    let config = Config::from_env()?;
    let addr = config.bind_addr()?;

    let app_state = AppState::new(Arc::new(SystemClock), story_set_store(&config).await?);

    // TODO: Replace CorsLayer::permissive() with the dashboard and site origins.
    let app = dailydrift_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
