//! Query handlers for the Stories context.
//!
//! This module contains query handlers that load story sets and return
//! read-only view DTOs.

use dailydrift_core::error::DomainError;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::application::repository::StorySetRepository;
use crate::domain::adjacency::Neighbours;
use crate::domain::category::Category;
use crate::domain::story::{Story, StorySetSummary};

/// Everything the player needs to play a set and hand off at its edges.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySetPlaybackView {
    /// The story set identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Thumbnail reference.
    pub thumbnail: String,
    /// Live stories, in play order.
    pub stories: Vec<Story>,
    /// Slug of the preceding playable set.
    pub prev_slug: Option<String>,
    /// Slug of the following playable set.
    pub next_slug: Option<String>,
}

/// Loads a playable story set by slug together with its neighbours.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the set does not exist, is deleted,
/// or has no live stories.
#[instrument(skip(repo))]
pub async fn get_story_set_for_playback(
    slug: &str,
    repo: &dyn StorySetRepository,
) -> Result<StorySetPlaybackView, DomainError> {
    let set = repo
        .find_by_slug(slug)
        .await?
        .filter(|set| !set.stories.is_empty())
        .ok_or_else(|| DomainError::not_found("story set", slug))?;

    let ordered = repo.list_playable().await?;
    let neighbours = Neighbours::of(&set.slug, &ordered);

    Ok(StorySetPlaybackView {
        id: set.id,
        title: set.title,
        slug: set.slug,
        thumbnail: set.thumbnail,
        stories: set.stories,
        prev_slug: neighbours.prev_slug,
        next_slug: neighbours.next_slug,
    })
}

/// Lists public story sets for the home page slider.
///
/// # Errors
///
/// Returns whatever the repository reports.
#[instrument(skip(repo))]
pub async fn list_public_story_sets(
    repo: &dyn StorySetRepository,
) -> Result<Vec<StorySetSummary>, DomainError> {
    repo.list_public().await
}

/// Lists every category for the editor's picker.
///
/// # Errors
///
/// Returns whatever the repository reports.
#[instrument(skip(repo))]
pub async fn list_categories(repo: &dyn StorySetRepository) -> Result<Vec<Category>, DomainError> {
    repo.list_categories().await
}
