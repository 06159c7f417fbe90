//! Command handlers for the Stories context.
//!
//! Handlers validate the submitted edit, derive the slug, and hand the
//! row-level work to a `StorySetRepository` that applies it atomically.

use dailydrift_core::clock::Clock;
use dailydrift_core::command::Command;
use dailydrift_core::error::DomainError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::repository::{NewStorySet, StorySetRepository};
use crate::domain::category::Category;
use crate::domain::commands::{CreateCategory, CreateStorySet, DeleteStorySet, UpdateStorySet};
use crate::domain::slug::generate_slug;
use crate::domain::story::StorySetSummary;

fn slug_for(title: &str) -> Result<String, DomainError> {
    let slug = generate_slug(title);
    if slug.is_empty() {
        return Err(DomainError::Validation(format!(
            "title '{title}' does not produce a usable slug"
        )));
    }
    Ok(slug)
}

/// Handles the `CreateStorySet` command: validates the edit, generates the
/// identifier and slug, and persists the set with its stories.
///
/// This is a creation command: the handler generates the `story_set_id`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an invalid edit,
/// `DomainError::Conflict` if the slug is taken, or whatever the
/// repository reports.
#[instrument(skip_all, fields(command = command.command_type(), correlation_id = %command.correlation_id))]
pub async fn handle_create_story_set(
    command: &CreateStorySet,
    clock: &dyn Clock,
    repo: &dyn StorySetRepository,
) -> Result<StorySetSummary, DomainError> {
    command.edit.validate()?;
    let slug = slug_for(&command.edit.title)?;

    let summary = repo
        .create(NewStorySet {
            id: Uuid::new_v4(),
            slug,
            created_at: clock.now(),
            edit: command.edit.clone(),
        })
        .await?;

    info!(story_set_id = %summary.id, slug = %summary.slug, "story set created");
    Ok(summary)
}

/// Handles the `UpdateStorySet` command: reconciles the stored set with the
/// submitted edit in one repository transaction.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the set does not exist,
/// `DomainError::Validation` for an invalid edit, or whatever the
/// repository reports.
#[instrument(skip_all, fields(command = command.command_type(), correlation_id = %command.correlation_id, story_set_id = %command.story_set_id))]
pub async fn handle_update_story_set(
    command: &UpdateStorySet,
    clock: &dyn Clock,
    repo: &dyn StorySetRepository,
) -> Result<StorySetSummary, DomainError> {
    command.edit.validate()?;
    let slug = slug_for(&command.edit.title)?;

    let summary = repo
        .apply_edit(command.story_set_id, &slug, &command.edit, clock.now())
        .await?;

    info!(slug = %summary.slug, "story set updated");
    Ok(summary)
}

/// Handles the `DeleteStorySet` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the set does not exist.
#[instrument(skip_all, fields(command = command.command_type(), correlation_id = %command.correlation_id, story_set_id = %command.story_set_id))]
pub async fn handle_delete_story_set(
    command: &DeleteStorySet,
    repo: &dyn StorySetRepository,
) -> Result<(), DomainError> {
    repo.soft_delete(command.story_set_id).await?;
    info!("story set deleted");
    Ok(())
}

/// Handles the `CreateCategory` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name or one without a
/// usable slug, and `DomainError::Conflict` if the slug is taken.
#[instrument(skip_all, fields(command = command.command_type(), correlation_id = %command.correlation_id))]
pub async fn handle_create_category(
    command: &CreateCategory,
    clock: &dyn Clock,
    repo: &dyn StorySetRepository,
) -> Result<Category, DomainError> {
    let name = command.name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("category name is required".to_owned()));
    }
    let slug = generate_slug(name);
    if slug.is_empty() {
        return Err(DomainError::Validation(format!(
            "category name '{name}' does not produce a usable slug"
        )));
    }

    let category = repo
        .create_category(Category {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            slug,
            created_at: clock.now(),
        })
        .await?;

    info!(category_id = %category.id, slug = %category.slug, "category created");
    Ok(category)
}
