//! Story-set repository abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dailydrift_core::error::DomainError;
use uuid::Uuid;

use crate::domain::category::Category;
use crate::domain::editorial::StorySetEdit;
use crate::domain::story::{StorySet, StorySetSummary};

/// Everything a repository needs to insert a new story set.
#[derive(Debug, Clone)]
pub struct NewStorySet {
    /// Identifier chosen by the handler.
    pub id: Uuid,
    /// Slug derived from the title.
    pub slug: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// The submitted set.
    pub edit: StorySetEdit,
}

/// Repository trait for loading and editing story sets.
///
/// Implementations must apply `create` and `apply_edit` atomically: either
/// every row change of the edit lands or none does. Both reject category
/// ids that do not exist with `DomainError::Validation`.
#[async_trait]
pub trait StorySetRepository: Send + Sync {
    /// Load a non-deleted set by slug with its live stories in play order.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<StorySet>, DomainError>;

    /// Non-deleted sets with at least one live story, oldest first.
    async fn list_playable(&self) -> Result<Vec<StorySetSummary>, DomainError>;

    /// Non-deleted public sets, oldest first.
    async fn list_public(&self) -> Result<Vec<StorySetSummary>, DomainError>;

    /// Insert a new set, its drafted stories, and reparent connected ones.
    async fn create(&self, set: NewStorySet) -> Result<StorySetSummary, DomainError>;

    /// Reconcile an existing set with `edit` in one transaction.
    ///
    /// Returns `DomainError::NotFound` if the set does not exist or is
    /// deleted.
    async fn apply_edit(
        &self,
        id: Uuid,
        slug: &str,
        edit: &StorySetEdit,
        at: DateTime<Utc>,
    ) -> Result<StorySetSummary, DomainError>;

    /// Mark a set deleted.
    async fn soft_delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// All categories, by name.
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;

    /// Insert a category.
    ///
    /// Returns `DomainError::Conflict` if the slug is taken.
    async fn create_category(&self, category: Category) -> Result<Category, DomainError>;
}
