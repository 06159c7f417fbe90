//! In-memory `StorySetRepository` for local runs and tests.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dailydrift_core::error::DomainError;
use uuid::Uuid;

use super::repository::{NewStorySet, StorySetRepository};
use crate::domain::category::Category;
use crate::domain::editorial::{ReconcilePlan, StoryContent, StorySetEdit, plan_creation, plan_reconciliation};
use crate::domain::story::{Story, StorySet, StorySetSummary};

#[derive(Debug, Clone)]
struct SetRow {
    id: Uuid,
    title: String,
    slug: String,
    thumbnail: String,
    is_public: bool,
    is_deleted: bool,
    author_id: Option<Uuid>,
    categories: Vec<Uuid>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
}

impl SetRow {
    fn summary(&self) -> StorySetSummary {
        StorySetSummary {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            thumbnail: self.thumbnail.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
struct StoryRow {
    id: Uuid,
    set_id: Uuid,
    position: i32,
    content: StoryContent,
    is_deleted: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    sets: Vec<SetRow>,
    stories: Vec<StoryRow>,
    categories: Vec<Category>,
}

impl Tables {
    fn ensure_categories_exist(&self, ids: &[Uuid]) -> Result<(), DomainError> {
        match ids
            .iter()
            .find(|id| !self.categories.iter().any(|c| c.id == **id))
        {
            Some(missing) => Err(DomainError::Validation(format!(
                "category {missing} does not exist"
            ))),
            None => Ok(()),
        }
    }

    fn live_stories(&self, set_id: Uuid) -> Vec<&StoryRow> {
        let mut rows: Vec<&StoryRow> = self
            .stories
            .iter()
            .filter(|s| s.set_id == set_id && !s.is_deleted)
            .collect();
        rows.sort_by_key(|s| (s.position, s.created_at, s.id));
        rows
    }

    fn ensure_slug_free(&self, slug: &str, except: Option<Uuid>) -> Result<(), DomainError> {
        let taken = self
            .sets
            .iter()
            .any(|s| !s.is_deleted && s.slug == slug && Some(s.id) != except);
        if taken {
            return Err(DomainError::Conflict(format!(
                "a story set with slug '{slug}' already exists"
            )));
        }
        Ok(())
    }

    fn apply_plan(&mut self, set_id: Uuid, plan: ReconcilePlan, at: DateTime<Utc>) {
        self.stories
            .retain(|s| !(s.set_id == set_id && plan.delete.contains(&s.id)));

        for update in plan.update {
            if let Some(row) = self.stories.iter_mut().find(|s| s.id == update.id) {
                row.position = update.position;
                row.content = update.content;
            }
        }
        for insert in plan.create {
            self.stories.push(StoryRow {
                id: Uuid::new_v4(),
                set_id,
                position: insert.position,
                content: insert.content,
                is_deleted: false,
                created_at: at,
            });
        }
        for connect in plan.connect {
            if let Some(row) = self
                .stories
                .iter_mut()
                .find(|s| s.id == connect.id && s.set_id != set_id)
            {
                row.set_id = set_id;
                row.position = connect.position;
            }
        }
    }
}

/// A `StorySetRepository` that keeps everything in process memory.
///
/// Each operation holds one lock for its whole duration, which gives the
/// same all-or-nothing behaviour as a database transaction.
#[derive(Debug, Default)]
pub struct InMemoryStorySetRepository {
    tables: Mutex<Tables>,
}

impl InMemoryStorySetRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository that already knows `categories`.
    #[must_use]
    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                categories,
                ..Tables::default()
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, DomainError> {
        self.tables
            .lock()
            .map_err(|_| DomainError::Infrastructure("story set store lock poisoned".to_owned()))
    }
}

#[async_trait]
impl StorySetRepository for InMemoryStorySetRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<StorySet>, DomainError> {
        let tables = self.lock()?;
        let Some(set) = tables.sets.iter().find(|s| s.slug == slug && !s.is_deleted) else {
            return Ok(None);
        };
        let stories = tables
            .live_stories(set.id)
            .into_iter()
            .map(|row| Story {
                id: row.id,
                media_url: row.content.media_url.clone(),
                kind: row.content.kind,
                caption: row.content.caption.clone(),
                duration: row.content.duration,
            })
            .collect();
        Ok(Some(StorySet {
            id: set.id,
            title: set.title.clone(),
            slug: set.slug.clone(),
            thumbnail: set.thumbnail.clone(),
            is_public: set.is_public,
            author_id: set.author_id,
            category_ids: set.categories.clone(),
            tags: set.tags.clone(),
            created_at: set.created_at,
            stories,
        }))
    }

    async fn list_playable(&self) -> Result<Vec<StorySetSummary>, DomainError> {
        let tables = self.lock()?;
        let mut sets: Vec<&SetRow> = tables
            .sets
            .iter()
            .filter(|s| !s.is_deleted && !tables.live_stories(s.id).is_empty())
            .collect();
        sets.sort_by_key(|s| (s.created_at, s.id));
        Ok(sets.into_iter().map(SetRow::summary).collect())
    }

    async fn list_public(&self) -> Result<Vec<StorySetSummary>, DomainError> {
        let tables = self.lock()?;
        let mut sets: Vec<&SetRow> = tables
            .sets
            .iter()
            .filter(|s| !s.is_deleted && s.is_public)
            .collect();
        sets.sort_by_key(|s| (s.created_at, s.id));
        Ok(sets.into_iter().map(SetRow::summary).collect())
    }

    async fn create(&self, set: NewStorySet) -> Result<StorySetSummary, DomainError> {
        let plan = plan_creation(&set.edit)?;
        let mut tables = self.lock()?;
        tables.ensure_slug_free(&set.slug, None)?;
        tables.ensure_categories_exist(&set.edit.categories)?;

        let row = SetRow {
            id: set.id,
            title: set.edit.title.trim().to_owned(),
            slug: set.slug,
            thumbnail: set.edit.thumbnail.clone(),
            is_public: set.edit.is_public,
            is_deleted: false,
            author_id: set.edit.author_id,
            categories: set.edit.categories.clone(),
            tags: set.edit.normalized_tags(),
            created_at: set.created_at,
        };
        let summary = row.summary();
        tables.sets.push(row);
        tables.apply_plan(set.id, plan, set.created_at);
        Ok(summary)
    }

    async fn apply_edit(
        &self,
        id: Uuid,
        slug: &str,
        edit: &StorySetEdit,
        at: DateTime<Utc>,
    ) -> Result<StorySetSummary, DomainError> {
        let mut tables = self.lock()?;
        if !tables.sets.iter().any(|s| s.id == id && !s.is_deleted) {
            return Err(DomainError::not_found("story set", id));
        }
        let existing: Vec<Uuid> = tables
            .stories
            .iter()
            .filter(|s| s.set_id == id)
            .map(|s| s.id)
            .collect();
        let plan = plan_reconciliation(&existing, edit)?;
        tables.ensure_slug_free(slug, Some(id))?;
        tables.ensure_categories_exist(&edit.categories)?;

        let summary = {
            let row = tables
                .sets
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| DomainError::not_found("story set", id))?;
            row.title = edit.title.trim().to_owned();
            row.slug = slug.to_owned();
            row.thumbnail.clone_from(&edit.thumbnail);
            row.is_public = edit.is_public;
            if edit.author_id.is_some() {
                row.author_id = edit.author_id;
            }
            row.categories.clone_from(&edit.categories);
            row.tags = edit.normalized_tags();
            row.summary()
        };
        tables.apply_plan(id, plan, at);
        Ok(summary)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.lock()?;
        let row = tables
            .sets
            .iter_mut()
            .find(|s| s.id == id && !s.is_deleted)
            .ok_or_else(|| DomainError::not_found("story set", id))?;
        row.is_deleted = true;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let tables = self.lock()?;
        let mut categories = tables.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn create_category(&self, category: Category) -> Result<Category, DomainError> {
        let mut tables = self.lock()?;
        if tables.categories.iter().any(|c| c.slug == category.slug) {
            return Err(DomainError::Conflict(format!(
                "a category with slug '{}' already exists",
                category.slug
            )));
        }
        tables.categories.push(category.clone());
        Ok(category)
    }
}
