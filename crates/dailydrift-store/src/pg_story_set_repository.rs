//! `PostgreSQL` implementation of the `StorySetRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use dailydrift_core::error::DomainError;
use dailydrift_stories::application::repository::{NewStorySet, StorySetRepository};
use dailydrift_stories::domain::category::Category;
use dailydrift_stories::domain::editorial::{
    ReconcilePlan, StorySetEdit, plan_creation, plan_reconciliation,
};
use dailydrift_stories::domain::story::{Story, StoryKind, StorySet, StorySetSummary};

#[derive(Debug, FromRow)]
struct StorySetRow {
    id: Uuid,
    title: String,
    slug: String,
    thumbnail: String,
    is_public: bool,
    author_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    id: Uuid,
    title: String,
    slug: String,
    thumbnail: String,
    created_at: DateTime<Utc>,
}

impl From<SummaryRow> for StorySetSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            thumbnail: row.thumbnail,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct StoryRow {
    id: Uuid,
    media_url: String,
    kind: String,
    caption: Option<String>,
    duration: i32,
}

impl TryFrom<StoryRow> for Story {
    type Error = DomainError;

    fn try_from(row: StoryRow) -> Result<Self, Self::Error> {
        let kind = StoryKind::parse(&row.kind).ok_or_else(|| {
            DomainError::Infrastructure(format!("story {} has unknown kind '{}'", row.id, row.kind))
        })?;
        Ok(Self {
            id: row.id,
            media_url: row.media_url,
            kind,
            caption: row.caption,
            duration: row.duration,
        })
    }
}

fn map_sqlx_error(error: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            return DomainError::Conflict(format!(
                "a row with that slug already exists: {}",
                db.message()
            ));
        }
        if db.is_foreign_key_violation() {
            return DomainError::Validation(format!(
                "edit references a row that does not exist: {}",
                db.message()
            ));
        }
    }
    DomainError::Infrastructure(error.to_string())
}

/// PostgreSQL-backed story set repository.
#[derive(Debug, Clone)]
pub struct PgStorySetRepository {
    pool: PgPool,
}

impl PgStorySetRepository {
    /// Creates a new `PgStorySetRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn replace_taxonomy(
    conn: &mut PgConnection,
    set_id: Uuid,
    edit: &StorySetEdit,
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM story_set_categories WHERE story_set_id = $1")
        .bind(set_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    for category_id in &edit.categories {
        sqlx::query(
            "INSERT INTO story_set_categories (story_set_id, category_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(set_id)
        .bind(category_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }

    sqlx::query("DELETE FROM story_set_tags WHERE story_set_id = $1")
        .bind(set_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    for name in edit.normalized_tags() {
        let (tag_id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO tags (id, name) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
        sqlx::query("INSERT INTO story_set_tags (story_set_id, tag_id) VALUES ($1, $2)")
            .bind(set_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }
    Ok(())
}

async fn apply_plan(
    conn: &mut PgConnection,
    set_id: Uuid,
    plan: &ReconcilePlan,
    at: DateTime<Utc>,
) -> Result<(), DomainError> {
    if !plan.delete.is_empty() {
        sqlx::query("DELETE FROM stories WHERE story_set_id = $1 AND id = ANY($2)")
            .bind(set_id)
            .bind(&plan.delete)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    }

    for update in &plan.update {
        sqlx::query(
            "UPDATE stories SET position = $1, media_url = $2, kind = $3, caption = $4, \
             duration = $5 WHERE id = $6 AND story_set_id = $7",
        )
        .bind(update.position)
        .bind(&update.content.media_url)
        .bind(update.content.kind.as_str())
        .bind(&update.content.caption)
        .bind(update.content.duration)
        .bind(update.id)
        .bind(set_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }

    for insert in &plan.create {
        sqlx::query(
            "INSERT INTO stories \
             (id, story_set_id, position, media_url, kind, caption, duration, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Uuid::new_v4())
        .bind(set_id)
        .bind(insert.position)
        .bind(&insert.content.media_url)
        .bind(insert.content.kind.as_str())
        .bind(&insert.content.caption)
        .bind(insert.content.duration)
        .bind(at)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }

    for connect in &plan.connect {
        sqlx::query(
            "UPDATE stories SET story_set_id = $1, position = $2 \
             WHERE id = $3 AND story_set_id <> $1",
        )
        .bind(set_id)
        .bind(connect.position)
        .bind(connect.id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }

    debug!(
        set_id = %set_id,
        deleted = plan.delete.len(),
        updated = plan.update.len(),
        created = plan.create.len(),
        connected = plan.connect.len(),
        "story reconciliation applied"
    );
    Ok(())
}

#[async_trait]
impl StorySetRepository for PgStorySetRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<StorySet>, DomainError> {
        let Some(set) = sqlx::query_as::<_, StorySetRow>(
            "SELECT id, title, slug, thumbnail, is_public, author_id, created_at \
             FROM story_sets WHERE slug = $1 AND NOT is_deleted",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        else {
            return Ok(None);
        };

        let stories = sqlx::query_as::<_, StoryRow>(
            "SELECT id, media_url, kind, caption, duration FROM stories \
             WHERE story_set_id = $1 AND NOT is_deleted \
             ORDER BY position, created_at, id",
        )
        .bind(set.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .into_iter()
        .map(Story::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let category_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT category_id FROM story_set_categories \
             WHERE story_set_id = $1 ORDER BY category_id",
        )
        .bind(set.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let tags: Vec<String> = sqlx::query_scalar(
            "SELECT t.name FROM story_set_tags st JOIN tags t ON t.id = st.tag_id \
             WHERE st.story_set_id = $1 ORDER BY t.name",
        )
        .bind(set.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Some(StorySet {
            id: set.id,
            title: set.title,
            slug: set.slug,
            thumbnail: set.thumbnail,
            is_public: set.is_public,
            author_id: set.author_id,
            category_ids,
            tags,
            created_at: set.created_at,
            stories,
        }))
    }

    async fn list_playable(&self) -> Result<Vec<StorySetSummary>, DomainError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT s.id, s.title, s.slug, s.thumbnail, s.created_at FROM story_sets s \
             WHERE NOT s.is_deleted AND EXISTS ( \
                 SELECT 1 FROM stories st WHERE st.story_set_id = s.id AND NOT st.is_deleted) \
             ORDER BY s.created_at, s.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(StorySetSummary::from).collect())
    }

    async fn list_public(&self) -> Result<Vec<StorySetSummary>, DomainError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT id, title, slug, thumbnail, created_at FROM story_sets \
             WHERE NOT is_deleted AND is_public ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(StorySetSummary::from).collect())
    }

    async fn create(&self, set: NewStorySet) -> Result<StorySetSummary, DomainError> {
        let plan = plan_creation(&set.edit)?;
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, SummaryRow>(
            "INSERT INTO story_sets \
             (id, title, slug, thumbnail, is_public, author_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
             RETURNING id, title, slug, thumbnail, created_at",
        )
        .bind(set.id)
        .bind(set.edit.title.trim())
        .bind(&set.slug)
        .bind(&set.edit.thumbnail)
        .bind(set.edit.is_public)
        .bind(set.edit.author_id)
        .bind(set.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        replace_taxonomy(&mut tx, set.id, &set.edit).await?;
        apply_plan(&mut tx, set.id, &plan, set.created_at).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn apply_edit(
        &self,
        id: Uuid,
        slug: &str,
        edit: &StorySetEdit,
        at: DateTime<Utc>,
    ) -> Result<StorySetSummary, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let locked: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM story_sets WHERE id = $1 AND NOT is_deleted FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        if locked.is_none() {
            return Err(DomainError::not_found("story set", id));
        }

        let existing: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM stories WHERE story_set_id = $1")
            .bind(id)
            .fetch_all(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        let plan = plan_reconciliation(&existing, edit)?;

        let row = sqlx::query_as::<_, SummaryRow>(
            "UPDATE story_sets SET title = $2, slug = $3, thumbnail = $4, is_public = $5, \
             author_id = COALESCE($6, author_id), updated_at = $7 \
             WHERE id = $1 \
             RETURNING id, title, slug, thumbnail, created_at",
        )
        .bind(id)
        .bind(edit.title.trim())
        .bind(slug)
        .bind(&edit.thumbnail)
        .bind(edit.is_public)
        .bind(edit.author_id)
        .bind(at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        replace_taxonomy(&mut tx, id, edit).await?;
        apply_plan(&mut tx, id, &plan, at).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE story_sets SET is_deleted = TRUE WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("story set", id));
        }
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, created_at FROM categories ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn create_category(&self, category: Category) -> Result<Category, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (id, name, slug, created_at) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, slug, created_at",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        debug!(category_id = %row.id, slug = %row.slug, "category inserted");
        Ok(row.into())
    }
}
