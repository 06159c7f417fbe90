//! Daily Drift: PostgreSQL persistence.
//!
//! Implements `StorySetRepository` on a `PgPool`. Schema lives in the
//! workspace `migrations/` directory.

pub mod pg_story_set_repository;
