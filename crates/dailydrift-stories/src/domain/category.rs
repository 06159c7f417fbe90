//! Categories that editors file story sets under.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A named category. Story sets reference categories by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique slug derived from the name.
    pub slug: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
