//! Story and story-set models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of media a story plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoryKind {
    /// A still image shown for its nominal duration.
    Image,
    /// A video whose intrinsic length drives the countdown once known.
    Video,
}

impl StoryKind {
    /// Returns the persisted representation of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
        }
    }

    /// Parses the persisted representation of a kind.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "IMAGE" => Some(Self::Image),
            "VIDEO" => Some(Self::Video),
            _ => None,
        }
    }
}

/// One playable slide within a story set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Story identifier.
    pub id: Uuid,
    /// Location of the image or video.
    pub media_url: String,
    /// Media kind.
    #[serde(rename = "type")]
    pub kind: StoryKind,
    /// Optional caption shown over the media.
    pub caption: Option<String>,
    /// Nominal display duration in seconds.
    pub duration: i32,
}

/// An ordered, named collection of stories played as one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySet {
    /// Story set identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// URL slug derived from the title.
    pub slug: String,
    /// Thumbnail reference.
    pub thumbnail: String,
    /// Whether the set appears in public listings.
    pub is_public: bool,
    /// Author the set is attributed to.
    pub author_id: Option<Uuid>,
    /// Categories the set is filed under.
    pub category_ids: Vec<Uuid>,
    /// Tag names.
    pub tags: Vec<String>,
    /// Creation timestamp; orders sets for adjacency.
    pub created_at: DateTime<Utc>,
    /// Live stories in play order.
    pub stories: Vec<Story>,
}

/// Listing view of a story set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySetSummary {
    /// Story set identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Thumbnail reference.
    pub thumbnail: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&StorySet> for StorySetSummary {
    fn from(set: &StorySet) -> Self {
        Self {
            id: set.id,
            title: set.title.clone(),
            slug: set.slug.clone(),
            thumbnail: set.thumbnail.clone(),
            created_at: set.created_at,
        }
    }
}
