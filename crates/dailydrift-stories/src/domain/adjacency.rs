//! Neighbouring story sets for boundary hand-off.

use serde::Serialize;

use super::story::StorySetSummary;

/// Slugs of the sets before and after a given set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighbours {
    /// Slug of the preceding set.
    pub prev_slug: Option<String>,
    /// Slug of the following set.
    pub next_slug: Option<String>,
}

impl Neighbours {
    /// Finds the neighbours of `slug` in `ordered`, which must already be in
    /// play order. An unknown slug has no neighbours.
    #[must_use]
    pub fn of(slug: &str, ordered: &[StorySetSummary]) -> Self {
        let Some(position) = ordered.iter().position(|s| s.slug == slug) else {
            return Self::default();
        };
        Self {
            prev_slug: position
                .checked_sub(1)
                .and_then(|i| ordered.get(i))
                .map(|s| s.slug.clone()),
            next_slug: ordered.get(position + 1).map(|s| s.slug.clone()),
        }
    }
}
