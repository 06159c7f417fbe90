//! Shared application state.

use std::sync::Arc;

use dailydrift_core::clock::Clock;
use dailydrift_stories::application::repository::StorySetRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of creation and edit timestamps.
    pub clock: Arc<dyn Clock>,
    /// Story set persistence.
    pub story_sets: Arc<dyn StorySetRepository>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, story_sets: Arc<dyn StorySetRepository>) -> Self {
        Self { clock, story_sets }
    }
}
