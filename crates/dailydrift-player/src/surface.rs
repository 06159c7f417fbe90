//! Collaborators the player host drives.

use dailydrift_stories::domain::story::Story;
use thiserror::Error;

/// Failure reported by a media element.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The element refused to start, e.g. because of an autoplay policy.
    #[error("playback rejected: {0}")]
    Rejected(String),
}

/// The element that renders the current story.
pub trait MediaSurface: Send {
    /// Render story `index`.
    fn show(&mut self, index: usize, story: &Story);

    /// Start or resume the active video.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Rejected` when the element refuses to play. The
    /// host ignores the rejection.
    fn play(&mut self) -> Result<(), MediaError>;

    /// Pause the active video.
    fn pause(&mut self);

    /// Mute or unmute the active video.
    fn set_muted(&mut self, muted: bool);
}

/// The routing collaborator that owns neighbouring story sets.
pub trait AdjacentSets: Send {
    /// Whether a following set exists.
    fn has_next(&self) -> bool;

    /// Whether a preceding set exists.
    fn has_prev(&self) -> bool;

    /// Move on to the following set.
    fn advance_past_end(&mut self);

    /// Move back to the preceding set.
    fn retreat_past_start(&mut self);
}
