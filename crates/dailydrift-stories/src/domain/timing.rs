//! Per-story duration resolution.

use std::time::Duration;

use serde::Deserialize;

use super::story::{Story, StoryKind};

/// Tuning knobs for the playback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Cadence of the recurring progress tick.
    pub tick_interval: Duration,
    /// Minimum horizontal drag, in logical pixels, that counts as a swipe.
    pub swipe_threshold: f64,
    /// Window used when a story's nominal duration is unusable.
    pub default_duration: Duration,
    /// Shortest window any story is shown for.
    pub min_duration: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            swipe_threshold: 50.0,
            default_duration: Duration::from_secs(3),
            min_duration: Duration::from_secs(1),
        }
    }
}

/// Outcome of resolving how long a story should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedDuration {
    /// The countdown can start with this window.
    Known(Duration),
    /// A video whose metadata has not arrived; the countdown waits.
    Pending,
}

impl PlaybackConfig {
    /// Converts a nominal duration in seconds into a playable window.
    ///
    /// Zero, negative, non-finite and unrepresentably large values fall
    /// back to `default_duration`; anything shorter than `min_duration` is
    /// raised to it.
    #[must_use]
    pub fn nominal_window(&self, seconds: f64) -> Duration {
        if seconds <= 0.0 {
            return self.default_duration.max(self.min_duration);
        }
        Duration::try_from_secs_f64(seconds)
            .unwrap_or(self.default_duration)
            .max(self.min_duration)
    }

    /// Converts a media element's intrinsic duration into a window.
    ///
    /// Returns `None` for values a media element reports before it knows
    /// the real length (NaN, infinity, zero) and for values too large to
    /// represent.
    #[must_use]
    pub fn intrinsic_window(&self, seconds: f64) -> Option<Duration> {
        if seconds <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(seconds)
            .ok()
            .map(|window| window.max(self.min_duration))
    }

    /// Resolves the window for `story` given whatever the media surface
    /// currently reports.
    #[must_use]
    pub fn resolve(&self, story: &Story, media_seconds: Option<f64>) -> ResolvedDuration {
        match story.kind {
            StoryKind::Image => ResolvedDuration::Known(self.nominal_window(f64::from(story.duration))),
            StoryKind::Video => match media_seconds.and_then(|s| self.intrinsic_window(s)) {
                Some(window) => ResolvedDuration::Known(window),
                None => ResolvedDuration::Pending,
            },
        }
    }
}
