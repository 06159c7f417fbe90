//! Mapping of raw user input onto playback intents.

use serde::{Deserialize, Serialize};

/// What the user asked the player to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Go to the next story (or hand off to the next set).
    Next,
    /// Go to the previous story (or hand off to the previous set).
    Prev,
    /// Toggle between playing and paused.
    TogglePlayback,
    /// Toggle audio mute.
    ToggleMute,
}

/// Keys the player listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Space bar.
    Space,
    /// Any printable character.
    Char(char),
}

impl Key {
    /// Returns the intent bound to this key, if any.
    #[must_use]
    pub fn intent(self) -> Option<Intent> {
        match self {
            Self::ArrowLeft => Some(Intent::Prev),
            Self::ArrowRight => Some(Intent::Next),
            Self::Space => Some(Intent::TogglePlayback),
            Self::Char('m' | 'M') => Some(Intent::ToggleMute),
            Self::Char(_) => None,
        }
    }
}

/// Maps a horizontal drag onto a navigation intent.
///
/// Dragging right-to-left (finger ends left of where it started) moves
/// forward. Drags shorter than `threshold` are ignored.
#[must_use]
pub fn swipe_intent(start_x: f64, end_x: f64, threshold: f64) -> Option<Intent> {
    let travel = start_x - end_x;
    if !travel.is_finite() || travel.abs() < threshold {
        return None;
    }
    if travel > 0.0 {
        Some(Intent::Next)
    } else {
        Some(Intent::Prev)
    }
}

/// Maps a tap at `x` on a surface `width` wide onto a navigation intent.
#[must_use]
pub fn tap_intent(x: f64, width: f64) -> Intent {
    if x < width / 2.0 {
        Intent::Prev
    } else {
        Intent::Next
    }
}
