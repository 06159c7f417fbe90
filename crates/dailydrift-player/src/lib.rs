//! Daily Drift: story player host.
//!
//! Runs a `StoryPlayback` state machine on a tokio task: real timers,
//! a media surface, hand-off to adjacent story sets, and scoped keyboard
//! listeners.

pub mod clock;
pub mod host;
pub mod keyboard;
pub mod surface;
mod timers;

pub use host::{PlayerHandle, PlayerInput, PlayerSetup};
pub use keyboard::{KeyboardHub, ListenerGuard};
pub use surface::{AdjacentSets, MediaError, MediaSurface};
