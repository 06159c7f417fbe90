//! Daily Drift: Stories bounded context.
//!
//! Responsible for story-set delivery (playable sets and their neighbours),
//! the editorial reconciliation of story sets, and the auto-advance
//! playback state machine that the player host drives.

pub mod application;
pub mod domain;
