//! Domain layer for the Stories context.

pub mod adjacency;
pub mod category;
pub mod commands;
pub mod editorial;
pub mod input;
pub mod playback;
pub mod slug;
pub mod story;
pub mod timing;
