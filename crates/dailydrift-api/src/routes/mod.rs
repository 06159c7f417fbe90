//! Route modules.

pub mod categories;
pub mod health;
pub mod stories;
