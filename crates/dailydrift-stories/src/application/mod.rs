//! Application layer for the Stories context.

pub mod command_handlers;
pub mod memory;
pub mod query_handlers;
pub mod repository;
