//! Daily Drift Core: shared domain abstractions.
//!
//! This crate defines the traits and error types that every bounded
//! context depends on. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
