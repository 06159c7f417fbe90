//! Shared test mocks and utilities for the Daily Drift backend.

mod clock;

pub use clock::{FixedClock, ManualClock, fixed_now};
