//! Clock backed by tokio's timer.

use chrono::{DateTime, TimeDelta, Utc};
use dailydrift_core::clock::Clock;
use tokio::time::Instant;

/// Wall-clock time that advances with `tokio::time`.
///
/// Elapsed story time is measured against the same source that drives the
/// advance timers, so a paused tokio clock in tests freezes both.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    wall_origin: DateTime<Utc>,
    origin: Instant,
}

impl TokioClock {
    /// Anchors the clock at the current wall time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            wall_origin: Utc::now(),
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.origin.elapsed()).unwrap_or(TimeDelta::MAX);
        self.wall_origin + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let clock = TokioClock::new();
        let start = clock.now();

        tokio::time::advance(Duration::from_millis(1_250)).await;

        assert_eq!(clock.now() - start, TimeDelta::milliseconds(1_250));
    }
}
