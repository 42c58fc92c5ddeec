//! Clock that follows the tokio timer.
//!
//! Wall-clock time keeps moving while tokio's clock is paused in tests,
//! which would desynchronise session ticks from the interval that drives
//! them. [`TokioClock`] anchors a UTC timestamp once and then advances it
//! by `tokio::time::Instant`, so it pauses and auto-advances together with
//! the runtime.

use chrono::Utc;
use homepro_core::clock::Clock;
use homepro_core::types::Timestamp;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Timestamp,
    origin_instant: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Utc::now(),
            origin_instant: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Timestamp {
        let elapsed = chrono::Duration::from_std(self.origin_instant.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin + elapsed
    }
}
