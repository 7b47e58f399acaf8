//! Per-run timing context

use std::time::{Duration, Instant};

/// Wall-clock bookkeeping for one puzzle.
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    start: Instant,
    time_limit: Duration,
    end: Option<Instant>,
}

impl RunContext {
    pub fn start(time_limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            time_limit,
            end: None,
        }
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn deadline(&self) -> Instant {
        self.start + self.time_limit
    }

    /// Budget left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline().saturating_duration_since(Instant::now())
    }

    /// Share `ratio` of the remaining budget.
    pub fn search_time(&self, ratio: f64) -> Duration {
        self.remaining().mul_f64(ratio.clamp(0.0, 1.0))
    }

    pub fn finish(&mut self) {
        self.end = Some(Instant::now());
    }

    pub fn elapsed(&self) -> Duration {
        self.end
            .unwrap_or_else(Instant::now)
            .saturating_duration_since(self.start)
    }
}
