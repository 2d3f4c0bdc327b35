//! Per-actor sliding-window limiter for comment submissions.
//!
//! State is process-local; behind several instances each one counts alone.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

/// Map size above which idle keys are dropped on the next check
const SWEEP_THRESHOLD: usize = 10_000;

/// Counters reported in `RateLimit-*` headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: usize,
    pub remaining: usize,
    /// Seconds until the oldest hit in the window expires
    pub reset_after_secs: u64,
}

#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_hits: usize,
    window: TimeDelta,
    hits: DashMap<String, VecDeque<DateTime<Utc>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_hits: usize, window: Duration) -> Self {
        Self {
            max_hits,
            window: TimeDelta::from_std(window).unwrap_or_else(|_| TimeDelta::days(365)),
            hits: DashMap::new(),
        }
    }

    /// Record a hit for `key` at `now`. `Err` carries the counters of a rejected
    /// hit, which is not recorded.
    pub fn check(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitInfo, RateLimitInfo> {
        if self.hits.len() > SWEEP_THRESHOLD {
            self.sweep(now);
        }

        let cutoff = now - self.window;
        let mut window = self.hits.entry(key.to_owned()).or_default();
        while window.front().is_some_and(|hit| *hit <= cutoff) {
            window.pop_front();
        }

        if window.len() >= self.max_hits {
            let oldest = window.front().copied().unwrap_or(now);
            return Err(self.info(0, oldest, now));
        }

        window.push_back(now);
        let oldest = window.front().copied().unwrap_or(now);
        Ok(self.info(self.max_hits - window.len(), oldest, now))
    }

    fn info(&self, remaining: usize, oldest: DateTime<Utc>, now: DateTime<Utc>) -> RateLimitInfo {
        let reset_millis = (oldest + self.window - now).num_milliseconds().max(0);
        RateLimitInfo {
            limit: self.max_hits,
            remaining,
            reset_after_secs: (reset_millis as u64).div_ceil(1000),
        }
    }

    fn sweep(&self, now: DateTime<Utc>) {
        let cutoff = now - self.window;
        self.hits
            .retain(|_, window| window.back().is_some_and(|hit| *hit > cutoff));
    }

    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }
}
