//! Fixed-window request rate limiting.
//!
//! Windows are tracked per key (typically a client IP) in a `DashMap`;
//! state is in-memory and per-process. The clock is passed in explicitly
//! through [`FixedWindowLimiter::check_at`] so the core stays testable;
//! callers use [`FixedWindowLimiter::check`].

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request is within the window's budget.
    Allowed {
        /// Requests left in the current window after this one.
        remaining: u32,
    },
    /// Budget exhausted for this window.
    Limited {
        /// Seconds until the window rolls over.
        retry_after_secs: u64,
    },
}

impl RateLimitDecision {
    /// True when the request may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// One key's state: the window it is counting in and the count so far.
#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: u64,
    count: u32,
}

/// Fixed-window limiter keyed by client identity.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    windows: DashMap<String, Window>,
    max_requests: u32,
    window_secs: u64,
}

impl FixedWindowLimiter {
    /// Creates a limiter allowing `max_requests` per `window_secs`.
    ///
    /// # Panics
    ///
    /// Panics if `max_requests` or `window_secs` is zero.
    #[must_use]
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        assert!(max_requests > 0, "max_requests must be positive");
        assert!(window_secs > 0, "window_secs must be positive");
        Self {
            windows: DashMap::new(),
            max_requests,
            window_secs,
        }
    }

    /// Checks and counts one request for `key` at the current time.
    #[must_use]
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, epoch_secs())
    }

    /// Checks and counts one request for `key` at an explicit epoch
    /// second.
    #[must_use]
    pub fn check_at(&self, key: &str, now: u64) -> RateLimitDecision {
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(Window {
                started_at: now,
                count: 0,
            });

        if now.saturating_sub(entry.started_at) >= self.window_secs {
            entry.started_at = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            let retry_after_secs = (entry.started_at + self.window_secs).saturating_sub(now);
            return RateLimitDecision::Limited { retry_after_secs };
        }

        entry.count += 1;
        RateLimitDecision::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }

    /// Drops windows that ended before `now`, bounding memory for
    /// one-off keys.
    pub fn evict_stale(&self, now: u64) {
        self.windows
            .retain(|_, window| now.saturating_sub(window.started_at) < self.window_secs);
    }

    /// Drops windows that ended before the current time.
    pub fn evict(&self) {
        self.evict_stale(epoch_secs());
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Spawns a background task that sweeps stale windows every `every`.
    ///
    /// Without the sweep, every one-off key would leave a permanent map
    /// entry behind.
    pub fn spawn_sweeper(limiter: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.evict();
            }
        })
    }
}
