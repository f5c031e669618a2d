//! Fixed-window request counting.
//!
//! Windows are aligned to the wall clock: a window of `W` seconds covers
//! `[k*W, (k+1)*W)` since the Unix epoch. Requests `1..=N` in a window are
//! allowed, request `N+1` onward is throttled, and only rollover into the
//! next window clears the count.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use backoffice_core::clock::SharedClock;

/// Per-key window bookkeeping.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: i64,
    count: u32,
}

/// Where a key stands within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// No requests counted in the current window.
    Idle,
    /// Some requests counted, limit not exceeded.
    Accumulating,
    /// Limit exceeded; requests are rejected until rollover.
    Throttled,
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests allowed per window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Seconds until the current window rolls over.
    pub retry_after_secs: u64,
}

/// In-process fixed-window rate limiter keyed by arbitrary strings.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    max_requests: u32,
    window_seconds: i64,
    enabled: bool,
    clock: SharedClock,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_requests` per `window_seconds`.
    pub fn new(max_requests: u32, window_seconds: u64, clock: SharedClock) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window_seconds: window_seconds.max(1) as i64,
            enabled: true,
            clock,
        }
    }

    /// Creates a limiter that allows everything.
    pub fn disabled(clock: SharedClock) -> Self {
        Self {
            enabled: false,
            ..Self::new(u32::MAX, 1, clock)
        }
    }

    /// Requests allowed per window.
    pub fn limit(&self) -> u32 {
        self.max_requests
    }

    fn window_start(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp().div_euclid(self.window_seconds) * self.window_seconds
    }

    fn seconds_to_rollover(&self, now: DateTime<Utc>, start: i64) -> u64 {
        let end = DateTime::from_timestamp(start + self.window_seconds, 0).unwrap_or(now);
        let remaining = (end - now).max(Duration::zero());
        // Rounded up to whole seconds.
        let secs = remaining.num_seconds() + i64::from(remaining.subsec_nanos() > 0);
        secs.max(1) as u64
    }

    /// Counts one request against `key`.
    pub fn check(&self, key: &str) -> RateDecision {
        if !self.enabled {
            return RateDecision {
                allowed: true,
                limit: self.max_requests,
                remaining: self.max_requests,
                retry_after_secs: 0,
            };
        }

        let now = self.clock.now();
        let start = self.window_start(now);
        let mut window = self.windows.entry(key.to_string()).or_insert(Window {
            start,
            count: 0,
        });
        if window.start != start {
            *window = Window { start, count: 0 };
        }
        window.count = window.count.saturating_add(1);
        let count = window.count;
        drop(window);

        RateDecision {
            allowed: count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(count),
            retry_after_secs: self.seconds_to_rollover(now, start),
        }
    }

    /// Current state of `key` without counting a request.
    pub fn state(&self, key: &str) -> WindowState {
        let start = self.window_start(self.clock.now());
        match self.windows.get(key) {
            Some(w) if w.start == start && w.count > self.max_requests => WindowState::Throttled,
            Some(w) if w.start == start && w.count > 0 => WindowState::Accumulating,
            _ => WindowState::Idle,
        }
    }

    /// Forget `key` entirely.
    pub fn reset(&self, key: &str) {
        self.windows.remove(key);
    }

    /// Drops windows that have rolled over. Returns the number removed.
    pub fn purge_stale(&self) -> usize {
        let start = self.window_start(self.clock.now());
        let before = self.windows.len();
        self.windows.retain(|_, w| w.start == start);
        before.saturating_sub(self.windows.len())
    }

    /// Number of tracked keys.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
