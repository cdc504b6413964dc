//! Per-key sliding-window rate limiter, safe to share across threads.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Stale keys are swept once the map grows past this many entries.
const SWEEP_THRESHOLD: usize = 1024;

/// Tracks request timestamps per key (usually a user id).
///
/// The whole check-and-record step runs under one lock, so two threads
/// can never both take the last slot in a window.
#[derive(Debug)]
pub struct KeyedRateLimiter {
    requests: Mutex<HashMap<String, Vec<Instant>>>,
    limit: usize,
    window: Duration,
}

impl KeyedRateLimiter {
    /// Allow `limit` requests per key within each `window`.
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
            limit,
            window,
        }
    }

    /// Record a request for `key` and return whether it is allowed.
    ///
    /// Rejected requests are not recorded.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let window_start = now.checked_sub(self.window);
        let is_live = |t: &Instant| window_start.is_none_or(|start| *t > start);

        if requests.len() > SWEEP_THRESHOLD {
            requests.retain(|_, stamps| stamps.iter().any(is_live));
        }

        let stamps = requests.entry(key.to_string()).or_default();
        stamps.retain(is_live);

        if stamps.len() < self.limit {
            stamps.push(now);
            true
        } else {
            false
        }
    }

    /// Requests still available for `key` in the current window.
    pub fn remaining(&self, key: &str) -> usize {
        let requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let Some(stamps) = requests.get(key) else {
            return self.limit;
        };
        let window_start = Instant::now().checked_sub(self.window);
        let live = stamps
            .iter()
            .filter(|t| window_start.is_none_or(|start| **t > start))
            .count();
        self.limit.saturating_sub(live)
    }
}
