use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::RateLimitConfig;

/// Entries beyond this count trigger a sweep of expired windows.
const PRUNE_THRESHOLD: usize = 10_000;

/// Fixed-window request counter keyed by an arbitrary string (usually client IP).
///
/// Windows are not sliding: a burst straddling a window boundary can admit up
/// to twice `max_requests`.
pub struct RateLimiter {
    /// key -> (count, window_expiry)
    entries: DashMap<String, (u32, Instant)>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window)
    }

    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    /// Same as [`allow`](Self::allow) with an explicit clock reading.
    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        if self.entries.len() > PRUNE_THRESHOLD {
            self.prune_expired(now);
        }

        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert((0, now + self.window));
        let (count, expires_at) = entry.value_mut();

        if *count == 0 || now > *expires_at {
            *count = 1;
            *expires_at = now + self.window;
            return true;
        }

        if *count >= self.max_requests {
            return false;
        }

        *count += 1;
        true
    }

    /// Drop every entry whose window has already closed.
    pub fn prune_expired(&self, now: Instant) {
        self.entries.retain(|_, (_, expires_at)| now <= *expires_at);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
