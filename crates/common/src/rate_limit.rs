//! Per-key sliding-window admission control
//!
//! Each key keeps the ordered timestamps of the requests it was admitted
//! for. On every check the timestamps at or before `now - window` are
//! dropped; the request is admitted only if fewer than `limit` remain.
//! This yields exactly `limit` admissions inside any trailing window,
//! per key, with no cap across keys.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Default admissions per share token per window
pub const DEFAULT_SHARE_LIMIT: usize = 1000;
/// Default trailing window for share-token admissions
pub const DEFAULT_SHARE_WINDOW: Duration = Duration::from_secs(5 * 60);

pub trait RateLimiter: Send + Sync {
    /// Whether a request for `key` may proceed right now
    fn allow(&self, key: &str) -> bool;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateLimitConfigError {
    #[error("rate limit must be greater than zero")]
    ZeroLimit,
    #[error("rate limit window must be greater than zero")]
    ZeroWindow,
}

/// Sliding-window limiter over an in-memory map of key -> timestamps.
///
/// One lock guards the whole map, so admission checks are serialized
///  across keys. The outer map is never pruned: a key that goes idle
///  keeps its (bounded) window until the process exits.
// TODO: shard `keys` by key hash into independently locked partitions
//  if this ever gates more than the share-fetch path.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    limit: usize,
    window: Duration,
    keys: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(limit: usize, window: Duration) -> Result<Self, RateLimitConfigError> {
        if limit == 0 {
            return Err(RateLimitConfigError::ZeroLimit);
        }
        if window.is_zero() {
            return Err(RateLimitConfigError::ZeroWindow);
        }

        Ok(Self {
            limit,
            window,
            keys: Mutex::new(HashMap::new()),
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of keys with retained state
    pub fn tracked_keys(&self) -> usize {
        self.keys.lock().len()
    }

    /// Admission check against a caller-supplied clock reading.
    ///
    /// `now` must not go backwards between calls for the same key.
    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut keys = self.keys.lock();
        let timestamps = keys.entry(key.to_owned()).or_default();

        // a cutoff before the clock's origin means nothing can have expired
        if let Some(cutoff) = now.checked_sub(self.window) {
            while timestamps.front().is_some_and(|ts| *ts <= cutoff) {
                timestamps.pop_front();
            }
        }

        if timestamps.len() >= self.limit {
            return false;
        }

        timestamps.push_back(now);
        true
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }
}
