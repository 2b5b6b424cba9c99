//! In-memory fixed-window rate limiting keyed by a client identifier.
//!
//! Fixed-window counting: a burst straddling a window boundary can admit
//! up to 2x the limit across the boundary.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::time::{Duration, Instant};

struct Record {
    count: u32,
    reset_at: Instant,
}

struct Inner {
    max_requests: u32,
    window: Duration,
    store: Mutex<HashMap<String, Record>>,
}

/// A fixed-window request counter. Cheap to clone; clones share state, so
/// handlers and the background sweeper can hold the same limiter.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        assert!(max_requests > 0, "max_requests must be greater than 0");
        assert!(!window.is_zero(), "window must be greater than 0");
        Self {
            inner: Arc::new(Inner {
                max_requests,
                window,
                store: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns `true` if the request is admitted. First request from an
    /// identifier (or the first after its window elapsed) opens a fresh
    /// window with count 1; once the count reaches the limit, requests in
    /// the same window are denied without incrementing further.
    pub fn is_allowed(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut store = self.inner.store.lock().unwrap();

        if let Some(record) = store.get(identifier) {
            if now > record.reset_at {
                store.remove(identifier);
            }
        }

        match store.get_mut(identifier) {
            None => {
                store.insert(
                    identifier.to_string(),
                    Record {
                        count: 1,
                        reset_at: now + self.inner.window,
                    },
                );
                true
            }
            Some(record) if record.count < self.inner.max_requests => {
                record.count += 1;
                true
            }
            Some(_) => false,
        }
    }

    /// Requests left in the identifier's current window. An unseen or
    /// expired identifier has the full quota.
    pub fn remaining(&self, identifier: &str) -> u32 {
        let now = Instant::now();
        let store = self.inner.store.lock().unwrap();
        match store.get(identifier) {
            Some(record) if now <= record.reset_at => {
                self.inner.max_requests.saturating_sub(record.count)
            }
            _ => self.inner.max_requests,
        }
    }

    /// The identifier's current window boundary, or `now + window` for an
    /// unseen or expired identifier.
    pub fn reset_at(&self, identifier: &str) -> Instant {
        let now = Instant::now();
        let store = self.inner.store.lock().unwrap();
        match store.get(identifier) {
            Some(record) if now <= record.reset_at => record.reset_at,
            _ => now + self.inner.window,
        }
    }

    /// Drop every record whose window has passed. Idempotent; bounds the
    /// store's memory between requests from one-off identifiers.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let mut store = self.inner.store.lock().unwrap();
        store.retain(|_, record| now <= record.reset_at);
    }

    /// Number of identifiers currently tracked.
    pub fn tracked(&self) -> usize {
        self.inner.store.lock().unwrap().len()
    }

    /// Spawn the periodic cleanup task. The returned handle owns the task;
    /// dropping it detaches, aborting it stops the sweep.
    pub fn spawn_sweeper(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.tick().await; // first tick fires immediately
            loop {
                tick.tick().await;
                limiter.cleanup();
                tracing::debug!("rate limiter sweep done, {} tracked", limiter.tracked());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_window_admits_then_denies() {
        let limiter = RateLimiter::new(3, Duration::from_millis(1000));
        let results: Vec<bool> = (0..4).map(|_| limiter.is_allowed("x")).collect();
        assert_eq!(results, vec![true, true, true, false]);

        tokio::time::advance(Duration::from_millis(1001)).await;
        assert!(limiter.is_allowed("x"));
        // Fresh window: two more fit, the fourth is denied again
        assert!(limiter.is_allowed("x"));
        assert!(limiter.is_allowed("x"));
        assert!(!limiter.is_allowed("x"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_tracks_window() {
        let limiter = RateLimiter::new(5, Duration::from_millis(1000));
        assert_eq!(limiter.remaining("x"), 5);
        limiter.is_allowed("x");
        limiter.is_allowed("x");
        assert_eq!(limiter.remaining("x"), 3);

        tokio::time::advance(Duration::from_millis(1001)).await;
        assert_eq!(limiter.remaining("x"), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identifiers_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_millis(1000));
        assert!(limiter.is_allowed("a"));
        assert!(!limiter.is_allowed("a"));
        assert!(limiter.is_allowed("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_at_extends_for_unseen() {
        let limiter = RateLimiter::new(3, Duration::from_millis(1000));
        let before = Instant::now();
        limiter.is_allowed("x");
        let reset = limiter.reset_at("x");
        assert_eq!(reset, before + Duration::from_millis(1000));

        // Unseen identifier reports a full window from now
        assert_eq!(limiter.reset_at("y"), before + Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_only_expired() {
        let limiter = RateLimiter::new(3, Duration::from_millis(1000));
        limiter.is_allowed("old");
        tokio::time::advance(Duration::from_millis(600)).await;
        limiter.is_allowed("new");
        tokio::time::advance(Duration::from_millis(600)).await;

        assert_eq!(limiter.tracked(), 2);
        limiter.cleanup();
        assert_eq!(limiter.tracked(), 1);

        tokio::time::advance(Duration::from_millis(600)).await;
        limiter.cleanup();
        assert_eq!(limiter.tracked(), 0);
    }
}
