//! Sliding-window request limiting per user.

use crate::clock::Clock;
use dashmap::DashMap;
use gembot_common::UserId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Length of the sliding window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Counts each user's requests over the trailing [`RATE_LIMIT_WINDOW`].
///
/// Timestamps older than the window are pruned whenever a user's window is
/// touched.
#[derive(Debug)]
pub struct RateLimiter {
    requests: DashMap<UserId, Vec<Instant>>,
    max_requests: usize,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Allow `max_requests` per user per window.
    pub fn new(max_requests: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            requests: DashMap::new(),
            max_requests,
            clock,
        }
    }

    /// Configured ceiling.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    fn prune(window: &mut Vec<Instant>, now: Instant) {
        window.retain(|&time| now.saturating_duration_since(time) < RATE_LIMIT_WINDOW);
    }

    /// Requests the user made inside the window.
    pub fn request_count(&self, user_id: UserId) -> usize {
        let now = self.clock.now();
        match self.requests.get_mut(&user_id) {
            Some(mut window) => {
                Self::prune(&mut window, now);
                window.len()
            }
            None => 0,
        }
    }

    /// True once the user has reached the ceiling.
    pub fn is_rate_limited(&self, user_id: UserId) -> bool {
        let count = self.request_count(user_id);
        if count >= self.max_requests {
            debug!(
                "User {} rate limited ({}/{} requests in window)",
                user_id, count, self.max_requests
            );
            true
        } else {
            false
        }
    }

    /// Record a request now.
    pub fn add_request(&self, user_id: UserId) {
        let now = self.clock.now();
        let mut window = self.requests.entry(user_id).or_default();
        Self::prune(&mut window, now);
        window.push(now);
    }
}
