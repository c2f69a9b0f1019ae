//! Per-command, per-user cooldown tracking.

use crate::clock::Clock;
use dashmap::DashMap;
use gembot_common::UserId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CooldownKey {
    command: String,
    user_id: UserId,
}

impl CooldownKey {
    fn new(command: &str, user_id: UserId) -> Self {
        Self {
            command: command.to_string(),
            user_id,
        }
    }
}

/// Last-use timestamps keyed by `(command, user)`.
///
/// Entries are never expired; a stale entry simply no longer reports a
/// cooldown.
#[derive(Debug)]
pub struct CooldownTracker {
    last_used: DashMap<CooldownKey, Instant>,
    clock: Arc<dyn Clock>,
}

impl CooldownTracker {
    /// Create an empty tracker.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            last_used: DashMap::new(),
            clock,
        }
    }

    fn elapsed(&self, command: &str, user_id: UserId) -> Option<Duration> {
        let key = CooldownKey::new(command, user_id);
        self.last_used
            .get(&key)
            .map(|last| self.clock.now().saturating_duration_since(*last))
    }

    /// True while less than `window` has passed since the last recorded use.
    pub fn is_on_cooldown(&self, command: &str, user_id: UserId, window: Duration) -> bool {
        self.elapsed(command, user_id)
            .is_some_and(|elapsed| elapsed < window)
    }

    /// Time left before the command is usable again, zero when it already is.
    pub fn remaining(&self, command: &str, user_id: UserId, window: Duration) -> Duration {
        match self.elapsed(command, user_id) {
            Some(elapsed) if elapsed < window => window - elapsed,
            _ => Duration::ZERO,
        }
    }

    /// Record a use now, replacing any earlier one.
    pub fn set_cooldown(&self, command: &str, user_id: UserId) {
        debug!("Applying cooldown for command '{}' (user: {})", command, user_id);
        self.last_used
            .insert(CooldownKey::new(command, user_id), self.clock.now());
    }

    /// Forget the last use of one command.
    pub fn clear(&self, command: &str, user_id: UserId) {
        if self
            .last_used
            .remove(&CooldownKey::new(command, user_id))
            .is_some()
        {
            debug!("Cleared cooldown for command '{}' (user: {})", command, user_id);
        }
    }

    /// Forget every command's last use for a user, returning how many were removed.
    pub fn clear_user(&self, user_id: UserId) -> usize {
        let before = self.last_used.len();
        self.last_used.retain(|key, _| key.user_id != user_id);
        let removed = before.saturating_sub(self.last_used.len());
        debug!("Cleared {} cooldowns for user {}", removed, user_id);
        removed
    }

    /// Number of entries still inside their window.
    ///
    /// `window_for` maps a command name to its window.
    pub fn active_entries<F>(&self, window_for: F) -> usize
    where
        F: Fn(&str) -> Duration,
    {
        let now = self.clock.now();
        self.last_used
            .iter()
            .filter(|entry| {
                now.saturating_duration_since(*entry.value()) < window_for(&entry.key().command)
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const WINDOW: Duration = Duration::from_secs(3);

    fn tracker() -> (Arc<ManualClock>, CooldownTracker) {
        let clock = Arc::new(ManualClock::new());
        let tracker = CooldownTracker::new(clock.clone());
        (clock, tracker)
    }

    #[test]
    fn test_unknown_pair_is_ready() {
        let (_, tracker) = tracker();
        assert!(!tracker.is_on_cooldown("gemini", UserId(1), WINDOW));
        assert_eq!(tracker.remaining("gemini", UserId(1), WINDOW), Duration::ZERO);
    }

    #[test]
    fn test_cooldown_expires_at_window() {
        let (clock, tracker) = tracker();
        tracker.set_cooldown("gemini", UserId(1));

        assert!(tracker.is_on_cooldown("gemini", UserId(1), WINDOW));
        assert_eq!(tracker.remaining("gemini", UserId(1), WINDOW), WINDOW);

        clock.advance(Duration::from_millis(2999));
        assert!(tracker.is_on_cooldown("gemini", UserId(1), WINDOW));
        assert_eq!(
            tracker.remaining("gemini", UserId(1), WINDOW),
            Duration::from_millis(1)
        );

        clock.advance(Duration::from_millis(1));
        assert!(!tracker.is_on_cooldown("gemini", UserId(1), WINDOW));
        assert_eq!(tracker.remaining("gemini", UserId(1), WINDOW), Duration::ZERO);
    }

    #[test]
    fn test_keys_are_independent() {
        let (_, tracker) = tracker();
        tracker.set_cooldown("gemini", UserId(1));

        assert!(!tracker.is_on_cooldown("vision", UserId(1), WINDOW));
        assert!(!tracker.is_on_cooldown("gemini", UserId(2), WINDOW));
    }

    #[test]
    fn test_set_overwrites_previous_use() {
        let (clock, tracker) = tracker();
        tracker.set_cooldown("gemini", UserId(1));
        clock.advance_secs(2);
        tracker.set_cooldown("gemini", UserId(1));
        clock.advance_secs(2);

        assert!(tracker.is_on_cooldown("gemini", UserId(1), WINDOW));
    }

    #[test]
    fn test_clear() {
        let (_, tracker) = tracker();
        tracker.clear("gemini", UserId(1));
        tracker.set_cooldown("gemini", UserId(1));
        tracker.clear("gemini", UserId(1));
        assert!(!tracker.is_on_cooldown("gemini", UserId(1), WINDOW));
    }

    #[test]
    fn test_clear_user_and_active_entries() {
        let (clock, tracker) = tracker();
        tracker.set_cooldown("gemini", UserId(1));
        tracker.set_cooldown("vision", UserId(1));
        tracker.set_cooldown("gemini", UserId(2));

        assert_eq!(tracker.active_entries(|_| WINDOW), 3);
        clock.advance_secs(4);
        assert_eq!(tracker.active_entries(|_| WINDOW), 0);
        assert_eq!(
            tracker.active_entries(|command| if command == "vision" {
                Duration::from_secs(5)
            } else {
                WINDOW
            }),
            1
        );

        assert_eq!(tracker.clear_user(UserId(1)), 2);
        assert_eq!(tracker.clear_user(UserId(1)), 0);
        assert_eq!(tracker.active_entries(|_| Duration::from_secs(60)), 1);
    }
}
