//! Property tests for the gate components.

use gembot_common::{Role, UserId};
use gembot_gate::{
    sanitize, Caller, ConversationStorage, ConversationStore, ConversationTurn, CooldownTracker,
    ManualClock, PermissionResolver, RateLimiter, StorageError,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct DiscardStorage;

impl ConversationStorage for DiscardStorage {
    fn load_all(&self) -> Result<Vec<(UserId, Vec<ConversationTurn>)>, StorageError> {
        Ok(Vec::new())
    }

    fn save(&self, _user_id: UserId, _turns: &[ConversationTurn]) -> Result<(), StorageError> {
        Ok(())
    }
}

fn text_with_tokens() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("`".to_string()),
            Just("@everyone".to_string()),
            Just("@here".to_string()),
            Just("@".to_string()),
            Just(" ".to_string()),
            "[a-z]{1,4}",
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_sanitize_is_idempotent(text in text_with_tokens()) {
        let once = sanitize(&text);
        prop_assert_eq!(sanitize(&once), once.clone());
        prop_assert!(!once.contains('`'));
        prop_assert!(!once.contains("@everyone"));
        prop_assert!(!once.contains("@here"));
        prop_assert_eq!(once.trim(), once.as_str());
    }

    #[test]
    fn prop_sanitize_arbitrary_unicode(text in "\\PC{0,64}") {
        let once = sanitize(&text);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn prop_cooldown_holds_for_window(window_secs in 1u64..600, elapsed_ms in 0u64..1_200_000) {
        let clock = Arc::new(ManualClock::new());
        let tracker = CooldownTracker::new(clock.clone());
        let window = Duration::from_secs(window_secs);

        tracker.set_cooldown("gemini", UserId(1));
        clock.advance(Duration::from_millis(elapsed_ms));

        let elapsed = Duration::from_millis(elapsed_ms);
        prop_assert_eq!(tracker.is_on_cooldown("gemini", UserId(1), window), elapsed < window);
        prop_assert_eq!(
            tracker.remaining("gemini", UserId(1), window),
            window.saturating_sub(elapsed)
        );
    }

    #[test]
    fn prop_rate_limit_after_max_requests(max in 1usize..40) {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::new(max, clock.clone());

        for _ in 0..max {
            prop_assert!(!limiter.is_rate_limited(UserId(1)));
            limiter.add_request(UserId(1));
            clock.advance(Duration::from_millis(100));
        }
        prop_assert!(limiter.is_rate_limited(UserId(1)));

        clock.advance_secs(60);
        prop_assert!(!limiter.is_rate_limited(UserId(1)));
    }

    #[test]
    fn prop_history_cap_keeps_latest(max_exchanges in 1usize..8, appends in 0usize..60) {
        let store = ConversationStore::load(Arc::new(DiscardStorage), max_exchanges).unwrap();
        for i in 0..appends {
            let role = if i % 2 == 0 { Role::User } else { Role::Model };
            store.append_message(UserId(1), role, i.to_string()).unwrap();
        }

        let history = store.get_history(UserId(1));
        let cap = max_exchanges * 2;
        prop_assert!(history.len() <= cap);
        prop_assert_eq!(history.len(), appends.min(cap));

        let expected: Vec<String> = (appends.saturating_sub(cap)..appends)
            .map(|i| i.to_string())
            .collect();
        let actual: Vec<String> = history.into_iter().map(|turn| turn.text).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_is_admin_iff_any_condition(
        administrator in any::<bool>(),
        listed in any::<bool>(),
        has_role in any::<bool>(),
    ) {
        let resolver = PermissionResolver::new(
            vec!["Admin".to_string()],
            vec![UserId(42)],
        );
        let user_id = if listed { UserId(42) } else { UserId(7) };
        let roles: Vec<&str> = if has_role { vec!["Member", "Admin"] } else { vec!["Member"] };
        let caller = Caller::new(user_id)
            .with_roles(roles)
            .with_administrator(administrator);

        prop_assert_eq!(resolver.is_admin(&caller), administrator || listed || has_role);
    }
}
