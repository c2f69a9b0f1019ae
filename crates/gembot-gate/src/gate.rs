//! The admission pipeline wrapped around every AI-invoking command.

use crate::clock::{Clock, SystemClock};
use crate::conversation::{
    ConversationStats, ConversationStorage, ConversationStore, ConversationTurn, StorageError,
};
use crate::cooldown::CooldownTracker;
use crate::error::{GateError, Rejection};
use crate::permissions::{Caller, PermissionResolver};
use crate::rate_limit::RateLimiter;
use crate::validator::InputValidator;
use gembot_common::UserId;
use gembot_config::Config;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Outcome of [`RequestGate::admit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The command may run; its cooldown and rate charge are already recorded.
    Admitted,
    /// The command must not run.
    Rejected(Rejection),
}

impl Admission {
    /// Whether the command may run.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }

    /// `Ok(())` when admitted, the matching [`GateError`] otherwise.
    pub fn into_result(self) -> Result<(), GateError> {
        match self {
            Self::Admitted => Ok(()),
            Self::Rejected(rejection) => Err(rejection.into()),
        }
    }
}

/// Owns all per-user state and decides whether a command may run.
///
/// Checks run in a fixed order: rate limit, permission, then cooldown
/// (skipped for admins). On success the cooldown and rate-limit usage are
/// recorded before the command body runs and are not rolled back if the
/// body later fails.
#[derive(Debug)]
pub struct RequestGate {
    cooldowns: CooldownTracker,
    rate_limiter: RateLimiter,
    permissions: PermissionResolver,
    conversations: ConversationStore,
    validator: InputValidator,
    cooldown_windows: HashMap<String, Duration>,
}

impl RequestGate {
    /// Assemble a gate from its parts.
    pub fn new(
        cooldowns: CooldownTracker,
        rate_limiter: RateLimiter,
        permissions: PermissionResolver,
        conversations: ConversationStore,
        validator: InputValidator,
        cooldown_windows: HashMap<String, Duration>,
    ) -> Self {
        Self {
            cooldowns,
            rate_limiter,
            permissions,
            conversations,
            validator,
            cooldown_windows,
        }
    }

    /// Build a gate from configuration, loading persisted conversations.
    pub fn from_config(
        config: &Config,
        storage: Arc<dyn ConversationStorage>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StorageError> {
        let conversations = ConversationStore::load(storage, config.conversation.memory_limit)?;
        let cooldown_windows = config
            .cooldowns
            .windows()
            .into_iter()
            .map(|(command, window)| (command.to_string(), window))
            .collect();

        Ok(Self::new(
            CooldownTracker::new(Arc::clone(&clock)),
            RateLimiter::new(config.limits.max_requests_per_minute as usize, clock),
            PermissionResolver::from_config(&config.permissions),
            conversations,
            InputValidator::new(
                config.limits.max_message_length,
                config.limits.max_image_size_mb,
            ),
            cooldown_windows,
        ))
    }

    /// [`from_config`](Self::from_config) with the system clock.
    pub fn with_system_clock(
        config: &Config,
        storage: Arc<dyn ConversationStorage>,
    ) -> Result<Self, StorageError> {
        Self::from_config(config, storage, Arc::new(SystemClock))
    }

    /// Run the admission checks for `command` and record usage on success.
    pub fn admit(&self, caller: &Caller, command: &str) -> Admission {
        let user_id = caller.user_id;

        if self.rate_limiter.is_rate_limited(user_id) {
            warn!("Rejected '{}' for user {}: rate limited", command, user_id);
            return Admission::Rejected(Rejection::RateLimited);
        }

        if !self.permissions.can_use_command(caller, command) {
            warn!("Rejected '{}' for user {}: permission denied", command, user_id);
            return Admission::Rejected(Rejection::PermissionDenied {
                command: command.to_string(),
            });
        }

        if !self.permissions.is_admin(caller) {
            let window = self.cooldown_window(command);
            if self.cooldowns.is_on_cooldown(command, user_id, window) {
                let remaining = self.cooldowns.remaining(command, user_id, window);
                warn!(
                    "Rejected '{}' for user {}: on cooldown ({:.1}s remaining)",
                    command,
                    user_id,
                    remaining.as_secs_f64()
                );
                return Admission::Rejected(Rejection::OnCooldown {
                    command: command.to_string(),
                    remaining,
                });
            }
        }

        self.cooldowns.set_cooldown(command, user_id);
        self.rate_limiter.add_request(user_id);
        info!("Admitted '{}' for user {}", command, user_id);
        Admission::Admitted
    }

    /// Permission check alone, for admin commands that carry no cooldown.
    pub fn authorize(&self, caller: &Caller, command: &str) -> Admission {
        if self.permissions.can_use_command(caller, command) {
            Admission::Admitted
        } else {
            warn!(
                "Rejected '{}' for user {}: permission denied",
                command, caller.user_id
            );
            Admission::Rejected(Rejection::PermissionDenied {
                command: command.to_string(),
            })
        }
    }

    /// Whether the caller counts as an admin.
    pub fn is_admin(&self, caller: &Caller) -> bool {
        self.permissions.is_admin(caller)
    }

    /// Configured window for a command; zero for commands without one.
    pub fn cooldown_window(&self, command: &str) -> Duration {
        self.cooldown_windows
            .get(command)
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Time left on the user's cooldown for `command`.
    pub fn cooldown_remaining(&self, user_id: UserId, command: &str) -> Duration {
        self.cooldowns
            .remaining(command, user_id, self.cooldown_window(command))
    }

    /// Every command with a cooldown paired with the user's remaining time, sorted by name.
    pub fn cooldown_overview(&self, user_id: UserId) -> Vec<(String, Duration)> {
        let mut overview: Vec<(String, Duration)> = self
            .cooldown_windows
            .iter()
            .map(|(command, window)| {
                (
                    command.clone(),
                    self.cooldowns.remaining(command, user_id, *window),
                )
            })
            .collect();
        overview.sort_by(|a, b| a.0.cmp(&b.0));
        overview
    }

    /// Cooldown entries still inside their window.
    pub fn active_cooldowns(&self) -> usize {
        self.cooldowns
            .active_entries(|command| self.cooldown_window(command))
    }

    /// Validator bound to the configured limits.
    pub fn validator(&self) -> &InputValidator {
        &self.validator
    }

    /// Underlying conversation store.
    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// The user's stored history.
    pub fn history(&self, user_id: UserId) -> Vec<ConversationTurn> {
        self.conversations.get_history(user_id)
    }

    /// Store a completed exchange. Persistence failures are logged, not returned.
    pub fn record_exchange(&self, user_id: UserId, prompt: &str, reply: &str) {
        if let Err(e) = self.conversations.append_exchange(user_id, prompt, reply) {
            error!("Failed to save conversation for user {}: {}", user_id, describe(&e));
        }
    }

    /// Clear the user's history. Returns whether there was any.
    pub fn reset_history(&self, user_id: UserId) -> bool {
        let had_history = !self.conversations.get_history(user_id).is_empty();
        if let Err(e) = self.conversations.reset_history(user_id) {
            error!("Failed to save conversation for user {}: {}", user_id, describe(&e));
        }
        had_history
    }

    /// Clear every history. Returns how many users had one.
    pub fn reset_all_histories(&self) -> usize {
        let had_history = self.conversations.stats().users_with_history;
        match self.conversations.reset_all() {
            Ok(cleared) => cleared,
            Err(e) => {
                error!("Failed to save cleared conversations: {}", describe(&e));
                had_history
            }
        }
    }

    /// Conversation counts.
    pub fn conversation_stats(&self) -> ConversationStats {
        self.conversations.stats()
    }
}

fn describe(error: &GateError) -> String {
    let mut description = error.to_string();
    let mut current = std::error::Error::source(error);
    while let Some(source) = current {
        description.push_str(": ");
        description.push_str(&source.to_string());
        current = source.source();
    }
    description
}
