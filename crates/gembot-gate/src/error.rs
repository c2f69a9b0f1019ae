//! Gate errors and their user-facing messages.

use crate::conversation::StorageError;
use crate::validator::ValidationError;
use gembot_common::{format_cooldown, GembotError, UserId};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Category of a failed external API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Quota or rate limit exhausted
    Quota,
    /// Bad or missing credentials
    Auth,
    /// Request timed out
    Timeout,
    /// Connection-level failure
    Network,
    /// Anything else
    Unknown,
}

/// Ordered substring rules; the first match wins.
const CLASSIFICATION_RULES: [(&[&str], ApiErrorKind); 4] = [
    (&["quota", "limit"], ApiErrorKind::Quota),
    (&["invalid", "unauthorized"], ApiErrorKind::Auth),
    (&["timeout"], ApiErrorKind::Timeout),
    (&["network", "connection"], ApiErrorKind::Network),
];

impl ApiErrorKind {
    /// Classify an error by its description.
    ///
    /// This is a text heuristic, not a contract with the provider.
    pub fn classify(description: &str) -> Self {
        let description = description.to_lowercase();
        CLASSIFICATION_RULES
            .iter()
            .find(|(needles, _)| needles.iter().any(|needle| description.contains(needle)))
            .map_or(Self::Unknown, |(_, kind)| *kind)
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quota => "quota",
            Self::Auth => "auth",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Reason the gate refused a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Too many requests in the last minute
    RateLimited,
    /// Admin-only command invoked by a non-admin
    PermissionDenied {
        /// Command name
        command: String,
    },
    /// Same command used again too soon
    OnCooldown {
        /// Command name
        command: String,
        /// Time until the command is available
        remaining: Duration,
    },
}

/// Everything that can go wrong between a command arriving and its reply.
#[derive(Error, Debug)]
pub enum GateError {
    /// See [`Rejection::RateLimited`]
    #[error("rate limited")]
    RateLimited,

    /// See [`Rejection::PermissionDenied`]
    #[error("permission denied for command '{command}'")]
    PermissionDenied {
        /// Command name
        command: String,
    },

    /// See [`Rejection::OnCooldown`]
    #[error("command '{command}' on cooldown ({}s remaining)", remaining.as_secs_f64())]
    OnCooldown {
        /// Command name
        command: String,
        /// Time until the command is available
        remaining: Duration,
    },

    /// Input refused
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// External API call failed
    #[error("{api} call failed ({kind}): {message}")]
    ExternalApi {
        /// Display name of the API
        api: String,
        /// Classified failure
        kind: ApiErrorKind,
        /// Full error description
        message: String,
    },

    /// Conversation history could not be written
    #[error("failed to persist conversation for user {user_id}")]
    Persistence {
        /// Owner of the history
        user_id: UserId,
        /// Storage failure
        #[source]
        source: StorageError,
    },
}

impl GateError {
    /// Wrap a failed API call, classifying it by its full description.
    pub fn external_api(api: impl Into<String>, error: &GembotError) -> Self {
        let message = error.describe();
        Self::ExternalApi {
            api: api.into(),
            kind: ApiErrorKind::classify(&message),
            message,
        }
    }

    /// Short text shown to the Discord user.
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited => {
                "❌ You're sending commands too quickly. Please slow down and try again in a minute."
                    .to_string()
            }
            Self::PermissionDenied { command } => {
                format!("❌ You don't have permission to use the `{command}` command.")
            }
            Self::OnCooldown { remaining, .. } => {
                format!(
                    "⏰ Command is on cooldown. Try again in {}.",
                    format_cooldown(*remaining)
                )
            }
            Self::Validation(err) => format!("❌ {err}"),
            Self::ExternalApi { api, kind, .. } => match kind {
                ApiErrorKind::Quota => {
                    format!("❌ {api} quota exceeded. Please try again later.")
                }
                ApiErrorKind::Auth => {
                    format!("❌ {api} authentication error. Please check configuration.")
                }
                ApiErrorKind::Timeout => format!("❌ {api} request timed out. Please try again."),
                ApiErrorKind::Network => {
                    "❌ Network error. Please check your connection and try again.".to_string()
                }
                ApiErrorKind::Unknown => {
                    "❌ An unexpected error occurred. Please try again later.".to_string()
                }
            },
            Self::Persistence { .. } => {
                "❌ An unexpected error occurred. Please try again later.".to_string()
            }
        }
    }
}

impl From<Rejection> for GateError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::RateLimited => Self::RateLimited,
            Rejection::PermissionDenied { command } => Self::PermissionDenied { command },
            Rejection::OnCooldown { command, remaining } => Self::OnCooldown { command, remaining },
        }
    }
}
