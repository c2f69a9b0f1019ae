//! # gembot Gate
//!
//! Admission control for AI-invoking commands. A [`RequestGate`] owns every
//! piece of per-user state the bot keeps: cooldown timestamps, rate-limit
//! windows and conversation histories. Command handlers call
//! [`RequestGate::admit`] first and only talk to the model when it returns
//! [`Admission::Admitted`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod conversation;
pub mod cooldown;
pub mod error;
pub mod gate;
pub mod permissions;
pub mod rate_limit;
pub mod validator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use conversation::{
    ConversationStats, ConversationStorage, ConversationStore, ConversationTurn, JsonFileStorage,
    StorageError,
};
pub use cooldown::CooldownTracker;
pub use error::{ApiErrorKind, GateError, Rejection};
pub use gate::{Admission, RequestGate};
pub use permissions::{Caller, PermissionResolver, ADMIN_ONLY_COMMANDS};
pub use rate_limit::{RateLimiter, RATE_LIMIT_WINDOW};
pub use validator::{sanitize, InputValidator, ValidationError};
