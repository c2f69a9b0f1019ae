//! # gembot
//!
//! Discord bot that relays chat, image and tool prompts to Google Gemini,
//! guarded by per-user cooldowns, a per-minute rate limit and admin-only
//! commands, with persistent per-user conversation memory.
//!
//! This crate wires configuration, logging, the request gate and the Poise
//! framework together and owns the process lifecycle.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod error;

pub use bot::*;
pub use error::*;
