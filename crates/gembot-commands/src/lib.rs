//! # gembot Commands
//!
//! Discord command implementations using the Poise framework.
//!
//! Every command that reaches the model or touches per-user state passes
//! through the [`gembot_gate::RequestGate`] before doing any work.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod admin;
pub mod caller;
pub mod chat;
pub mod framework;
pub mod info;
pub mod prompts;
pub mod replies;
pub mod tools;

pub use framework::*;
