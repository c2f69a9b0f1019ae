//! # gembot Config
//!
//! Typed configuration for gembot: schema, defaults, loading from YAML and
//! the environment, validation, and a lock-free cache for runtime updates.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use cache::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
