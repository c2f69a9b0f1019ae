//! # gembot Common
//!
//! Shared types, errors, logging setup and the Gemini API client used by
//! every crate in the gembot workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod gemini;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{GembotError, Result};
pub use gemini::{
    Content, GeminiClient, GeminiClientConfig, GenerateRequest, GenerationConfig, InlineImage,
    Part, TextGenerator,
};
pub use logging::{init_logging, LoggingConfig};
pub use types::*;
pub use utils::*;
