//! Test utilities and shared fixtures for gembot.
//!
//! Available to other crates through the `testing` feature.

use crate::error::{GembotError, Result};
use crate::gemini::{GenerateRequest, TextGenerator};
use crate::types::UserId;
use async_trait::async_trait;
use std::sync::{Mutex, Once};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call multiple times.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Create a temporary directory that is removed on drop.
#[cfg(any(test, feature = "tempfile"))]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Discord-flavoured fixtures.
pub mod discord_fixtures {
    use super::UserId;

    /// An ordinary member.
    pub fn regular_user() -> UserId {
        UserId(100_000_000_000_000_001)
    }

    /// Another ordinary member.
    pub fn other_user() -> UserId {
        UserId(100_000_000_000_000_002)
    }

    /// A member listed in the admin allow-list fixtures.
    pub fn admin_user() -> UserId {
        UserId(900_000_000_000_000_009)
    }
}

/// Configuration fixtures.
pub mod config_fixtures {
    /// Smallest YAML document that passes validation.
    pub fn minimal_config_yaml() -> &'static str {
        r#"
discord:
  token: "test_discord_token"
gemini:
  api_key: "test_gemini_key"
"#
    }

    /// YAML document overriding most sections.
    pub fn full_config_yaml() -> &'static str {
        r#"
discord:
  token: "test_discord_token"
  command_prefix: "?"
gemini:
  api_key: "test_gemini_key"
  text_model: "gemini-2.5-flash"
  pro_model: "gemini-2.5-pro"
generation:
  temperature: 0.5
  top_p: 0.9
  top_k: 32
  max_output_tokens: 1024
cooldowns:
  gemini: 10
  vision: 12
limits:
  max_requests_per_minute: 5
  max_message_length: 1000
conversation:
  memory_limit: 4
  storage_dir: "history"
permissions:
  admin_role_names: ["Staff"]
  admin_user_ids: [900000000000000009]
features:
  image_analysis: false
logging:
  level: "debug"
  file: null
"#
    }
}

/// A [`TextGenerator`] that returns canned output and records each request.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    reply: Option<String>,
    failure: Option<String>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedGenerator {
    /// Always reply with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            ..Default::default()
        }
    }

    /// Always fail with a Gemini error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(request);

        match (&self.reply, &self.failure) {
            (_, Some(message)) => Err(GembotError::gemini(message.clone())),
            (Some(reply), None) => Ok(reply.clone()),
            (None, None) => Ok(String::new()),
        }
    }
}
