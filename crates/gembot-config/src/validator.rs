//! Semantic checks applied after loading.

use crate::loader::ConfigError;
use crate::schema::Config;

/// Check that a loaded configuration is usable.
///
/// All problems are reported at once, separated by `; `.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut problems = Vec::new();

    if config.discord.token.trim().is_empty() {
        problems.push("discord.token must be set".to_string());
    }
    if config.discord.command_prefix.is_empty() {
        problems.push("discord.command_prefix must not be empty".to_string());
    }
    if config.gemini.api_key.trim().is_empty() {
        problems.push("gemini.api_key must be set".to_string());
    }
    if config.gemini.request_timeout_seconds == 0 {
        problems.push("gemini.request_timeout_seconds must be greater than 0".to_string());
    }
    if !(0.0..=1.0).contains(&config.generation.temperature) {
        problems.push(format!(
            "generation.temperature must be between 0.0 and 1.0, got {}",
            config.generation.temperature
        ));
    }
    if !(0.0..=1.0).contains(&config.generation.top_p) {
        problems.push(format!(
            "generation.top_p must be between 0.0 and 1.0, got {}",
            config.generation.top_p
        ));
    }
    if config.limits.max_requests_per_minute == 0 {
        problems.push("limits.max_requests_per_minute must be greater than 0".to_string());
    }
    if config.limits.max_message_length == 0 {
        problems.push("limits.max_message_length must be greater than 0".to_string());
    }
    if config.limits.max_response_length == 0 {
        problems.push("limits.max_response_length must be greater than 0".to_string());
    }
    if config.conversation.memory_limit == 0 {
        problems.push("conversation.memory_limit must be greater than 0".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(problems.join("; ")))
    }
}

impl Config {
    /// See [`validate_config`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_config(self)
    }
}
