//! Configuration schema definitions.

use gembot_common::{GenerationConfig, LoggingConfig, UserId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for gembot.
///
/// Every section falls back to its defaults when omitted from the YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Discord connection settings.
    pub discord: DiscordConfig,
    /// Gemini API settings.
    pub gemini: GeminiConfig,
    /// Default sampling parameters.
    pub generation: GenerationSettings,
    /// Per-command cooldown windows.
    pub cooldowns: CooldownConfig,
    /// Request and payload limits.
    pub limits: LimitsConfig,
    /// Conversation memory settings.
    pub conversation: ConversationConfig,
    /// Admin detection settings.
    pub permissions: PermissionsConfig,
    /// Feature toggles.
    pub features: FeaturesConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Discord bot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token.
    pub token: String,
    /// Prefix for text commands.
    pub command_prefix: String,
}

/// Gemini API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key.
    pub api_key: String,
    /// Model used for chat, vision and the utility commands.
    pub text_model: String,
    /// Larger model reserved for heavier prompts.
    pub pro_model: String,
    /// REST endpoint base.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout_seconds: u64,
}

/// Default sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Top-k cutoff.
    pub top_k: u32,
    /// Maximum reply tokens.
    pub max_output_tokens: u32,
}

impl GenerationSettings {
    /// Sampling parameters as sent to the API.
    pub fn to_generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

/// Cooldown windows in seconds, one per gated command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// `gemini` window.
    pub gemini: u64,
    /// `vision` window.
    pub vision: u64,
    /// `translate` window.
    pub translate: u64,
    /// `summarize` window.
    pub summarize: u64,
    /// `code` window.
    pub code: u64,
    /// `imagine` window.
    pub imagine: u64,
    /// `reset` window.
    pub reset: u64,
    /// `temperature` window.
    pub temperature: u64,
}

impl CooldownConfig {
    /// Commands that carry a cooldown, in display order.
    pub const COMMANDS: [&'static str; 8] = [
        "gemini",
        "vision",
        "translate",
        "summarize",
        "code",
        "imagine",
        "reset",
        "temperature",
    ];

    /// Window for a command name, if it has one.
    pub fn seconds_for(&self, command: &str) -> Option<u64> {
        match command {
            "gemini" => Some(self.gemini),
            "vision" => Some(self.vision),
            "translate" => Some(self.translate),
            "summarize" => Some(self.summarize),
            "code" => Some(self.code),
            "imagine" => Some(self.imagine),
            "reset" => Some(self.reset),
            "temperature" => Some(self.temperature),
            _ => None,
        }
    }

    /// Every `(command, window)` pair.
    pub fn windows(&self) -> Vec<(&'static str, Duration)> {
        Self::COMMANDS
            .iter()
            .filter_map(|&command| {
                self.seconds_for(command)
                    .map(|seconds| (command, Duration::from_secs(seconds)))
            })
            .collect()
    }
}

/// Request and payload limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Requests allowed per user in any 60 second window.
    pub max_requests_per_minute: u32,
    /// Maximum prompt length in characters.
    pub max_message_length: usize,
    /// Maximum attachment size in megabytes.
    pub max_image_size_mb: u64,
    /// Maximum characters per outgoing Discord message.
    pub max_response_length: usize,
}

/// Conversation memory settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Number of user/model exchanges kept per user.
    pub memory_limit: usize,
    /// Directory holding one JSON file per user.
    pub storage_dir: PathBuf,
}

/// Admin detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Role names that grant admin rights.
    pub admin_role_names: Vec<String>,
    /// User IDs that always have admin rights.
    pub admin_user_ids: Vec<UserId>,
}

/// Feature toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Enables the `vision` command.
    pub image_analysis: bool,
    /// Enables per-user history for the `gemini` command.
    pub conversation_memory: bool,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level filter directive.
    pub level: String,
    /// Log file; `None` logs to the console only.
    pub file: Option<String>,
    /// Emit JSON lines on the console.
    pub json: bool,
}

impl LoggingSettings {
    /// Settings for [`gembot_common::init_logging`].
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            json_format: self.json,
            file_path: self.file.clone(),
            ..LoggingConfig::default()
        }
    }
}
