//! Default values for every configuration section.

use crate::schema::*;
use gembot_common::gemini::DEFAULT_BASE_URL;
use std::path::PathBuf;

/// Role names treated as admin when none are configured.
pub const DEFAULT_ADMIN_ROLE_NAMES: [&str; 4] = ["Admin", "Administrator", "Moderator", "Bot Admin"];

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            command_prefix: "!".to_string(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            text_model: "gemini-2.5-flash".to_string(),
            pro_model: "gemini-2.5-pro".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_seconds: 60,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            gemini: 3,
            vision: 5,
            translate: 2,
            summarize: 4,
            code: 3,
            imagine: 3,
            reset: 1,
            temperature: 1,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_requests_per_minute: 20,
            max_message_length: 4000,
            max_image_size_mb: 20,
            max_response_length: 2000,
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            memory_limit: 10,
            storage_dir: PathBuf::from("conversations"),
        }
    }
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            admin_role_names: DEFAULT_ADMIN_ROLE_NAMES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            admin_user_ids: Vec::new(),
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            image_analysis: true,
            conversation_memory: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("bot.log".to_string()),
            json: false,
        }
    }
}
