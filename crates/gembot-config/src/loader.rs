//! Configuration loading from YAML files, `.env` and environment variables.

use crate::schema::Config;
use gembot_common::UserId;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "GEMBOT_CONFIG_PATH";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading a configuration file
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Offending variable
        var: String,
        /// Parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration the way the bot does at startup.
    ///
    /// Reads `.env` if present, then the file named by `explicit_path`, else
    /// `GEMBOT_CONFIG_PATH`, else `config.yaml`/`config.yml` in the working
    /// directory, else defaults. Environment overrides are applied last and
    /// the result is validated.
    pub fn load(explicit_path: Option<&Path>) -> Result<Config, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let path = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from))
            .or_else(|| {
                ["config.yaml", "config.yml"]
                    .iter()
                    .map(PathBuf::from)
                    .find(|candidate| candidate.exists())
            });

        let mut config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load_file(&path)?
            }
            None => {
                info!("No configuration file found, using defaults");
                Config::default()
            }
        };

        Self::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file without applying overrides or validation.
    pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse a YAML document without applying overrides or validation.
    pub fn from_yaml_str(content: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |var| env::var(var).ok())
    }

    /// Apply overrides using `lookup` as the variable source.
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            config.discord.token = token;
        }
        if let Some(prefix) = lookup("COMMAND_PREFIX") {
            config.discord.command_prefix = prefix;
        }

        if let Some(key) = lookup("GEMINI_API_KEY") {
            config.gemini.api_key = key;
        }
        if let Some(model) = lookup("GEMINI_TEXT_MODEL") {
            config.gemini.text_model = model;
        }
        if let Some(model) = lookup("GEMINI_PRO_MODEL") {
            config.gemini.pro_model = model;
        }

        let cooldowns = &mut config.cooldowns;
        for (var, slot) in [
            ("COOLDOWN_GEMINI", &mut cooldowns.gemini),
            ("COOLDOWN_VISION", &mut cooldowns.vision),
            ("COOLDOWN_TRANSLATE", &mut cooldowns.translate),
            ("COOLDOWN_SUMMARIZE", &mut cooldowns.summarize),
            ("COOLDOWN_CODE", &mut cooldowns.code),
            ("COOLDOWN_IMAGINE", &mut cooldowns.imagine),
            ("COOLDOWN_RESET", &mut cooldowns.reset),
            ("COOLDOWN_TEMPERATURE", &mut cooldowns.temperature),
        ] {
            if let Some(seconds) = parse_var(&lookup, var)? {
                *slot = seconds;
            }
        }

        if let Some(value) = parse_var(&lookup, "MAX_REQUESTS_PER_MINUTE")? {
            config.limits.max_requests_per_minute = value;
        }
        if let Some(value) = parse_var(&lookup, "MAX_MESSAGE_LENGTH")? {
            config.limits.max_message_length = value;
        }
        if let Some(value) = parse_var(&lookup, "MAX_IMAGE_SIZE_MB")? {
            config.limits.max_image_size_mb = value;
        }
        if let Some(value) = parse_var(&lookup, "MAX_RESPONSE_LENGTH")? {
            config.limits.max_response_length = value;
        }

        if let Some(value) = parse_var(&lookup, "CONVERSATION_MEMORY_LIMIT")? {
            config.conversation.memory_limit = value;
        }
        if let Some(dir) = lookup("CONVERSATION_STORAGE_DIR") {
            config.conversation.storage_dir = PathBuf::from(dir);
        }

        if let Some(names) = lookup("ADMIN_ROLE_NAMES") {
            config.permissions.admin_role_names = split_list(&names)
                .map(str::to_string)
                .collect();
        }
        if let Some(ids) = lookup("ADMIN_USER_IDS") {
            config.permissions.admin_user_ids = split_list(&ids)
                .map(|id| {
                    id.parse::<UserId>().map_err(|e| ConfigError::EnvParseError {
                        var: "ADMIN_USER_IDS".to_string(),
                        source: Box::new(e),
                    })
                })
                .collect::<Result<_, _>>()?;
        }

        if let Some(value) = parse_var(&lookup, "ENABLE_IMAGE_ANALYSIS")? {
            config.features.image_analysis = value;
        }
        if let Some(value) = parse_var(&lookup, "ENABLE_CONVERSATION_MEMORY")? {
            config.features.conversation_memory = value;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level.to_lowercase();
        }
        if let Some(file) = lookup("LOG_FILE") {
            config.logging.file = (!file.trim().is_empty()).then_some(file);
        }

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(var)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::EnvParseError {
                    var: var.to_string(),
                    source: Box::new(e),
                })
        })
        .transpose()
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("COMMAND_PREFIX", "?"),
            ("COOLDOWN_VISION", "9"),
            ("MAX_REQUESTS_PER_MINUTE", " 7 "),
            ("ADMIN_ROLE_NAMES", "Staff, Owner,,"),
            ("ADMIN_USER_IDS", "1,2"),
            ("ENABLE_IMAGE_ANALYSIS", "false"),
            ("LOG_LEVEL", "DEBUG"),
        ]);

        ConfigLoader::apply_overrides_from(&mut config, lookup).unwrap();

        assert_eq!(config.discord.token, "abc");
        assert_eq!(config.discord.command_prefix, "?");
        assert_eq!(config.cooldowns.vision, 9);
        assert_eq!(config.cooldowns.gemini, 3);
        assert_eq!(config.limits.max_requests_per_minute, 7);
        assert_eq!(config.permissions.admin_role_names, vec!["Staff", "Owner"]);
        assert_eq!(config.permissions.admin_user_ids, vec![UserId(1), UserId(2)]);
        assert!(!config.features.image_analysis);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_parse_failure_names_variable() {
        let mut config = Config::default();
        let lookup = lookup_from(&[("COOLDOWN_CODE", "soon")]);

        let err = ConfigLoader::apply_overrides_from(&mut config, lookup).unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref var, .. } if var == "COOLDOWN_CODE"));
    }

    #[test]
    fn test_invalid_admin_id() {
        let mut config = Config::default();
        let lookup = lookup_from(&[("ADMIN_USER_IDS", "12,abc")]);

        let err = ConfigLoader::apply_overrides_from(&mut config, lookup).unwrap_err();
        assert!(err.to_string().contains("ADMIN_USER_IDS"));
    }

    #[test]
    fn test_empty_log_file_disables_file_logging() {
        let mut config = Config::default();
        ConfigLoader::apply_overrides_from(&mut config, lookup_from(&[("LOG_FILE", "")])).unwrap();
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ConfigLoader::load_file(Path::new("/nonexistent/gembot.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/gembot.yaml"));
    }
}
