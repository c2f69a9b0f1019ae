//! Startup behaviour that does not need a Discord connection.

use gembot_bot::{BotError, GemBot};
use gembot_common::test_utils::{create_temp_dir, init_test_logging};
use gembot_config::{Config, ConfigLoader};

fn config_in(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.discord.token = "token".to_string();
    config.gemini.api_key = "key".to_string();
    config.conversation.storage_dir = dir.to_path_buf();
    config
}

#[test]
fn test_startup_skips_unreadable_history_files() {
    init_test_logging();
    let dir = create_temp_dir();
    std::fs::write(dir.path().join("1.json"), r#"[{"role":"user","text":"kept"}]"#).unwrap();
    std::fs::write(dir.path().join("2.json"), "{ not json").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    assert!(GemBot::new(config_in(dir.path())).is_ok());
}

#[test]
fn test_startup_with_missing_storage_dir() {
    init_test_logging();
    let dir = create_temp_dir();
    assert!(GemBot::new(config_in(&dir.path().join("not-created-yet"))).is_ok());
}

#[test]
fn test_invalid_config_file_is_a_config_error() {
    let dir = create_temp_dir();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "generation:\n  temperature: 3.0\n").unwrap();

    let config = ConfigLoader::load_file(&path).unwrap();
    let error: BotError = config.validate().unwrap_err().into();
    assert!(matches!(error, BotError::Config(_)));
}
