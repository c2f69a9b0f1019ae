//! Command building blocks driven end to end against a scripted model.

use gembot_commands::chat::chat_turn;
use gembot_commands::prompts::ensure_code_fence;
use gembot_commands::tools::{code_request, translate_request};
use gembot_commands::Data;
use gembot_common::test_utils::{create_temp_dir, discord_fixtures, init_test_logging, ScriptedGenerator};
use gembot_common::{Content, TextGenerator};
use gembot_config::{Config, ConfigCache};
use gembot_gate::{ApiErrorKind, Caller, GateError, JsonFileStorage, RequestGate};
use std::sync::Arc;

fn data_with(config: Config, generator: Arc<ScriptedGenerator>, dir: &std::path::Path) -> Data {
    init_test_logging();
    let storage = Arc::new(JsonFileStorage::new(dir));
    let gate = RequestGate::with_system_clock(&config, storage).unwrap();
    Data::new(Arc::new(ConfigCache::new(config)), Arc::new(gate), generator)
}

#[tokio::test]
async fn test_chat_turn_carries_history_into_next_request() {
    let dir = create_temp_dir();
    let generator = Arc::new(ScriptedGenerator::replying("Paris"));
    let data = data_with(Config::default(), generator.clone(), dir.path());
    let user = discord_fixtures::regular_user();

    for prompt in ["capital of France?", "and of Italy?"] {
        assert_eq!(chat_turn(&data, user, prompt).await.unwrap(), "Paris");
    }

    let requests = generator.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].model, data.config.get().gemini.text_model);
    assert_eq!(requests[0].contents, vec![Content::user("capital of France?")]);
    assert_eq!(
        requests[1].contents,
        vec![
            Content::user("capital of France?"),
            Content::model("Paris"),
            Content::user("and of Italy?"),
        ]
    );
    assert_eq!(data.gate.history(user).len(), 4);
}

#[tokio::test]
async fn test_failed_chat_turn_is_classified_and_not_recorded() {
    let dir = create_temp_dir();
    let generator = Arc::new(ScriptedGenerator::failing("quota exceeded (rate limit)"));
    let data = data_with(Config::default(), generator.clone(), dir.path());
    let user = discord_fixtures::regular_user();

    let error = chat_turn(&data, user, "hello").await.unwrap_err();

    assert!(matches!(
        error,
        GateError::ExternalApi {
            kind: ApiErrorKind::Quota,
            ..
        }
    ));
    assert_eq!(
        error.user_message(),
        "❌ Gemini quota exceeded. Please try again later."
    );
    assert_eq!(generator.requests().len(), 1);
    assert!(data.gate.history(user).is_empty());
}

#[tokio::test]
async fn test_chat_turn_without_memory_sends_only_the_prompt() {
    let dir = create_temp_dir();
    let mut config = Config::default();
    config.features.conversation_memory = false;
    let generator = Arc::new(ScriptedGenerator::replying("Rome"));
    let data = data_with(config, generator.clone(), dir.path());
    let user = discord_fixtures::regular_user();

    data.gate.record_exchange(user, "earlier question", "earlier answer");

    let reply = chat_turn(&data, user, "capital of Italy?").await.unwrap();
    assert_eq!(reply, "Rome");

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].contents, vec![Content::user("capital of Italy?")]);
    assert_eq!(data.gate.history(user).len(), 2);
}

#[tokio::test]
async fn test_tool_requests_use_fixed_temperature() {
    let dir = create_temp_dir();
    let generator = Arc::new(ScriptedGenerator::replying("Bonjour"));
    let data = data_with(Config::default(), generator.clone(), dir.path());
    let config = data.config.get();

    data.generator
        .generate(translate_request(&config, "French", "Hello"))
        .await
        .unwrap();
    data.generator
        .generate(code_request(&config, "rust", "hello world"))
        .await
        .unwrap();

    let requests = generator.requests();
    assert_eq!(requests[0].model, config.gemini.text_model);
    assert_eq!(requests[0].generation_config.temperature, 0.2);
    assert_eq!(
        requests[0].generation_config.max_output_tokens,
        config.generation.max_output_tokens
    );
    assert_eq!(requests[1].model, config.gemini.pro_model);
}

#[test]
fn test_temperature_update_is_visible_to_later_commands() {
    let dir = create_temp_dir();
    let data = data_with(
        Config::default(),
        Arc::new(ScriptedGenerator::replying("")),
        dir.path(),
    );
    let admin = Caller::new(discord_fixtures::regular_user()).with_administrator(true);

    assert!(data.gate.admit(&admin, "temperature").is_admitted());
    data.config.modify(|config| config.generation.temperature = 0.1);

    let generation = data.config.get().generation.to_generation_config();
    assert_eq!(generation.temperature, 0.1);
}

#[test]
fn test_code_reply_is_fenced_once() {
    let fenced = ensure_code_fence("rust", "fn main() {}");
    assert_eq!(ensure_code_fence("rust", &fenced), fenced);
}
