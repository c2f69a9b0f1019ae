//! Core bot logic using the Poise framework.

use crate::error::BotResult;
use gembot_commands::{framework_options, Data};
use gembot_common::{GeminiClient, GeminiClientConfig, TextGenerator};
use gembot_config::{Config, ConfigCache};
use gembot_gate::{JsonFileStorage, RequestGate};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};

/// Main bot structure.
pub struct GemBot {
    config: Arc<ConfigCache>,
    gate: Arc<RequestGate>,
    generator: Arc<dyn TextGenerator>,
}

impl GemBot {
    /// Builds the Gemini client and request gate from `config`.
    ///
    /// Persisted conversations are loaded here, before connecting.
    pub fn new(config: Config) -> BotResult<Self> {
        let client_config = GeminiClientConfig::new(config.gemini.api_key.clone())
            .with_base_url(config.gemini.base_url.clone())
            .with_timeout(config.gemini.request_timeout_seconds);
        let generator = Arc::new(GeminiClient::new(client_config)?);

        let storage = Arc::new(JsonFileStorage::new(config.conversation.storage_dir.clone()));
        let gate = RequestGate::with_system_clock(&config, storage)?;
        let stats = gate.conversation_stats();
        info!(
            users = stats.users_with_history,
            turns = stats.total_turns,
            dir = %config.conversation.storage_dir.display(),
            "Loaded conversation histories"
        );

        Ok(Self::with_parts(config, Arc::new(gate), generator))
    }

    /// Assembles a bot from already-built parts.
    pub fn with_parts(
        config: Config,
        gate: Arc<RequestGate>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(ConfigCache::new(config)),
            gate,
            generator,
        }
    }

    /// Gateway intents the bot needs: message content for prefix commands
    /// and guild members for role-based admin checks.
    pub fn intents() -> serenity::GatewayIntents {
        serenity::GatewayIntents::non_privileged()
            | serenity::GatewayIntents::MESSAGE_CONTENT
            | serenity::GatewayIntents::GUILD_MEMBERS
    }

    /// Connects to Discord and runs until the gateway closes or Ctrl-C is received.
    pub async fn start(&self) -> BotResult<()> {
        let snapshot = self.config.get();
        let config = Arc::clone(&self.config);
        let gate = Arc::clone(&self.gate);
        let generator = Arc::clone(&self.generator);

        let framework = poise::Framework::builder()
            .options(framework_options(snapshot.discord.command_prefix.clone()))
            .setup(move |ctx, ready, framework| {
                Box::pin(async move {
                    info!(
                        user = %ready.user.name,
                        guilds = ready.guilds.len(),
                        "Connected to Discord"
                    );
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    Ok(Data::new(config, gate, generator))
                })
            })
            .build();

        let mut client = serenity::ClientBuilder::new(&snapshot.discord.token, Self::intents())
            .framework(framework)
            .await?;

        let shard_manager = client.shard_manager.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown signal received, closing shards");
                    shard_manager.shutdown_all().await;
                }
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
        });

        client.start().await?;
        info!("Bot stopped");
        Ok(())
    }
}
