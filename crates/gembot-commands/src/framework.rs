//! Poise framework setup and command registration logic.

use gembot_common::TextGenerator;
use gembot_config::ConfigCache;
use gembot_gate::RequestGate;
use std::sync::Arc;
use tracing::error;

/// Application data accessible in all commands.
pub struct Data {
    /// Live configuration; the temperature command writes to it.
    pub config: Arc<ConfigCache>,
    /// Admission pipeline and per-user state.
    pub gate: Arc<RequestGate>,
    /// Model backend.
    pub generator: Arc<dyn TextGenerator>,
}

impl Data {
    /// Bundle the shared state handed to every command.
    pub fn new(
        config: Arc<ConfigCache>,
        gate: Arc<RequestGate>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config,
            gate,
            generator,
        }
    }
}

/// Application error type for commands.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Command context type.
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// All registered commands.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        crate::chat::gemini(),
        crate::chat::vision(),
        crate::chat::reset(),
        crate::admin::temperature(),
        crate::admin::stats(),
        crate::admin::reset_all(),
        crate::tools::translate(),
        crate::tools::summarize(),
        crate::tools::code(),
        crate::tools::imagine(),
        crate::info::cooldown_status(),
        crate::info::help(),
    ]
}

/// Framework options with the given command prefix.
pub fn framework_options(prefix: impl Into<String>) -> poise::FrameworkOptions<Data, Error> {
    poise::FrameworkOptions {
        commands: commands(),
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(prefix.into()),
            ..Default::default()
        },
        on_error: |error| Box::pin(on_error(error)),
        ..Default::default()
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                command = %ctx.command().name,
                user_id = %ctx.author().id,
                "Command failed: {}",
                error
            );
            if let Err(e) = ctx.say(crate::replies::UNEXPECTED_ERROR).await {
                error!("Failed to send error reply: {}", e);
            }
        }
        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
            let usage = crate::info::usage_for(ctx.prefix(), &ctx.command().name);
            let reply = usage.unwrap_or_else(|| format!("❌ {error}"));
            if let Err(e) = ctx.say(reply).await {
                error!("Failed to send argument error reply: {}", e);
            }
        }
        poise::FrameworkError::UnknownCommand { .. } => {}
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
