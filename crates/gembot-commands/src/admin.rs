//! Admin-only commands.

use crate::framework::{Context, Error};
use crate::replies::{admit, authorize, send_embed, INFO_COLOUR};
use gembot_gate::InputValidator;
use poise::serenity_prelude as serenity;
use tracing::info;

/// Show or set the sampling temperature.
#[poise::command(prefix_command, slash_command, aliases("temp"))]
pub async fn temperature(
    ctx: Context<'_>,
    #[description = "New value between 0.0 and 1.0"] value: Option<f32>,
) -> Result<(), Error> {
    if !admit(ctx, "temperature").await? {
        return Ok(());
    }

    let Some(value) = value else {
        let current = ctx.data().config.get().generation.temperature;
        ctx.say(format!("ℹ️ Current temperature value: {current}"))
            .await?;
        return Ok(());
    };

    if !InputValidator::validate_temperature(value) {
        ctx.say("❌ Temperature value must be between 0.0 and 1.0.")
            .await?;
        return Ok(());
    }

    ctx.data()
        .config
        .modify(|config| config.generation.temperature = value);
    info!(user_id = %ctx.author().id, temperature = value, "Temperature updated");
    ctx.say(format!("✅ Temperature value set to {value}.")).await?;
    Ok(())
}

/// Show bot statistics.
#[poise::command(prefix_command, slash_command, aliases("statistics"))]
pub async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    if !authorize(ctx, "stats").await? {
        return Ok(());
    }

    let conversations = ctx.data().gate.conversation_stats();
    let guilds = ctx.cache().guild_count();

    let embed = serenity::CreateEmbed::new()
        .title("📊 Bot Statistics")
        .colour(INFO_COLOUR)
        .field(
            "Users with conversation history",
            conversations.users_with_history.to_string(),
            true,
        )
        .field(
            "Total conversation messages",
            conversations.total_turns.to_string(),
            true,
        )
        .field("Servers", guilds.to_string(), true);
    send_embed(ctx, embed).await
}

/// Reset every user's conversation history.
#[poise::command(prefix_command, slash_command, aliases("clear_all"))]
pub async fn reset_all(ctx: Context<'_>) -> Result<(), Error> {
    if !authorize(ctx, "reset_all").await? {
        return Ok(());
    }

    let cleared = ctx.data().gate.reset_all_histories();
    info!(user_id = %ctx.author().id, cleared, "All conversation histories reset");
    ctx.say("✅ All conversation histories have been reset.")
        .await?;
    Ok(())
}
