//! Help and cooldown status. Neither passes through the gate.

use crate::caller::caller_of;
use crate::framework::{Context, Error};
use crate::replies::{send_embed, INFO_COLOUR};
use gembot_common::UserId;
use poise::serenity_prelude as serenity;
use std::time::Duration;

/// Argument synopsis per command, without the prefix.
const USAGES: [(&str, &str); 7] = [
    ("gemini", "gemini [question or prompt]"),
    ("vision", "vision [description or question]"),
    ("temperature", "temperature [value]"),
    ("translate", "translate [target language] [text]"),
    ("summarize", "summarize [text]"),
    ("code", "code [language] [description]"),
    ("imagine", "imagine [description]"),
];

/// `"Usage: <prefix><synopsis>"` for commands that take arguments.
pub fn usage_for(prefix: &str, command: &str) -> Option<String> {
    USAGES
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, synopsis)| format!("Usage: {prefix}{synopsis}"))
}

/// Field value for one line of the cooldown overview.
pub fn cooldown_line(remaining: Duration) -> String {
    if remaining.is_zero() {
        "✅ Ready".to_string()
    } else {
        format!("⏳ {:.1}s remaining", remaining.as_secs_f64())
    }
}

/// Sections of the help embed as `(title, body)` pairs.
pub fn help_sections(prefix: &str, admin: bool) -> Vec<(&'static str, String)> {
    let mut sections = vec![
        (
            "📝 Basic Commands",
            format!(
                "`{prefix}gemini [question]` - Chat with Gemini AI\n\
                 `{prefix}vision [description]` - Analyze images\n\
                 `{prefix}reset` - Reset conversation history\n\
                 `{prefix}cooldown_status` - Check cooldown status"
            ),
        ),
        (
            "⚡ Advanced Commands",
            format!(
                "`{prefix}translate [language] [text]` - Translate text\n\
                 `{prefix}summarize [text]` - Summarize content\n\
                 `{prefix}code [language] [description]` - Generate code\n\
                 `{prefix}imagine [description]` - Optimize image prompts"
            ),
        ),
    ];

    if admin {
        sections.push((
            "🔧 Admin Commands",
            format!(
                "`{prefix}temperature [value]` - Set AI temperature\n\
                 `{prefix}stats` - Show bot statistics\n\
                 `{prefix}reset_all` - Reset all conversations"
            ),
        ));
    }

    sections.push((
        "ℹ️ Information",
        format!(
            "• Commands have cooldowns to prevent spam\n\
             • Admins bypass cooldowns but not the rate limit\n\
             • Use `{prefix}cooldown_status` to check your cooldowns"
        ),
    ));
    sections
}

/// Check your current cooldown status.
#[poise::command(prefix_command, slash_command, aliases("cd_status"))]
pub async fn cooldown_status(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = UserId(ctx.author().id.get());
    let prefix = ctx.prefix();

    let embed = ctx
        .data()
        .gate
        .cooldown_overview(user_id)
        .into_iter()
        .fold(
            serenity::CreateEmbed::new()
                .title("⏰ Your Cooldown Status")
                .colour(INFO_COLOUR),
            |embed, (command, remaining)| {
                embed.field(format!("{prefix}{command}"), cooldown_line(remaining), true)
            },
        );
    send_embed(ctx, embed).await
}

/// Display list of available commands.
#[poise::command(prefix_command, slash_command, aliases("commands", "info"))]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let caller = caller_of(ctx).await;
    let admin = ctx.data().gate.is_admin(&caller);

    let embed = help_sections(ctx.prefix(), admin).into_iter().fold(
        serenity::CreateEmbed::new()
            .title("🤖 Gemini AI Discord Bot Help")
            .description("Use these commands to interact with Gemini AI.")
            .colour(INFO_COLOUR),
        |embed, (title, body)| embed.field(title, body, false),
    );
    send_embed(
        ctx,
        embed.footer(serenity::CreateEmbedFooter::new(
            "Gemini AI Discord Bot | Powered by Google Gemini",
        )),
    )
    .await
}
