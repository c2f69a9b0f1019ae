//! Reply helpers shared by all commands: embeds, chunked messages, gate
//! rejections and model calls.

use crate::caller::caller_of;
use crate::framework::{Context, Error};
use gembot_common::{split_long_message, GenerateRequest};
use gembot_gate::{GateError, ValidationError};
use poise::serenity_prelude as serenity;
use tracing::error;

/// Generic failure text for errors that carry no user-facing detail.
pub const UNEXPECTED_ERROR: &str = "❌ An unexpected error occurred. Please try again later.";

/// Informational embeds.
pub const INFO_COLOUR: u32 = 0x34_98DB;

/// Longest embed field value Discord accepts.
pub const FIELD_LIMIT: usize = 1024;
/// Longest embed description Discord accepts.
pub const DESCRIPTION_LIMIT: usize = 4096;

/// Blue embed with a title and description.
pub fn info_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(INFO_COLOUR)
}

/// Send an embed as the reply.
pub async fn send_embed(ctx: Context<'_>, embed: serenity::CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Send `text`, split into as many messages as needed.
pub async fn say_chunked(ctx: Context<'_>, text: &str, max_length: usize) -> Result<(), Error> {
    for chunk in split_long_message(text, max_length) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Reply with the invoked command's usage line.
pub async fn say_usage(ctx: Context<'_>) -> Result<(), Error> {
    let command = &ctx.command().name;
    let reply = crate::info::usage_for(ctx.prefix(), command)
        .unwrap_or_else(|| format!("Usage: {}{command}", ctx.prefix()));
    ctx.say(reply).await?;
    Ok(())
}

/// Tell the user why their request failed.
pub async fn say_error(ctx: Context<'_>, error: &GateError) -> Result<(), Error> {
    ctx.say(error.user_message()).await?;
    Ok(())
}

/// Run the full admission pipeline for `command`.
///
/// Returns `false` after telling the user why when the command must not run.
pub async fn admit(ctx: Context<'_>, command: &str) -> Result<bool, Error> {
    let caller = caller_of(ctx).await;
    match ctx.data().gate.admit(&caller, command).into_result() {
        Ok(()) => Ok(true),
        Err(rejection) => {
            say_error(ctx, &rejection).await?;
            Ok(false)
        }
    }
}

/// Permission check only, for admin commands that carry no cooldown.
pub async fn authorize(ctx: Context<'_>, command: &str) -> Result<bool, Error> {
    let caller = caller_of(ctx).await;
    match ctx.data().gate.authorize(&caller, command).into_result() {
        Ok(()) => Ok(true),
        Err(rejection) => {
            say_error(ctx, &rejection).await?;
            Ok(false)
        }
    }
}

/// Validate and sanitize free text, replying with the error when it is refused.
///
/// `subject` names the text in the length error, e.g. "Prompt" or "Text".
pub async fn clean_or_reply(
    ctx: Context<'_>,
    text: &str,
    subject: &str,
) -> Result<Option<String>, Error> {
    match ctx.data().gate.validator().clean_text(text) {
        Ok(cleaned) => Ok(Some(cleaned)),
        Err(ValidationError::TooLong { max, .. }) => {
            ctx.say(too_long_message(subject, max)).await?;
            Ok(None)
        }
        Err(err) => {
            say_error(ctx, &GateError::from(err)).await?;
            Ok(None)
        }
    }
}

/// "Prompt is too long" style message for the given subject.
pub fn too_long_message(subject: &str, max_length: usize) -> String {
    format!("❌ {subject} is too long. Maximum length: {max_length} characters.")
}

/// Call the model, replying with a classified error on failure.
pub async fn generate(ctx: Context<'_>, request: GenerateRequest) -> Result<Option<String>, Error> {
    match ctx.data().generator.generate(request).await {
        Ok(text) => Ok(Some(text)),
        Err(err) => {
            report_failure(ctx, &GateError::external_api("Gemini", &err)).await?;
            Ok(None)
        }
    }
}

/// Log a failed model call and tell the user what went wrong.
pub async fn report_failure(ctx: Context<'_>, failure: &GateError) -> Result<(), Error> {
    error!(
        command = %ctx.command().name,
        user_id = %ctx.author().id,
        "{}",
        failure
    );
    say_error(ctx, failure).await
}
