//! Conversational commands: text chat, image analysis and history reset.

use crate::framework::{Context, Data, Error};
use crate::prompts::{image_mime_type, DEFAULT_VISION_PROMPT};
use crate::replies::{admit, clean_or_reply, generate, report_failure, say_chunked, say_usage};
use gembot_common::{Content, GenerateRequest, InlineImage, Part, Role, UserId};
use gembot_gate::{ConversationTurn, GateError, InputValidator};
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

/// Request contents for a chat turn: prior history followed by the new prompt.
pub fn chat_contents(history: &[ConversationTurn], prompt: &str) -> Vec<Content> {
    history
        .iter()
        .map(|turn| Content::text(turn.role, turn.text.clone()))
        .chain(std::iter::once(Content::user(prompt)))
        .collect()
}

/// One chat turn for `user_id`.
///
/// With conversation memory on, the stored history goes out ahead of the
/// prompt and the exchange is recorded once the model answers. Failed calls
/// leave the history untouched.
pub async fn chat_turn(data: &Data, user_id: UserId, prompt: &str) -> Result<String, GateError> {
    let config = data.config.get();
    let memory = config.features.conversation_memory;

    let contents = if memory {
        chat_contents(&data.gate.history(user_id), prompt)
    } else {
        vec![Content::user(prompt)]
    };
    let request = GenerateRequest::from_contents(
        config.gemini.text_model.as_str(),
        contents,
        config.generation.to_generation_config(),
    );

    let reply = data
        .generator
        .generate(request)
        .await
        .map_err(|err| GateError::external_api("Gemini", &err))?;

    if memory {
        data.gate.record_exchange(user_id, prompt, &reply);
    }
    Ok(reply)
}

/// Chat with Gemini AI.
#[poise::command(prefix_command, slash_command, aliases("ai", "ask", "chat"))]
pub async fn gemini(
    ctx: Context<'_>,
    #[description = "Question or prompt"]
    #[rest]
    prompt: Option<String>,
) -> Result<(), Error> {
    let Some(prompt) = prompt.filter(|p| !p.trim().is_empty()) else {
        say_usage(ctx).await?;
        return Ok(());
    };

    if !admit(ctx, "gemini").await? {
        return Ok(());
    }
    let Some(prompt) = clean_or_reply(ctx, &prompt, "Prompt").await? else {
        return Ok(());
    };

    ctx.defer_or_broadcast().await?;

    let user_id = UserId(ctx.author().id.get());
    match chat_turn(ctx.data(), user_id, &prompt).await {
        Ok(reply) => {
            let max_length = ctx.data().config.get().limits.max_response_length;
            say_chunked(ctx, &reply, max_length).await
        }
        Err(err) => report_failure(ctx, &err).await,
    }
}

/// Analyze an attached image.
#[poise::command(prefix_command, slash_command, aliases("image", "analyze", "see"))]
pub async fn vision(
    ctx: Context<'_>,
    #[description = "Image to analyze"] image: Option<serenity::Attachment>,
    #[description = "Description or question"]
    #[rest]
    prompt: Option<String>,
) -> Result<(), Error> {
    let config = ctx.data().config.get();
    if !config.features.image_analysis {
        ctx.say("❌ Image analysis feature is disabled.").await?;
        return Ok(());
    }
    let Some(image) = image else {
        ctx.say(format!(
            "❌ Please attach an image. Usage: {}vision [description or question]",
            ctx.prefix()
        ))
        .await?;
        return Ok(());
    };

    if !admit(ctx, "vision").await? {
        return Ok(());
    }

    let Some(mime_type) = InputValidator::check_image_extension(&image.filename)
        .ok()
        .and_then(|()| image_mime_type(&image.filename))
    else {
        ctx.say("❌ Supported image formats: PNG, JPG, JPEG, GIF, WEBP")
            .await?;
        return Ok(());
    };
    if !ctx
        .data()
        .gate
        .validator()
        .validate_image_size(u64::from(image.size))
    {
        ctx.say(format!(
            "❌ Image too large. Maximum size: {}MB",
            config.limits.max_image_size_mb
        ))
        .await?;
        return Ok(());
    }

    let prompt = match prompt.filter(|p| !p.trim().is_empty()) {
        Some(prompt) => match clean_or_reply(ctx, &prompt, "Prompt").await? {
            Some(cleaned) if !cleaned.is_empty() => cleaned,
            Some(_) => DEFAULT_VISION_PROMPT.to_string(),
            None => return Ok(()),
        },
        None => DEFAULT_VISION_PROMPT.to_string(),
    };

    ctx.defer_or_broadcast().await?;

    let bytes = match image.download().await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(
                user_id = %ctx.author().id,
                url = %image.url,
                "Image download failed: {}",
                err
            );
            ctx.say("❌ Could not download the image.").await?;
            return Ok(());
        }
    };

    let contents = vec![Content {
        role: Some(Role::User),
        parts: vec![
            Part::Text(prompt),
            Part::InlineData(InlineImage::from_bytes(mime_type, &bytes)),
        ],
    }];
    let request = GenerateRequest::from_contents(
        config.gemini.text_model.as_str(),
        contents,
        config.generation.to_generation_config(),
    );

    let Some(reply) = generate(ctx, request).await? else {
        return Ok(());
    };
    say_chunked(ctx, &reply, config.limits.max_response_length).await
}

/// Reset your conversation history.
#[poise::command(prefix_command, slash_command, aliases("clear", "restart"))]
pub async fn reset(ctx: Context<'_>) -> Result<(), Error> {
    if !admit(ctx, "reset").await? {
        return Ok(());
    }

    let user_id = UserId(ctx.author().id.get());
    if ctx.data().gate.reset_history(user_id) {
        info!(user_id = %user_id, "Conversation history reset");
        ctx.say("✅ Conversation history has been reset.").await?;
    } else {
        ctx.say("ℹ️ No conversation history to reset.").await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_contents_keeps_history_order() {
        let history = vec![
            ConversationTurn::new(Role::User, "hi"),
            ConversationTurn::new(Role::Model, "hello"),
        ];

        let contents = chat_contents(&history, "how are you?");
        assert_eq!(
            contents,
            vec![
                Content::user("hi"),
                Content::model("hello"),
                Content::user("how are you?"),
            ]
        );
    }

    #[test]
    fn test_chat_contents_without_history() {
        assert_eq!(chat_contents(&[], "ping"), vec![Content::user("ping")]);
    }
}
