//! Single-shot tool commands. None of them touch conversation history.

use crate::framework::{Context, Error};
use crate::prompts::{
    code_prompt, ensure_code_fence, imagine_prompt, long_enough_to_summarize, summarize_prompt,
    tool_generation, translate_prompt, IMAGINE_SYSTEM_PROMPT,
};
use crate::replies::{
    admit, clean_or_reply, generate, info_embed, say_chunked, say_usage, send_embed,
    DESCRIPTION_LIMIT, FIELD_LIMIT,
};
use gembot_common::{truncate_string, GenerateRequest};
use gembot_config::Config;
use gembot_gate::sanitize;

fn present(arg: Option<String>) -> Option<String> {
    arg.filter(|value| !value.trim().is_empty())
}

/// Translation request: text model at a low fixed temperature.
pub fn translate_request(config: &Config, language: &str, text: &str) -> GenerateRequest {
    GenerateRequest::new(
        config.gemini.text_model.as_str(),
        translate_prompt(language, text),
        tool_generation(config.generation.to_generation_config(), 0.2, None),
    )
}

/// Code generation goes to the pro model.
pub fn code_request(config: &Config, language: &str, description: &str) -> GenerateRequest {
    GenerateRequest::new(
        config.gemini.pro_model.as_str(),
        code_prompt(language, description),
        tool_generation(config.generation.to_generation_config(), 0.2, None),
    )
}

/// Translate text to another language.
#[poise::command(prefix_command, slash_command, aliases("trans"))]
pub async fn translate(
    ctx: Context<'_>,
    #[description = "Target language"] language: Option<String>,
    #[description = "Text to translate"]
    #[rest]
    text: Option<String>,
) -> Result<(), Error> {
    let (Some(language), Some(text)) = (present(language), present(text)) else {
        say_usage(ctx).await?;
        return Ok(());
    };

    if !admit(ctx, "translate").await? {
        return Ok(());
    }
    let Some(text) = clean_or_reply(ctx, &text, "Text").await? else {
        return Ok(());
    };
    let language = sanitize(&language);

    ctx.defer_or_broadcast().await?;

    let request = translate_request(&ctx.data().config.get(), &language, &text);
    let Some(reply) = generate(ctx, request).await? else {
        return Ok(());
    };

    let embed = info_embed(
        &format!("🌐 Translation to {language}"),
        &truncate_string(&reply, DESCRIPTION_LIMIT),
    )
    .field("Original Text", truncate_string(&text, FIELD_LIMIT), false);
    send_embed(ctx, embed).await
}

/// Summarize a long text.
#[poise::command(prefix_command, slash_command, aliases("summary"))]
pub async fn summarize(
    ctx: Context<'_>,
    #[description = "Text to summarize (at least 100 characters)"]
    #[rest]
    text: Option<String>,
) -> Result<(), Error> {
    let Some(text) = present(text) else {
        say_usage(ctx).await?;
        return Ok(());
    };
    if !long_enough_to_summarize(&text) {
        ctx.say("❌ Text is too short to summarize. Please provide at least 100 characters.")
            .await?;
        return Ok(());
    }

    if !admit(ctx, "summarize").await? {
        return Ok(());
    }
    let Some(text) = clean_or_reply(ctx, &text, "Text").await? else {
        return Ok(());
    };

    ctx.defer_or_broadcast().await?;

    let config = ctx.data().config.get();
    let request = GenerateRequest::new(
        config.gemini.text_model.as_str(),
        summarize_prompt(&text),
        tool_generation(config.generation.to_generation_config(), 0.3, Some(1024)),
    );
    let Some(reply) = generate(ctx, request).await? else {
        return Ok(());
    };

    let embed = info_embed("Text Summary", &truncate_string(&reply, DESCRIPTION_LIMIT))
        .field("Original Text", truncate_string(&text, FIELD_LIMIT), false);
    send_embed(ctx, embed).await
}

/// Generate code in a given language.
#[poise::command(prefix_command, slash_command, aliases("generate"))]
pub async fn code(
    ctx: Context<'_>,
    #[description = "Programming language"] language: Option<String>,
    #[description = "What the code should do"]
    #[rest]
    description: Option<String>,
) -> Result<(), Error> {
    let (Some(language), Some(description)) = (present(language), present(description)) else {
        say_usage(ctx).await?;
        return Ok(());
    };

    if !admit(ctx, "code").await? {
        return Ok(());
    }
    let Some(description) = clean_or_reply(ctx, &description, "Prompt").await? else {
        return Ok(());
    };
    let language = sanitize(&language);

    ctx.defer_or_broadcast().await?;

    let config = ctx.data().config.get();
    let request = code_request(&config, &language, &description);
    let Some(reply) = generate(ctx, request).await? else {
        return Ok(());
    };

    say_chunked(
        ctx,
        &ensure_code_fence(&language, &reply),
        config.limits.max_response_length,
    )
    .await
}

/// Turn a short description into a detailed image-generation prompt.
#[poise::command(prefix_command, slash_command, aliases("prompt"))]
pub async fn imagine(
    ctx: Context<'_>,
    #[description = "Image description"]
    #[rest]
    description: Option<String>,
) -> Result<(), Error> {
    let Some(description) = present(description) else {
        say_usage(ctx).await?;
        return Ok(());
    };

    if !admit(ctx, "imagine").await? {
        return Ok(());
    }
    let Some(description) = clean_or_reply(ctx, &description, "Prompt").await? else {
        return Ok(());
    };

    ctx.defer_or_broadcast().await?;

    let config = ctx.data().config.get();
    let request = GenerateRequest::new(
        config.gemini.text_model.as_str(),
        imagine_prompt(&description),
        tool_generation(config.generation.to_generation_config(), 0.7, None),
    )
    .with_system_instruction(IMAGINE_SYSTEM_PROMPT);
    let Some(reply) = generate(ctx, request).await? else {
        return Ok(());
    };

    send_embed(
        ctx,
        info_embed(
            "Image Generation Prompt",
            &truncate_string(&reply, DESCRIPTION_LIMIT),
        ),
    )
    .await
}
