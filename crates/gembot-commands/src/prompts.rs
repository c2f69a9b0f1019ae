//! Prompt templates and the small text transforms around model replies.

use gembot_common::GenerationConfig;

/// Prompt used by `vision` when the user gave none.
pub const DEFAULT_VISION_PROMPT: &str = "Please describe this image in detail.";

/// Minimum input accepted by `summarize`, in characters.
pub const MIN_SUMMARY_LENGTH: usize = 100;

/// System instruction for `imagine`.
pub const IMAGINE_SYSTEM_PROMPT: &str = "You are an expert at optimizing prompts for image generation AI. \
Turn the user's description into a detailed, vivid prompt that an image model can follow. \
Answer in exactly this format:\n\
**Optimized Prompt:** <the improved prompt>\n\
**Style Suggestions:** <art styles, lighting and composition ideas>\n\
**Additional Keywords:** <comma-separated keywords>";

/// Prompt asking for a bare translation.
pub fn translate_prompt(language: &str, text: &str) -> String {
    format!(
        "Translate the following text to {language}. Only output the translation without any explanation: {text}"
    )
}

/// Prompt asking for a short summary.
pub fn summarize_prompt(text: &str) -> String {
    format!(
        "Summarize the following text concisely. Include only key points and important information: {text}"
    )
}

/// Prompt asking for commented code only.
pub fn code_prompt(language: &str, description: &str) -> String {
    format!(
        "Write {language} code for the following description. Only output code with comments for explanation: {description}"
    )
}

/// Prompt asking for an image-generation prompt.
pub fn imagine_prompt(description: &str) -> String {
    format!(
        "Optimize the following description into a detailed prompt for image generation AI: {description}"
    )
}

/// Sampling parameters for a tool command: the configured defaults with a
/// fixed temperature and an optional token cap.
pub fn tool_generation(
    base: GenerationConfig,
    temperature: f32,
    max_output_tokens: Option<u32>,
) -> GenerationConfig {
    GenerationConfig {
        temperature,
        max_output_tokens: max_output_tokens.unwrap_or(base.max_output_tokens),
        ..base
    }
}

/// Wrap `reply` in a fenced block tagged with `language` unless it already
/// starts with one.
pub fn ensure_code_fence(language: &str, reply: &str) -> String {
    if reply.trim_start().starts_with("```") {
        reply.to_string()
    } else {
        format!("```{language}\n{reply}\n```")
    }
}

/// Whether `text` is long enough to be worth summarizing.
pub fn long_enough_to_summarize(text: &str) -> bool {
    text.chars().count() >= MIN_SUMMARY_LENGTH
}

/// MIME type for an image attachment, judged by its extension.
pub fn image_mime_type(filename: &str) -> Option<&'static str> {
    let (_, extension) = filename.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_templates() {
        assert_eq!(
            translate_prompt("French", "hello"),
            "Translate the following text to French. Only output the translation without any explanation: hello"
        );
        assert!(summarize_prompt("abc").ends_with("important information: abc"));
        assert_eq!(
            code_prompt("rust", "fizzbuzz"),
            "Write rust code for the following description. Only output code with comments for explanation: fizzbuzz"
        );
        assert!(imagine_prompt("a cat").ends_with("image generation AI: a cat"));
    }

    #[test]
    fn test_ensure_code_fence() {
        assert_eq!(
            ensure_code_fence("python", "print(1)"),
            "```python\nprint(1)\n```"
        );

        let fenced = "```rust\nfn main() {}\n```";
        assert_eq!(ensure_code_fence("rust", fenced), fenced);
    }

    #[test]
    fn test_tool_generation_overrides() {
        let base = GenerationConfig::default();

        let translate = tool_generation(base, 0.2, None);
        assert_eq!(translate.temperature, 0.2);
        assert_eq!(translate.max_output_tokens, base.max_output_tokens);
        assert_eq!(translate.top_k, base.top_k);

        let summary = tool_generation(base, 0.3, Some(1024));
        assert_eq!(summary.max_output_tokens, 1024);
    }

    #[test]
    fn test_summary_threshold() {
        assert!(!long_enough_to_summarize(&"a".repeat(99)));
        assert!(long_enough_to_summarize(&"a".repeat(100)));
        // Counted in characters, not bytes.
        assert!(!long_enough_to_summarize(&"é".repeat(60)));
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type("cat.PNG"), Some("image/png"));
        assert_eq!(image_mime_type("photo.jpeg"), Some("image/jpeg"));
        assert_eq!(image_mime_type("photo.jpg"), Some("image/jpeg"));
        assert_eq!(image_mime_type("anim.gif"), Some("image/gif"));
        assert_eq!(image_mime_type("x.webp"), Some("image/webp"));
        assert_eq!(image_mime_type("doc.pdf"), None);
        assert_eq!(image_mime_type("noextension"), None);
    }
}
