//! Gemini `generateContent` REST client
//!
//! Handlers talk to the model through the [`TextGenerator`] trait so they can be
//! exercised without network access. [`GeminiClient`] is the production
//! implementation.

use crate::error::{GembotError, Result};
use crate::types::Role;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Default endpoint of the public Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key, which keeps it out of request URLs.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for the Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    /// Base URL, without the trailing `/models` segment
    pub base_url: String,
    /// API key sent in the `x-goog-api-key` header
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

impl GeminiClientConfig {
    /// Create a configuration for the public endpoint with the given key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Base64 image payload sent inline with a prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    /// MIME type such as `image/png`
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

impl InlineImage {
    /// Encode raw image bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }
}

/// One part of a content block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    /// Plain text
    Text(String),
    /// Inline image data
    InlineData(InlineImage),
}

/// A role-tagged block of parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    /// Author of the block; absent for system instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Ordered parts
    pub parts: Vec<Part>,
}

impl Content {
    /// A single text part authored by `role`.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// A user text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    /// A model text block.
    pub fn model(text: impl Into<String>) -> Self {
        Self::text(Role::Model, text)
    }
}

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature in `[0, 1]`
    pub temperature: f32,
    /// Nucleus sampling cutoff
    pub top_p: f32,
    /// Top-k cutoff
    pub top_k: u32,
    /// Maximum tokens in the reply
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

/// A complete generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Model name, e.g. `gemini-2.5-flash`
    pub model: String,
    /// Conversation so far, ending with the new prompt
    pub contents: Vec<Content>,
    /// Optional system instruction
    pub system_instruction: Option<String>,
    /// Sampling parameters
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    /// Single-prompt request with the given sampling parameters.
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        generation_config: GenerationConfig,
    ) -> Self {
        Self {
            model: model.into(),
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            generation_config,
        }
    }

    /// Request over prepared contents, e.g. a conversation history.
    pub fn from_contents(
        model: impl Into<String>,
        contents: Vec<Content>,
        generation_config: GenerationConfig,
    ) -> Self {
        Self {
            model: model.into(),
            contents,
            system_instruction: None,
            generation_config,
        }
    }

    /// Attach a system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// Something that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run the request and return the generated text.
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestBody<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiClientConfig,
}

impl GeminiClient {
    /// Create a new client
    pub fn new(config: GeminiClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GembotError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let body = build_request_body(&request)?;
        debug!("Sending {} content blocks", request.contents.len());

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("Gemini returned {}: {}", status, crate::utils::truncate_string(&text, 500));
            return Err(status_error(status.as_u16()));
        }

        parse_response(&text)
    }
}

fn parse_response(text: &str) -> Result<String> {
    let parsed: ResponseBody = serde_json::from_str(text).map_err(|e| {
        warn!("Unparseable Gemini response: {}", e);
        GembotError::gemini("malformed response")
    })?;
    extract_text(parsed)
}

fn build_request_body(request: &GenerateRequest) -> Result<serde_json::Value> {
    let body = RequestBody {
        contents: &request.contents,
        system_instruction: request.system_instruction.as_ref().map(|instruction| Content {
            role: None,
            parts: vec![Part::Text(instruction.clone())],
        }),
        generation_config: &request.generation_config,
    };
    Ok(serde_json::to_value(body)?)
}

// Message wording is matched by the API error classifier in gembot-gate.
fn status_error(status: u16) -> GembotError {
    match status {
        429 => GembotError::gemini_with_status("quota exceeded (rate limit)", status),
        401 | 403 => GembotError::gemini_with_status("unauthorized: invalid API key", status),
        _ => GembotError::gemini_with_status(format!("request failed with status {status}"), status),
    }
}

fn extract_text(response: ResponseBody) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GembotError::gemini("response contained no candidates"))?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GembotError::gemini("response contained no text"));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let mut request = GenerateRequest::new(
            "gemini-2.5-flash",
            "Describe this",
            GenerationConfig::default(),
        )
        .with_system_instruction("Be brief");
        request.contents[0]
            .parts
            .push(Part::InlineData(InlineImage::from_bytes("image/png", b"abc")));

        let body = build_request_body(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "Describe this"},
                        {"inlineData": {"mimeType": "image/png", "data": "YWJj"}}
                    ]
                }],
                "systemInstruction": {"parts": [{"text": "Be brief"}]},
                "generationConfig": {
                    "temperature": 0.7f32,
                    "topP": 0.95f32,
                    "topK": 40,
                    "maxOutputTokens": 2048
                }
            })
        );
    }

    #[test]
    fn test_body_without_system_instruction() {
        let request = GenerateRequest {
            model: "gemini-2.5-flash".to_string(),
            contents: vec![Content::user("hi"), Content::model("hello"), Content::user("again")],
            system_instruction: None,
            generation_config: GenerationConfig::default(),
        };
        let body = build_request_body(&request).unwrap();
        assert!(body.get("systemInstruction").is_none());
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_status_error_wording() {
        let quota = status_error(429).to_string().to_lowercase();
        assert!(quota.contains("quota"));

        let auth = status_error(403).to_string().to_lowercase();
        assert!(auth.contains("unauthorized"));

        let other = status_error(500);
        assert!(matches!(
            other,
            GembotError::Gemini {
                status_code: Some(500),
                ..
            }
        ));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: ResponseBody = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}}]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Hello, world");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let response: ResponseBody = serde_json::from_value(json!({})).unwrap();
        assert!(extract_text(response).is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new(
            GeminiClientConfig::new("key").with_base_url("http://localhost:9000/v1beta/"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-pro"),
            "http://localhost:9000/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn test_unparseable_response_is_malformed() {
        let error = parse_response("<html>bad gateway</html>").unwrap_err();
        assert_eq!(error.to_string(), "Gemini API error: malformed response");

        let error = parse_response(r#"{"candidates": "nope"}"#).unwrap_err();
        assert!(matches!(
            error,
            GembotError::Gemini {
                status_code: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_connection_failure_keeps_key_private() {
        let client = GeminiClient::new(
            GeminiClientConfig::new("SECRET_API_KEY_123")
                .with_base_url("http://127.0.0.1:1/v1beta")
                .with_timeout(5),
        )
        .unwrap();

        let error = client
            .generate(GenerateRequest::new(
                "gemini-2.5-flash",
                "hello",
                GenerationConfig::default(),
            ))
            .await
            .unwrap_err();

        assert!(matches!(error, GembotError::Network { .. }));
        assert!(!error.describe().contains("SECRET_API_KEY_123"));
        assert!(!format!("{error:?}").contains("SECRET_API_KEY_123"));
    }
}
