//! Error types and utilities for gembot

use thiserror::Error;

/// Result type alias for gembot operations
pub type Result<T> = std::result::Result<T, GembotError>;

/// Main error type for gembot operations
#[derive(Error, Debug)]
pub enum GembotError {
    /// Network related errors (HTTP requests, etc.)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Gemini API related errors
    #[error("Gemini API error: {message}")]
    Gemini {
        message: String,
        status_code: Option<u16>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GembotError {
    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Gemini API error
    pub fn gemini(msg: impl Into<String>) -> Self {
        Self::Gemini {
            message: msg.into(),
            status_code: None,
        }
    }

    /// Create a new Gemini API error with HTTP status code
    pub fn gemini_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Gemini {
            message: msg.into(),
            status_code: Some(status),
        }
    }

    /// Full description of the error including every source in its chain.
    ///
    /// Used when the error has to be classified by its text.
    pub fn describe(&self) -> String {
        let mut description = self.to_string();
        let mut current: Option<&(dyn std::error::Error + 'static)> =
            std::error::Error::source(self);
        while let Some(source) = current {
            description.push_str(": ");
            description.push_str(&source.to_string());
            current = source.source();
        }
        description
    }
}

// Error conversion implementations for external types

/// Convert from reqwest::Error to GembotError
///
/// The request URL is stripped so it never reaches logs or replies.
impl From<reqwest::Error> for GembotError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
            Self::network_with_source(format!("HTTP error: {}", status_code), err)
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let gemini_error = GembotError::gemini_with_status("quota exceeded", 429);
        assert_eq!(gemini_error.to_string(), "Gemini API error: quota exceeded");
        assert!(matches!(
            gemini_error,
            GembotError::Gemini {
                status_code: Some(429),
                ..
            }
        ));

        let plain = GembotError::gemini("response contained no text");
        assert!(matches!(
            plain,
            GembotError::Gemini {
                status_code: None,
                ..
            }
        ));
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrapped_error = GembotError::network_with_source("Failed to read file", io_error);

        assert!(wrapped_error.to_string().contains("Failed to read file"));
        assert!(wrapped_error.source().is_some());
    }

    #[test]
    fn test_describe_includes_source_chain() {
        let root = io::Error::new(io::ErrorKind::TimedOut, "operation timeout");
        let error = GembotError::network_with_source("Connection failed", root);

        let description = error.describe();
        assert_eq!(
            description,
            "Network error: Connection failed: operation timeout"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let invalid_json = r#"{"invalid": json}"#;
        let serde_error = serde_json::from_str::<serde_json::Value>(invalid_json).unwrap_err();
        let error: GembotError = serde_error.into();

        assert!(error.to_string().contains("Serialization error"));
    }

    #[tokio::test]
    async fn test_reqwest_error_description_omits_url() {
        let url = "http://127.0.0.1:1/v1beta/models/m:generateContent?key=SECRET_API_KEY_123";
        let err = reqwest::Client::new().get(url).send().await.unwrap_err();
        let error: GembotError = err.into();

        let description = error.describe();
        assert!(description.starts_with("Network error:"));
        assert!(!description.contains("SECRET_API_KEY_123"));
        assert!(!description.contains("127.0.0.1"));
    }
}
