//! Stateless input checks and sanitization.

use thiserror::Error;

/// Substrings stripped from free-text input.
pub const SANITIZE_DENYLIST: [&str; 3] = ["`", "@everyone", "@here"];

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Why an input was refused.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Text longer than allowed
    #[error("Message too long. Maximum length is {max} characters.")]
    TooLong {
        /// Length of the rejected text in characters
        length: usize,
        /// Configured limit
        max: usize,
    },

    /// Temperature outside `[0, 1]`
    #[error("Temperature must be between 0.0 and 1.0.")]
    TemperatureOutOfRange(f32),

    /// Attachment larger than allowed
    #[error("Image too large. Maximum size is {max_mb}MB.")]
    ImageTooLarge {
        /// Size of the rejected attachment
        bytes: u64,
        /// Configured limit in megabytes
        max_mb: u64,
    },

    /// Attachment type not accepted
    #[error("Unsupported image format. Supported formats: PNG, JPG, JPEG, GIF, WEBP.")]
    UnsupportedImageFormat(String),

    /// Command-specific requirement not met
    #[error("{0}")]
    Invalid(String),
}

/// Validator bound to the configured limits.
#[derive(Debug, Clone)]
pub struct InputValidator {
    max_text_length: usize,
    max_image_size_mb: u64,
}

impl InputValidator {
    /// Image extensions accepted by the `vision` command.
    pub const IMAGE_EXTENSIONS: [&'static str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

    /// Create a validator.
    pub fn new(max_text_length: usize, max_image_size_mb: u64) -> Self {
        Self {
            max_text_length,
            max_image_size_mb,
        }
    }

    /// True when `text` has at most the configured number of characters.
    pub fn validate_text_length(&self, text: &str) -> bool {
        Self::text_within(text, self.max_text_length)
    }

    /// True when `text` has at most `max_length` characters.
    pub fn text_within(text: &str, max_length: usize) -> bool {
        text.chars().count() <= max_length
    }

    /// True for `0.0 <= value <= 1.0`.
    pub fn validate_temperature(value: f32) -> bool {
        (0.0..=1.0).contains(&value)
    }

    /// True when `bytes` fits the configured image size.
    pub fn validate_image_size(&self, bytes: u64) -> bool {
        bytes <= self.max_image_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Result-returning form of [`validate_text_length`](Self::validate_text_length).
    pub fn check_text(&self, text: &str) -> Result<(), ValidationError> {
        if self.validate_text_length(text) {
            Ok(())
        } else {
            Err(ValidationError::TooLong {
                length: text.chars().count(),
                max: self.max_text_length,
            })
        }
    }

    /// Result-returning form of [`validate_temperature`](Self::validate_temperature).
    pub fn check_temperature(value: f32) -> Result<(), ValidationError> {
        if Self::validate_temperature(value) {
            Ok(())
        } else {
            Err(ValidationError::TemperatureOutOfRange(value))
        }
    }

    /// Result-returning form of [`validate_image_size`](Self::validate_image_size).
    pub fn check_image_size(&self, bytes: u64) -> Result<(), ValidationError> {
        if self.validate_image_size(bytes) {
            Ok(())
        } else {
            Err(ValidationError::ImageTooLarge {
                bytes,
                max_mb: self.max_image_size_mb,
            })
        }
    }

    /// Checks the attachment file name against [`IMAGE_EXTENSIONS`](Self::IMAGE_EXTENSIONS).
    pub fn check_image_extension(filename: &str) -> Result<(), ValidationError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if Self::IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedImageFormat(filename.to_string()))
        }
    }

    /// Length check followed by [`sanitize`].
    pub fn clean_text(&self, text: &str) -> Result<String, ValidationError> {
        self.check_text(text)?;
        Ok(sanitize(text))
    }
}

/// Strip mention broadcasts and backticks, then trim.
///
/// Removal repeats until nothing changes, so `"@@herehere"` becomes `""`
/// and the function is idempotent.
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut next = current.clone();
        for token in SANITIZE_DENYLIST {
            next = next.replace(token, "");
        }
        let next = next.trim().to_string();
        if next == current {
            return next;
        }
        current = next;
    }
}
