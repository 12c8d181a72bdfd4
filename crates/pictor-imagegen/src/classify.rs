use thiserror::Error;

use crate::{error::ImageGenError, types::OpenAiSize};

/// User-facing error category for a failed slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The key's organization has not completed verification
    AuthOrgUnverified,
    /// The vendor rejected the requested size
    InvalidSize,
    /// Anything else
    Generic,
}

/// A slot failure ready to show to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub category: ErrorCategory,
    pub message: String,
}

impl GenerationError {
    /// Uncategorized error carrying `message` verbatim
    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Generic,
            message: message.into(),
        }
    }
}

/// Maps raw vendor error text onto [`GenerationError`]
///
/// When disabled every error is passed through as
/// [`ErrorCategory::Generic`] with its raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorClassifier {
    enabled: bool,
}

impl ErrorClassifier {
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub const fn enabled() -> Self {
        Self::new(true)
    }

    pub const fn disabled() -> Self {
        Self::new(false)
    }

    pub const fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Classify raw error text, checking org verification first
    pub fn classify(self, raw: &str) -> GenerationError {
        if !self.enabled {
            return GenerationError::generic(raw);
        }

        let lowered = raw.to_lowercase();

        if lowered.contains("organization must be verified") {
            return GenerationError {
                category: ErrorCategory::AuthOrgUnverified,
                message: org_unverified_guidance(),
            };
        }

        if lowered.contains("invalid value") && lowered.contains("size") {
            return GenerationError {
                category: ErrorCategory::InvalidSize,
                message: invalid_size_guidance(),
            };
        }

        GenerationError::generic(raw)
    }

    /// Classify an adapter or decoder failure for one slot
    ///
    /// Decode failures are never vendor messages and stay generic.
    pub fn classify_error(self, error: &ImageGenError) -> GenerationError {
        match error {
            ImageGenError::DecodeFailure(_) => GenerationError::generic(error.to_string()),
            _ => self.classify(&error.vendor_message()),
        }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::enabled()
    }
}

fn org_unverified_guidance() -> String {
    [
        "OpenAI error: this key's organization must be verified to generate images.",
        "- Try a personal API key, or",
        "- Verify your organization in the OpenAI dashboard (Settings > Organization > Verify), then retry.",
        "If you belong to several organizations, set OPENAI_ORG to the verified one.",
    ]
    .join("\n")
}

fn invalid_size_guidance() -> String {
    let [square, portrait, landscape, auto] = OpenAiSize::ALL.map(OpenAiSize::as_str);

    format!("OpenAI error: unsupported size. Use one of {square}, {portrait}, {landscape}, or {auto}.")
}
