use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Image generation failures
#[derive(Debug, Error)]
pub enum ImageGenError {
    /// A required credential could not be resolved from any source
    #[error(
        "Missing credential `{0}`. Set it in the secrets file or as an environment variable."
    )]
    MissingCredential(String),

    /// Request parameters failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Vendor API returned a non-success status
    #[error("Provider API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Network or connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Vendor payload was not valid base64 or not a parseable image
    #[error("Failed to decode image: {0}")]
    DecodeFailure(String),
}

impl ImageGenError {
    /// Vendor-facing text used for error classification
    ///
    /// For API errors this is the vendor's own message without the status
    /// prefix, so that pattern matching sees what the vendor said.
    pub fn vendor_message(&self) -> String {
        match self {
            Self::ProviderApiError { message, .. } => message.clone(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_message_strips_status_prefix() {
        let err = ImageGenError::ProviderApiError {
            status: 400,
            message: "Invalid value for 'size'".to_string(),
        };

        assert_eq!(err.vendor_message(), "Invalid value for 'size'");
        assert_eq!(err.to_string(), "Provider API error (400): Invalid value for 'size'");
    }

    #[test]
    fn missing_credential_names_the_key() {
        let err = ImageGenError::MissingCredential("OPENAI_API_KEY".to_string());
        insta::assert_snapshot!(
            err,
            @"Missing credential `OPENAI_API_KEY`. Set it in the secrets file or as an environment variable."
        );
    }
}
