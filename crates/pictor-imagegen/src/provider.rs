pub(crate) mod huggingface;
pub(crate) mod openai;

use async_trait::async_trait;

use crate::{
    error::{ImageGenError, Result},
    types::{GenerationRequest, Payload},
};

/// Trait for image generation backends
///
/// One call produces exactly one image. Batching over slots is done by the
/// caller so that every slot can fail independently.
#[async_trait]
pub trait ImageGenProvider: Send + Sync {
    /// Generate the image for a 1-based slot of the batch
    async fn generate_image(&self, request: &GenerationRequest, slot: u32) -> Result<Payload>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Turn a non-success response into [`ImageGenError::ProviderApiError`]
///
/// The vendor's own message is extracted from the JSON body when present.
pub(crate) async fn api_error(provider: &str, response: reqwest::Response) -> ImageGenError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    tracing::error!(provider, status = %status, "image generation API error");

    ImageGenError::ProviderApiError {
        status: status.as_u16(),
        message: vendor_error_message(&body),
    }
}

/// Extract the human readable message from a vendor error body
///
/// Handles `{"error": {"message": ".."}}` and `{"error": ".."}`; anything
/// else is returned as-is.
pub(crate) fn vendor_error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    let error = &json["error"];
    error["message"]
        .as_str()
        .or_else(|| error.as_str())
        .map_or_else(|| body.trim().to_string(), str::to_string)
}
