use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::{ImageGenProvider, api_error};
use crate::{
    error::{ImageGenError, Result},
    http_client::http_client,
    types::{Credentials, GenerationRequest, Payload},
};

/// Header selecting which organization a request is billed to
const ORGANIZATION_HEADER: &str = "OpenAI-Organization";

/// `OpenAI` Images API provider
pub(crate) struct OpenAiImageGenProvider {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

impl OpenAiImageGenProvider {
    pub fn new(credentials: Credentials, base_url: &str) -> Self {
        Self {
            client: http_client(),
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// DALL-E models default to URL responses and must be asked for base64;
    /// GPT image models always return base64 and reject the parameter
    fn response_format(model: &str) -> Option<&'static str> {
        model.starts_with("dall-e").then_some("b64_json")
    }
}

/// Wire format for the `OpenAI` image generation request
#[derive(Serialize)]
struct OpenAiImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: String,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'static str>,
}

/// Wire format for the `OpenAI` image generation response
#[derive(Deserialize)]
struct OpenAiImageResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
}

#[derive(Deserialize)]
struct OpenAiImageData {
    b64_json: Option<String>,
}

#[async_trait]
impl ImageGenProvider for OpenAiImageGenProvider {
    async fn generate_image(&self, request: &GenerationRequest, slot: u32) -> Result<Payload> {
        let url = format!("{}/images/generations", self.base_url);

        let wire_request = OpenAiImageRequest {
            model: request.model(),
            prompt: request.prompt(),
            size: request.size_label(),
            n: 1,
            response_format: Self::response_format(request.model()),
        };

        tracing::debug!(
            provider = self.name(),
            model = request.model(),
            slot,
            size = %wire_request.size,
            "sending image generation request"
        );

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(self.credentials.api_key.expose_secret())
            .json(&wire_request);

        if let Some(org) = &self.credentials.organization_id {
            builder = builder.header(ORGANIZATION_HEADER, org);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(provider = self.name(), slot, error = %e, "image generation request failed");
            ImageGenError::ConnectionError(format!("Failed to send request to OpenAI image generation: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(api_error(self.name(), response).await);
        }

        let wire_response: OpenAiImageResponse = response.json().await.map_err(|e| {
            tracing::error!(provider = self.name(), slot, error = %e, "failed to parse image generation response");
            ImageGenError::DecodeFailure(format!("unexpected OpenAI response body: {e}"))
        })?;

        let b64 = wire_response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| ImageGenError::DecodeFailure("OpenAI response contained no image data".to_string()))?;

        tracing::debug!(provider = self.name(), slot, "image generation request complete");

        Ok(Payload::Base64(b64))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
