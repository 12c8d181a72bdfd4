use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::ExposeSecret;
use serde::Serialize;

use super::{ImageGenProvider, api_error};
use crate::{
    error::{ImageGenError, Result},
    http_client::http_client,
    types::{Credentials, GenerationRequest, ImageSize, Payload, TuningParams},
};

/// Hugging Face hosted text-to-image provider
///
/// The inference API answers with the image file itself rather than JSON.
pub(crate) struct HuggingFaceImageGenProvider {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

impl HuggingFaceImageGenProvider {
    pub fn new(credentials: Credentials, base_url: &str) -> Self {
        Self {
            client: http_client(),
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model.trim_matches('/'))
    }
}

#[derive(Serialize)]
struct TextToImageRequest<'a> {
    inputs: &'a str,
    parameters: TextToImageParameters,
}

#[derive(Serialize)]
struct TextToImageParameters {
    width: u32,
    height: u32,
    num_inference_steps: u32,
    guidance_scale: f32,
}

impl<'a> TextToImageRequest<'a> {
    fn from_request(request: &'a GenerationRequest) -> Result<Self> {
        let ImageSize::Custom(dims) = request.size() else {
            return Err(ImageGenError::InvalidRequest(format!(
                "Hugging Face requires explicit dimensions, got '{}'",
                request.size()
            )));
        };

        let TuningParams { steps, guidance_scale } = request
            .tuning()
            .ok_or_else(|| ImageGenError::InvalidRequest("missing tuning parameters".to_string()))?;

        Ok(Self {
            inputs: request.prompt(),
            parameters: TextToImageParameters {
                width: dims.width,
                height: dims.height,
                num_inference_steps: steps,
                guidance_scale,
            },
        })
    }
}

#[async_trait]
impl ImageGenProvider for HuggingFaceImageGenProvider {
    async fn generate_image(&self, request: &GenerationRequest, slot: u32) -> Result<Payload> {
        let url = self.model_url(request.model());
        let body = TextToImageRequest::from_request(request)?;

        tracing::debug!(
            provider = self.name(),
            model = request.model(),
            slot,
            width = body.parameters.width,
            height = body.parameters.height,
            steps = body.parameters.num_inference_steps,
            "sending text-to-image request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.credentials.api_key.expose_secret())
            .header(header::ACCEPT, "image/png")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = self.name(), slot, error = %e, "text-to-image request failed");
                ImageGenError::ConnectionError(format!("Failed to send request to Hugging Face inference: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(api_error(self.name(), response).await);
        }

        let image = response.bytes().await.map_err(|e| {
            tracing::error!(provider = self.name(), slot, error = %e, "failed to read text-to-image response body");
            ImageGenError::ConnectionError(format!("Failed to read Hugging Face response body: {e}"))
        })?;

        tracing::debug!(provider = self.name(), slot, bytes = image.len(), "text-to-image request complete");

        Ok(Payload::Bytes(image.to_vec()))
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}
