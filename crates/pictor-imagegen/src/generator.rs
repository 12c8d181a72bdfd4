use pictor_config::{BackendKind, CredentialResolver, ImageGenConfig};
use secrecy::ExposeSecret;

use crate::{
    classify::ErrorClassifier,
    decode::{DecodedImage, decode},
    error::{ImageGenError, Result},
    provider::{ImageGenProvider, huggingface::HuggingFaceImageGenProvider, openai::OpenAiImageGenProvider},
    request::{GenerationInputs, RequestBuilder},
    types::{BatchReport, Credentials, GenerationRequest, GenerationResult, SlotOutcome},
};

/// How a batch reacts to a failed slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Stop issuing calls after the first failed slot
    pub halt_on_first_error: bool,
}

/// Receives batch progress as it happens
///
/// Every method has a no-op default so observers only implement what they
/// render.
pub trait BatchObserver {
    /// A non-fatal adjustment was made to the request
    fn on_warning(&mut self, _warning: &str) {}

    /// A vendor call for slot `index` of `count` is about to be issued
    fn on_slot_start(&mut self, _index: u32, _count: u32) {}

    /// Slot finished, successfully or not
    fn on_slot(&mut self, _outcome: &SlotOutcome) {}
}

impl BatchObserver for () {}

/// Run every slot of `request` against `provider`, one call at a time
///
/// Slots are numbered from 1. Failures are classified and recorded in place;
/// with `halt_on_first_error` no further calls are made after one fails.
pub async fn run_batch<O>(
    provider: &dyn ImageGenProvider,
    request: &GenerationRequest,
    policy: BatchPolicy,
    classifier: ErrorClassifier,
    observer: &mut O,
) -> Vec<SlotOutcome>
where
    O: BatchObserver + ?Sized,
{
    let count = request.count();
    let mut slots = Vec::with_capacity(count as usize);

    for index in 1..=count {
        observer.on_slot_start(index, count);

        let result = provider
            .generate_image(request, index)
            .await
            .and_then(decode)
            .map(|DecodedImage { image, raw_bytes }| GenerationResult {
                image,
                raw_bytes,
                size_label: request.size_label(),
            })
            .map_err(|e| {
                tracing::warn!(provider = provider.name(), slot = index, error = %e, "image generation failed");
                classifier.classify_error(&e)
            });

        let failed = result.is_err();
        let outcome = SlotOutcome { index, result };
        observer.on_slot(&outcome);
        slots.push(outcome);

        if failed && policy.halt_on_first_error {
            tracing::debug!(provider = provider.name(), slot = index, count, "halting batch after failure");
            break;
        }
    }

    slots
}

/// Runs generation actions against the configured backend
#[derive(Debug)]
pub struct Generator {
    config: ImageGenConfig,
    resolver: CredentialResolver,
    backend: BackendKind,
    classify_errors: Option<bool>,
}

impl Generator {
    /// Generator for the configured default backend
    pub fn new(config: ImageGenConfig, resolver: CredentialResolver) -> Self {
        Self {
            backend: config.backend,
            config,
            resolver,
            classify_errors: None,
        }
    }

    /// Use a different backend than the configured default
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Override the backend's `classify_errors` setting
    #[must_use]
    pub fn with_classification(mut self, enabled: bool) -> Self {
        self.classify_errors = Some(enabled);
        self
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn policy(&self) -> BatchPolicy {
        let halt_on_first_error = match self.backend {
            BackendKind::Openai => self.config.openai.halt_on_first_error,
            BackendKind::Huggingface => self.config.huggingface.halt_on_first_error,
        };
        BatchPolicy { halt_on_first_error }
    }

    pub fn classifier(&self) -> ErrorClassifier {
        let configured = match self.backend {
            BackendKind::Openai => self.config.openai.classify_errors,
            BackendKind::Huggingface => self.config.huggingface.classify_errors,
        };
        ErrorClassifier::new(self.classify_errors.unwrap_or(configured))
    }

    /// Run one generation action
    ///
    /// An empty prompt is a no-op and returns an empty report. Credentials
    /// are resolved afresh for every action so edits to the secrets store
    /// take effect without a restart.
    ///
    /// # Errors
    ///
    /// Returns [`ImageGenError::InvalidRequest`] when the inputs fail
    /// validation and [`ImageGenError::MissingCredential`] when the backend's
    /// key cannot be resolved; in both cases no vendor call is made
    pub async fn generate<O>(&self, inputs: &GenerationInputs, observer: &mut O) -> Result<BatchReport>
    where
        O: BatchObserver + ?Sized,
    {
        let Some(built) = RequestBuilder::new(&self.config, self.backend).build(inputs)? else {
            tracing::debug!(backend = %self.backend, "empty prompt, nothing to generate");
            return Ok(BatchReport::default());
        };

        for warning in &built.warnings {
            observer.on_warning(warning);
        }

        let provider = self.provider(self.credentials()?);
        let request = built.request;

        tracing::info!(
            backend = %self.backend,
            model = request.model(),
            size = %request.size(),
            count = request.count(),
            "starting image generation"
        );

        let slots = run_batch(provider.as_ref(), &request, self.policy(), self.classifier(), observer).await;

        let report = BatchReport {
            warnings: built.warnings,
            slots,
            requested: request.count(),
        };

        tracing::info!(
            backend = %self.backend,
            attempted = report.attempted(),
            succeeded = report.successes().count(),
            failed = report.failures().count(),
            "image generation finished"
        );

        Ok(report)
    }

    fn credentials(&self) -> Result<Credentials> {
        match self.backend {
            BackendKind::Openai => {
                let openai = &self.config.openai;
                let api_key = self
                    .resolver
                    .resolve(&openai.api_key_name)
                    .ok_or_else(|| ImageGenError::MissingCredential(openai.api_key_name.clone()))?;

                let organization_id = self
                    .resolver
                    .resolve(&openai.organization_key_name)
                    .map(|org| org.expose_secret().to_string());

                Ok(Credentials {
                    api_key,
                    organization_id,
                })
            }
            BackendKind::Huggingface => {
                let token_name = &self.config.huggingface.token_name;
                let api_key = self
                    .resolver
                    .resolve(token_name)
                    .ok_or_else(|| ImageGenError::MissingCredential(token_name.clone()))?;

                Ok(Credentials {
                    api_key,
                    organization_id: None,
                })
            }
        }
    }

    fn provider(&self, credentials: Credentials) -> Box<dyn ImageGenProvider> {
        match self.backend {
            BackendKind::Openai => Box::new(OpenAiImageGenProvider::new(credentials, &self.config.openai.base_url)),
            BackendKind::Huggingface => Box::new(HuggingFaceImageGenProvider::new(
                credentials,
                &self.config.huggingface.base_url,
            )),
        }
    }
}
