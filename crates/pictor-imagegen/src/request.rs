use pictor_config::{BackendKind, GUIDANCE_SCALE_RANGE, ImageGenConfig, STEP_RANGE};

use crate::{
    error::{ImageGenError, Result},
    types::{Dimensions, GenerationRequest, ImageSize, OpenAiSize, TuningParams},
};

/// Most images a single `OpenAI` batch may request
pub const OPENAI_MAX_IMAGES: u32 = 4;

/// Most images a single Hugging Face batch may request
pub const HUGGINGFACE_MAX_IMAGES: u32 = 3;

/// Upper bound on images per batch for a backend
pub const fn max_images(backend: BackendKind) -> u32 {
    match backend {
        BackendKind::Openai => OPENAI_MAX_IMAGES,
        BackendKind::Huggingface => HUGGINGFACE_MAX_IMAGES,
    }
}

/// Raw, unvalidated parameters collected from the user
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationInputs {
    pub prompt: String,
    pub size: Option<String>,
    pub count: i64,
    pub model: Option<String>,
    pub steps: Option<i64>,
    pub guidance_scale: Option<f32>,
}

impl GenerationInputs {
    /// Single image with backend defaults
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            size: None,
            count: 1,
            model: None,
            steps: None,
            guidance_scale: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    #[must_use]
    pub const fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub const fn with_tuning(mut self, steps: i64, guidance_scale: f32) -> Self {
        self.steps = Some(steps);
        self.guidance_scale = Some(guidance_scale);
        self
    }
}

/// A validated request together with the warnings raised while building it
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub request: GenerationRequest,
    pub warnings: Vec<String>,
}

/// Validates and normalizes [`GenerationInputs`] for one backend
pub struct RequestBuilder<'a> {
    config: &'a ImageGenConfig,
    backend: BackendKind,
}

impl<'a> RequestBuilder<'a> {
    pub const fn new(config: &'a ImageGenConfig, backend: BackendKind) -> Self {
        Self { config, backend }
    }

    /// Build a request
    ///
    /// Returns `Ok(None)` for an empty or whitespace-only prompt: nothing is
    /// generated and no vendor call is made.
    ///
    /// # Errors
    ///
    /// Returns [`ImageGenError::InvalidRequest`] for a non-positive count,
    /// an unparseable resolution, an unknown model, or tuning parameters out
    /// of range
    pub fn build(&self, inputs: &GenerationInputs) -> Result<Option<BuiltRequest>> {
        if inputs.prompt.trim().is_empty() {
            return Ok(None);
        }

        let mut warnings = Vec::new();

        let count = self.count(inputs.count, &mut warnings)?;

        let (size, model, tuning) = match self.backend {
            BackendKind::Openai => {
                let size = Self::openai_size(inputs.size.as_deref(), &mut warnings);
                (ImageSize::OpenAi(size), self.config.openai.model.clone(), None)
            }
            BackendKind::Huggingface => {
                let size = self.huggingface_size(inputs.size.as_deref())?;
                let model = self.huggingface_model(inputs.model.as_deref())?;
                let tuning = self.tuning(inputs)?;
                (ImageSize::Custom(size), model, Some(tuning))
            }
        };

        Ok(Some(BuiltRequest {
            request: GenerationRequest {
                prompt: inputs.prompt.clone(),
                size,
                count,
                model,
                tuning,
            },
            warnings,
        }))
    }

    fn count(&self, requested: i64, warnings: &mut Vec<String>) -> Result<u32> {
        if requested <= 0 {
            return Err(ImageGenError::InvalidRequest(format!(
                "image count must be at least 1, got {requested}"
            )));
        }

        let max = max_images(self.backend);
        match u32::try_from(requested) {
            Ok(count) if count <= max => Ok(count),
            _ => {
                let warning = format!("{} supports at most {max} images per batch; generating {max}.", self.backend);
                tracing::warn!(backend = %self.backend, requested, max, "image count clamped");
                warnings.push(warning);
                Ok(max)
            }
        }
    }

    fn openai_size(requested: Option<&str>, warnings: &mut Vec<String>) -> OpenAiSize {
        let Some(requested) = requested else {
            return OpenAiSize::default();
        };

        if let Some(size) = OpenAiSize::parse(requested) {
            return size;
        }

        let fallback = OpenAiSize::default();
        tracing::warn!(requested, fallback = %fallback, "unsupported size replaced");
        warnings.push(format!("Invalid size selected; defaulting to {fallback}."));
        fallback
    }

    fn huggingface_size(&self, requested: Option<&str>) -> Result<Dimensions> {
        let raw = requested.unwrap_or(self.config.huggingface.default_size.as_str());

        Dimensions::parse(raw).ok_or_else(|| {
            ImageGenError::InvalidRequest(format!(
                "resolution must be WIDTHxHEIGHT with positive integers, got '{raw}'"
            ))
        })
    }

    fn huggingface_model(&self, requested: Option<&str>) -> Result<String> {
        let hf = &self.config.huggingface;

        let model = match requested.map(str::trim) {
            Some(model) if !model.is_empty() => model,
            _ => return Ok(hf.default_model().to_string()),
        };

        if !hf.models.is_empty() && !hf.models.iter().any(|m| m == model) {
            return Err(ImageGenError::InvalidRequest(format!(
                "model '{model}' is not one of: {}",
                hf.models.join(", ")
            )));
        }

        Ok(model.to_string())
    }

    fn tuning(&self, inputs: &GenerationInputs) -> Result<TuningParams> {
        let hf = &self.config.huggingface;

        let steps = match inputs.steps {
            None => hf.default_steps,
            Some(steps) => u32::try_from(steps)
                .ok()
                .filter(|s| STEP_RANGE.contains(s))
                .ok_or_else(|| {
                    ImageGenError::InvalidRequest(format!(
                        "step count must be between {} and {}, got {steps}",
                        STEP_RANGE.start(),
                        STEP_RANGE.end()
                    ))
                })?,
        };

        let guidance_scale = inputs.guidance_scale.unwrap_or(hf.default_guidance_scale);
        if !GUIDANCE_SCALE_RANGE.contains(&guidance_scale) {
            return Err(ImageGenError::InvalidRequest(format!(
                "guidance scale must be between {:.1} and {:.1}, got {guidance_scale}",
                GUIDANCE_SCALE_RANGE.start(),
                GUIDANCE_SCALE_RANGE.end()
            )));
        }

        Ok(TuningParams { steps, guidance_scale })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(backend: BackendKind, inputs: &GenerationInputs) -> Result<Option<BuiltRequest>> {
        let config = ImageGenConfig::default();
        RequestBuilder::new(&config, backend).build(inputs)
    }

    #[test]
    fn allowed_openai_sizes_pass_through() {
        for size in ["1024x1024", "1024x1536", "1536x1024", "auto"] {
            let built = build(BackendKind::Openai, &GenerationInputs::new("a castle").with_size(size))
                .unwrap()
                .unwrap();

            assert_eq!(built.request.size_label(), size);
            assert!(built.warnings.is_empty());
        }
    }

    #[test]
    fn unsupported_openai_size_defaults_with_warning() {
        for size in ["512x512", "1792x1024", "AUTO", ""] {
            let built = build(BackendKind::Openai, &GenerationInputs::new("a castle").with_size(size))
                .unwrap()
                .unwrap();

            assert_eq!(built.request.size(), ImageSize::OpenAi(OpenAiSize::Square));
            assert_eq!(built.warnings, ["Invalid size selected; defaulting to 1024x1024."]);
        }
    }

    #[test]
    fn openai_uses_configured_model_and_no_tuning() {
        let inputs = GenerationInputs::new("a castle").with_model("dall-e-2").with_tuning(20, 5.0);
        let built = build(BackendKind::Openai, &inputs).unwrap().unwrap();

        assert_eq!(built.request.model(), "gpt-image-1");
        assert_eq!(built.request.tuning(), None);
    }

    #[test]
    fn empty_prompt_is_a_noop() {
        for prompt in ["", "   ", "\n\t"] {
            assert!(build(BackendKind::Openai, &GenerationInputs::new(prompt)).unwrap().is_none());
            assert!(build(BackendKind::Huggingface, &GenerationInputs::new(prompt)).unwrap().is_none());
        }
    }

    #[test]
    fn prompt_is_sent_as_typed() {
        for backend in [BackendKind::Openai, BackendKind::Huggingface] {
            let built = build(backend, &GenerationInputs::new("  watercolor fox \n"))
                .unwrap()
                .unwrap();
            assert_eq!(built.request.prompt(), "  watercolor fox \n");
        }
    }

    #[test]
    fn non_positive_count_is_invalid() {
        for count in [0, -1] {
            let err = build(BackendKind::Openai, &GenerationInputs::new("fox").with_count(count)).unwrap_err();
            assert!(matches!(err, ImageGenError::InvalidRequest(_)));
        }
    }

    #[test]
    fn count_is_clamped_per_backend() {
        let built = build(BackendKind::Openai, &GenerationInputs::new("fox").with_count(9))
            .unwrap()
            .unwrap();
        assert_eq!(built.request.count(), 4);
        assert_eq!(built.warnings, ["openai supports at most 4 images per batch; generating 4."]);

        let built = build(BackendKind::Huggingface, &GenerationInputs::new("fox").with_count(4))
            .unwrap()
            .unwrap();
        assert_eq!(built.request.count(), 3);

        let built = build(BackendKind::Huggingface, &GenerationInputs::new("fox").with_count(2))
            .unwrap()
            .unwrap();
        assert_eq!(built.request.count(), 2);
        assert!(built.warnings.is_empty());
    }

    #[test]
    fn huggingface_defaults() {
        let built = build(BackendKind::Huggingface, &GenerationInputs::new("fox")).unwrap().unwrap();

        assert_eq!(
            built.request.size(),
            ImageSize::Custom(Dimensions {
                width: 1024,
                height: 1024
            })
        );
        assert_eq!(built.request.model(), "stabilityai/stable-diffusion-xl-base-1.0");
        assert_eq!(
            built.request.tuning(),
            Some(TuningParams {
                steps: 30,
                guidance_scale: 7.5
            })
        );
    }

    #[test]
    fn huggingface_parses_resolution() {
        let built = build(BackendKind::Huggingface, &GenerationInputs::new("fox").with_size("768x512"))
            .unwrap()
            .unwrap();
        assert_eq!(built.request.size_label(), "768x512");
    }

    #[test]
    fn huggingface_rejects_bad_resolution() {
        for size in ["auto", "0x512", "wide"] {
            let err = build(BackendKind::Huggingface, &GenerationInputs::new("fox").with_size(size)).unwrap_err();
            assert!(matches!(err, ImageGenError::InvalidRequest(_)), "{size}");
        }
    }

    #[test]
    fn huggingface_model_must_be_listed() {
        let ok = build(
            BackendKind::Huggingface,
            &GenerationInputs::new("fox").with_model("runwayml/stable-diffusion-v1-5"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(ok.request.model(), "runwayml/stable-diffusion-v1-5");

        let err = build(BackendKind::Huggingface, &GenerationInputs::new("fox").with_model("acme/unknown")).unwrap_err();
        assert!(err.to_string().contains("acme/unknown"));
    }

    #[test]
    fn blank_model_uses_default() {
        let built = build(BackendKind::Huggingface, &GenerationInputs::new("fox").with_model("  "))
            .unwrap()
            .unwrap();
        assert_eq!(built.request.model(), "stabilityai/stable-diffusion-xl-base-1.0");
    }

    #[test]
    fn tuning_bounds_are_enforced() {
        let ok = build(BackendKind::Huggingface, &GenerationInputs::new("fox").with_tuning(5, 15.0))
            .unwrap()
            .unwrap();
        assert_eq!(
            ok.request.tuning(),
            Some(TuningParams {
                steps: 5,
                guidance_scale: 15.0
            })
        );

        for (steps, guidance) in [(4, 7.5), (51, 7.5), (-3, 7.5), (30, 0.5), (30, 15.5)] {
            let err = build(
                BackendKind::Huggingface,
                &GenerationInputs::new("fox").with_tuning(steps, guidance),
            )
            .unwrap_err();
            assert!(matches!(err, ImageGenError::InvalidRequest(_)), "{steps} {guidance}");
        }
    }
}
