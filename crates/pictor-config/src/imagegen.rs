use std::{fmt, ops::RangeInclusive, str::FromStr};

use serde::Deserialize;

/// Accepted denoising step counts for diffusion backends
pub const STEP_RANGE: RangeInclusive<u32> = 5..=50;

/// Accepted classifier-free guidance scales for diffusion backends
pub const GUIDANCE_SCALE_RANGE: RangeInclusive<f32> = 1.0..=15.0;

/// Image generation configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageGenConfig {
    /// Backend used when none is chosen explicitly
    #[serde(default)]
    pub backend: BackendKind,
    /// `OpenAI` Images API settings
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Hugging Face inference API settings
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
}

/// Supported image generation backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// `OpenAI` Images API
    #[default]
    Openai,
    /// Hugging Face hosted text-to-image inference
    Huggingface,
}

impl BackendKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Huggingface => "huggingface",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::Openai),
            "huggingface" | "hf" => Ok(Self::Huggingface),
            other => Err(format!("unknown backend '{other}' (expected 'openai' or 'huggingface')")),
        }
    }
}

/// Settings for the `OpenAI` Images API backend
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API base URL
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Fixed model identifier sent with every request
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// Credential name holding the API key
    #[serde(default = "default_openai_key_name")]
    pub api_key_name: String,
    /// Credential name holding the optional organization id
    #[serde(default = "default_openai_org_name")]
    pub organization_key_name: String,
    /// Stop the batch at the first failed image
    #[serde(default = "default_true")]
    pub halt_on_first_error: bool,
    /// Translate vendor errors into guidance messages
    #[serde(default = "default_true")]
    pub classify_errors: bool,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            api_key_name: default_openai_key_name(),
            organization_key_name: default_openai_org_name(),
            halt_on_first_error: true,
            classify_errors: true,
        }
    }
}

/// Settings for the Hugging Face inference backend
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HuggingFaceConfig {
    /// Inference API base URL, models are addressed as `{base_url}/models/{model}`
    #[serde(default = "default_huggingface_base_url")]
    pub base_url: String,
    /// Selectable models, the first entry is the default
    #[serde(default = "default_huggingface_models")]
    pub models: Vec<String>,
    /// Credential name holding the bearer token
    #[serde(default = "default_huggingface_token_name")]
    pub token_name: String,
    /// Resolution used when none is given, as `WxH`
    #[serde(default = "default_huggingface_size")]
    pub default_size: String,
    /// Denoising steps used when none are given
    #[serde(default = "default_steps")]
    pub default_steps: u32,
    /// Guidance scale used when none is given
    #[serde(default = "default_guidance_scale")]
    pub default_guidance_scale: f32,
    /// Stop the batch at the first failed image
    #[serde(default)]
    pub halt_on_first_error: bool,
    /// Translate vendor errors into guidance messages
    #[serde(default)]
    pub classify_errors: bool,
}

impl HuggingFaceConfig {
    /// Model used when the caller does not pick one
    pub fn default_model(&self) -> &str {
        self.models
            .first()
            .map_or(DEFAULT_HUGGINGFACE_MODEL, String::as_str)
    }
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            base_url: default_huggingface_base_url(),
            models: default_huggingface_models(),
            token_name: default_huggingface_token_name(),
            default_size: default_huggingface_size(),
            default_steps: default_steps(),
            default_guidance_scale: default_guidance_scale(),
            halt_on_first_error: false,
            classify_errors: false,
        }
    }
}

const DEFAULT_HUGGINGFACE_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-image-1".to_string()
}

fn default_openai_key_name() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_org_name() -> String {
    "OPENAI_ORG".to_string()
}

fn default_huggingface_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_huggingface_models() -> Vec<String> {
    vec![
        DEFAULT_HUGGINGFACE_MODEL.to_string(),
        "stabilityai/stable-diffusion-2-1".to_string(),
        "runwayml/stable-diffusion-v1-5".to_string(),
    ]
}

fn default_huggingface_token_name() -> String {
    "HF_TOKEN".to_string()
}

fn default_huggingface_size() -> String {
    "1024x1024".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_steps() -> u32 {
    30
}

#[allow(clippy::missing_const_for_fn)]
fn default_guidance_scale() -> f32 {
    7.5
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}
