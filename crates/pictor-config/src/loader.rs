use std::path::Path;

use crate::{Config, GUIDANCE_SCALE_RANGE, STEP_RANGE};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Load configuration from `path`, falling back to built-in defaults
    /// when the file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::debug!(config_path = %path.display(), "config file not found, using defaults");
        Ok(Self::default())
    }

    /// Parse configuration from raw TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if a backend is misconfigured
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_openai()?;
        self.validate_huggingface()?;
        Ok(())
    }

    fn validate_openai(&self) -> anyhow::Result<()> {
        let openai = &self.imagegen.openai;

        if openai.base_url.trim().is_empty() {
            anyhow::bail!("imagegen.openai.base_url must not be empty");
        }

        if openai.model.trim().is_empty() {
            anyhow::bail!("imagegen.openai.model must not be empty");
        }

        if openai.api_key_name.trim().is_empty() {
            anyhow::bail!("imagegen.openai.api_key_name must not be empty");
        }

        Ok(())
    }

    fn validate_huggingface(&self) -> anyhow::Result<()> {
        let hf = &self.imagegen.huggingface;

        if hf.base_url.trim().is_empty() {
            anyhow::bail!("imagegen.huggingface.base_url must not be empty");
        }

        if hf.token_name.trim().is_empty() {
            anyhow::bail!("imagegen.huggingface.token_name must not be empty");
        }

        if let Some(blank) = hf.models.iter().position(|m| m.trim().is_empty()) {
            anyhow::bail!("imagegen.huggingface.models[{blank}] must not be empty");
        }

        if !STEP_RANGE.contains(&hf.default_steps) {
            anyhow::bail!(
                "imagegen.huggingface.default_steps must be between {} and {}",
                STEP_RANGE.start(),
                STEP_RANGE.end()
            );
        }

        if !GUIDANCE_SCALE_RANGE.contains(&hf.default_guidance_scale) {
            anyhow::bail!(
                "imagegen.huggingface.default_guidance_scale must be between {} and {}",
                GUIDANCE_SCALE_RANGE.start(),
                GUIDANCE_SCALE_RANGE.end()
            );
        }

        Ok(())
    }
}
