//! Programmatic configuration for integration tests

use std::collections::HashMap;

use pictor_config::{BackendKind, CredentialResolver, CredentialSource, ImageGenConfig};
use secrecy::SecretString;

/// Builder for an [`ImageGenConfig`] pointed at a mock vendor
pub struct ConfigBuilder {
    config: ImageGenConfig,
}

impl ConfigBuilder {
    /// Built-in defaults
    pub fn new() -> Self {
        Self {
            config: ImageGenConfig::default(),
        }
    }

    /// Use the `OpenAI` backend at `base_url`
    pub fn with_openai(mut self, base_url: &str) -> Self {
        self.config.backend = BackendKind::Openai;
        self.config.openai.base_url = base_url.to_owned();
        self
    }

    /// Use the Hugging Face backend at `base_url`
    pub fn with_huggingface(mut self, base_url: &str) -> Self {
        self.config.backend = BackendKind::Huggingface;
        self.config.huggingface.base_url = base_url.to_owned();
        self
    }

    /// Override whether either backend stops after its first failure
    pub fn halt_on_first_error(mut self, halt: bool) -> Self {
        self.config.openai.halt_on_first_error = halt;
        self.config.huggingface.halt_on_first_error = halt;
        self
    }

    /// Build the final config
    pub fn build(self) -> ImageGenConfig {
        self.config
    }
}

/// In-memory credential store
#[derive(Default)]
pub struct StaticCredentials(HashMap<String, String>);

impl StaticCredentials {
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Resolver consulting only this store
    pub fn into_resolver(self) -> CredentialResolver {
        CredentialResolver::new().with_source(self)
    }
}

impl CredentialSource for StaticCredentials {
    fn name(&self) -> &str {
        "static"
    }

    fn lookup(&self, key: &str) -> anyhow::Result<Option<SecretString>> {
        Ok(self.0.get(key).map(|v| SecretString::from(v.as_str())))
    }
}

/// Store that is always unavailable
pub struct UnavailableStore;

impl CredentialSource for UnavailableStore {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn lookup(&self, _key: &str) -> anyhow::Result<Option<SecretString>> {
        anyhow::bail!("secrets store is not reachable")
    }
}
