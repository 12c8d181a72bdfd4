use secrecy::{ExposeSecret, SecretString};

use crate::{Config, SecretsFile};

/// A place credentials can be looked up by name
///
/// Returning `Err` signals that the source itself is unavailable. The
/// resolver treats that the same as "no value" and moves on.
pub trait CredentialSource: Send + Sync {
    /// Short identifier used in log output
    fn name(&self) -> &str;

    /// Look up a credential by name
    fn lookup(&self, key: &str) -> anyhow::Result<Option<SecretString>>;
}

/// Process environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl CredentialSource for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn lookup(&self, key: &str) -> anyhow::Result<Option<SecretString>> {
        Ok(std::env::var(key).ok().map(SecretString::from))
    }
}

/// Ordered chain of credential sources, first non-empty value wins
#[derive(Default)]
pub struct CredentialResolver {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialResolver {
    /// Create a resolver with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source consulted after the ones already registered
    #[must_use]
    pub fn with_source<S: CredentialSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Secrets file from the configuration first, then the environment
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_source(SecretsFile::new(&config.secrets_file))
            .with_source(EnvSource)
    }

    /// Names of the registered sources in lookup order
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve a credential by name
    ///
    /// Sources that fail are skipped, empty values are ignored. Surrounding
    /// whitespace is stripped from the returned value.
    pub fn resolve(&self, key: &str) -> Option<SecretString> {
        for source in &self.sources {
            match source.lookup(key) {
                Ok(Some(value)) => {
                    let trimmed = value.expose_secret().trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    tracing::debug!(credential = key, source = source.name(), "credential resolved");
                    return Some(SecretString::from(trimmed));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(
                        credential = key,
                        source = source.name(),
                        error = %e,
                        "credential source unavailable, skipping"
                    );
                }
            }
        }

        tracing::debug!(credential = key, "credential not found in any source");
        None
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("sources", &self.source_names())
            .finish()
    }
}
