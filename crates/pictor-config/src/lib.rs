#![allow(clippy::must_use_candidate)]

pub mod credentials;
mod env;
pub mod imagegen;
mod loader;
pub mod secrets;
pub mod telemetry;

use std::path::PathBuf;

use serde::Deserialize;

pub use credentials::{CredentialResolver, CredentialSource, EnvSource};
pub use imagegen::*;
pub use secrets::SecretsFile;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Default location of the structured secrets store
pub const DEFAULT_SECRETS_FILE: &str = ".pictor/secrets.toml";

/// Top-level Pictor configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path of the TOML secrets store consulted before the environment
    #[serde(default = "default_secrets_file")]
    pub secrets_file: PathBuf,
    /// Image generation backends
    #[serde(default)]
    pub imagegen: ImageGenConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secrets_file: default_secrets_file(),
            imagegen: ImageGenConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

fn default_secrets_file() -> PathBuf {
    PathBuf::from(DEFAULT_SECRETS_FILE)
}
