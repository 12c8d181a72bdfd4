//! Structured secrets store backed by a TOML file
//!
//! The file holds top-level string entries keyed by credential name:
//!
//! ```toml
//! OPENAI_API_KEY = "sk-..."
//! OPENAI_ORG = "org_..."
//! HF_TOKEN = "hf_..."
//! ```

use std::path::PathBuf;

use secrecy::SecretString;

use crate::credentials::CredentialSource;

/// Secrets file consulted before the process environment
///
/// The file is read on every lookup so edits made while the process runs
/// are picked up by the next generation.
#[derive(Debug, Clone)]
pub struct SecretsFile {
    path: PathBuf,
}

impl SecretsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_table(&self) -> anyhow::Result<Option<toml::Table>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| anyhow::anyhow!("failed to read secrets file {}: {e}", self.path.display()))?;

        let table = toml::from_str::<toml::Table>(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse secrets file {}: {e}", self.path.display()))?;

        Ok(Some(table))
    }
}

impl CredentialSource for SecretsFile {
    fn name(&self) -> &str {
        "secrets_file"
    }

    fn lookup(&self, key: &str) -> anyhow::Result<Option<SecretString>> {
        let Some(table) = self.read_table()? else {
            return Ok(None);
        };

        match table.get(key) {
            None => Ok(None),
            Some(toml::Value::String(value)) => Ok(Some(SecretString::from(value.clone()))),
            Some(_) => anyhow::bail!("secret '{key}' in {} must be a string", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn reads_string_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "OPENAI_API_KEY = \"sk-from-file\"\n").unwrap();

        let store = SecretsFile::new(&path);
        let value = store.lookup("OPENAI_API_KEY").unwrap().unwrap();
        assert_eq!(value.expose_secret(), "sk-from-file");
        assert!(store.lookup("OPENAI_ORG").unwrap().is_none());
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretsFile::new(dir.path().join("nope.toml"));
        assert!(store.lookup("OPENAI_API_KEY").unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "OPENAI_API_KEY = \n").unwrap();

        assert!(SecretsFile::new(&path).lookup("OPENAI_API_KEY").is_err());
    }

    #[test]
    fn non_string_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "HF_TOKEN = 42\n").unwrap();

        let err = SecretsFile::new(&path).lookup("HF_TOKEN").unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn edits_are_visible_to_later_lookups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        let store = SecretsFile::new(&path);

        assert!(store.lookup("HF_TOKEN").unwrap().is_none());

        std::fs::write(&path, "HF_TOKEN = \"hf_rotated\"\n").unwrap();
        assert_eq!(store.lookup("HF_TOKEN").unwrap().unwrap().expose_secret(), "hf_rotated");
    }
}
