//! Environment configuration

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::completion::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Outbound request deadline used when `GPT_TIMEOUT_SECS` is unset
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const ENVIRONMENT_VAR: &str = "environment";
const LIVE_ENVIRONMENT: &str = "live";
const ENV_FILE: &str = ".env";

const API_KEY_VAR: &str = "GPT_API_KEY";
const MODEL_VAR: &str = "GPT_MODEL";
const BASE_URL_VAR: &str = "GPT_API_BASE_URL";
const TIMEOUT_VAR: &str = "GPT_TIMEOUT_SECS";

/// Errors that prevent the service from starting
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `.env` file could not be loaded outside the live environment
    #[error("could not load the .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
    /// `GPT_API_KEY` is unset or blank
    #[error("GPT_API_KEY not set")]
    MissingApiKey,
    /// `GPT_TIMEOUT_SECS` is not a positive integer
    #[error("GPT_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
}

/// Settings for talking to the completion API
#[derive(Clone)]
pub struct Config {
    /// Bearer credential for the completion API
    pub api_key: String,
    /// Model identifier sent with every request
    pub model: String,
    /// API root, without a trailing slash
    pub base_url: String,
    /// Deadline for each outbound request
    pub timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Unless `environment=live`, a `.env` file in the working directory is
    /// loaded first and must exist. Parent directories are not searched.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_in(".")
    }

    /// Like [`Config::load`], but looks for `.env` in `dir` only.
    pub fn load_in(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if std::env::var(ENVIRONMENT_VAR).as_deref() != Ok(LIVE_ENVIRONMENT) {
            load_env_file(dir.as_ref())?;
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load an explicit env file into the process environment, then read
    /// configuration from it.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let model = lookup(MODEL_VAR)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = lookup(BASE_URL_VAR)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout,
        })
    }
}

/// Load `dir/.env` into the process environment.
fn load_env_file(dir: &Path) -> Result<(), ConfigError> {
    let path = dir.join(ENV_FILE);
    dotenvy::from_path(&path)?;
    tracing::debug!("Loaded environment from {}", path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write as _;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GPT_API_KEY", "sk-abc")])).unwrap();

        assert_eq!(config.api_key, "sk-abc");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_api_key() {
        let result = Config::from_lookup(lookup_from(&[("GPT_MODEL", "gpt-4o")]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_blank_api_key() {
        let result = Config::from_lookup(lookup_from(&[("GPT_API_KEY", "   ")]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GPT_API_KEY", " sk-abc \n"),
            ("GPT_MODEL", "gpt-4o-mini"),
            ("GPT_API_BASE_URL", "http://localhost:11434/v1/"),
            ("GPT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "sk-abc");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout() {
        for raw in ["0", "-3", "soon", ""] {
            let result = Config::from_lookup(lookup_from(&[
                ("GPT_API_KEY", "sk-abc"),
                ("GPT_TIMEOUT_SECS", raw),
            ]));
            assert!(
                matches!(result, Err(ConfigError::InvalidTimeout(ref v)) if v == raw),
                "raw: {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config::from_lookup(lookup_from(&[("GPT_API_KEY", "sk-secret")])).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GPT_API_KEY=sk-from-file").unwrap();
        writeln!(file, "QUILL_TEST_ENV_FILE_MARKER=loaded").unwrap();
        file.flush().unwrap();

        // dotenvy never overrides variables that are already set, so only
        // the marker is guaranteed to come from the file
        let config = Config::load_from_file(file.path()).unwrap();
        assert!(!config.api_key.is_empty());
        assert_eq!(
            std::env::var("QUILL_TEST_ENV_FILE_MARKER").as_deref(),
            Ok("loaded")
        );
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from_file(dir.path().join("missing.env"));
        assert!(matches!(result, Err(ConfigError::EnvFile(_))));
    }

    #[test]
    fn test_env_file_only_read_from_given_dir() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(
            root.path().join(".env"),
            "QUILL_TEST_PARENT_ENV_MARKER=parent\n",
        )
        .unwrap();
        let child = root.path().join("child");
        std::fs::create_dir(&child).unwrap();

        let result = load_env_file(&child);
        assert!(matches!(result, Err(ConfigError::EnvFile(_))), "{:?}", result);
        assert!(std::env::var("QUILL_TEST_PARENT_ENV_MARKER").is_err());
    }

    #[test]
    fn test_env_file_read_from_given_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "QUILL_TEST_LOCAL_ENV_MARKER=local\n",
        )
        .unwrap();

        load_env_file(dir.path()).unwrap();
        assert_eq!(
            std::env::var("QUILL_TEST_LOCAL_ENV_MARKER").as_deref(),
            Ok("local")
        );
    }
}
