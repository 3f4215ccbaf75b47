use std::env;
use std::fmt;

use thiserror::Error;

/// Name of the secret holding the Gemini API key.
pub const CREDENTIAL_VAR: &str = "GOOGLE_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY is not set: add the API key to the service configuration and restart")]
    MissingCredential,

    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("could not set up the model client: {0}")]
    ClientInit(String),
}

/// Process-wide configuration, resolved once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// A missing credential is not an error here: the service still starts and
    /// reports it on every page, see [`AppConfig::credential`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let api_key = non_blank(lookup(CREDENTIAL_VAR));
        let model = non_blank(lookup("GEMINI_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url =
            non_blank(lookup("GEMINI_BASE_URL")).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            port,
            api_key,
            model,
            base_url,
        })
    }

    pub fn credential(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingCredential)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = config_from(&[("GOOGLE_API_KEY", "secret")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.credential(), Ok("secret"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = config_from(&[("GOOGLE_API_KEY", "   ")]).unwrap();

        assert_eq!(config.credential(), Err(ConfigError::MissingCredential));
    }

    #[test]
    fn absent_key_counts_as_missing() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.credential(), Err(ConfigError::MissingCredential));
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("GOOGLE_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_BASE_URL", "http://127.0.0.1:9999"),
            ("PORT", "8080"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();

        assert_eq!(err, ConfigError::InvalidPort("eighty".to_string()));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = config_from(&[("GOOGLE_API_KEY", "secret")]).unwrap();

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
