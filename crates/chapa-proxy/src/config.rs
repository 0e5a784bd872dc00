use secrecy::{ExposeSecret, SecretString};
use std::env;

use crate::ChapaError;

/// Default production API base.
pub const DEFAULT_BASE_URL: &str = "https://api.chapa.co/v1";

/// Configuration for the Chapa gateway client.
///
/// The secret key authorizes initialize/verify calls and must never
/// reach a client; it stays wrapped in a [`SecretString`].
#[derive(Debug, Clone)]
pub struct ChapaConfig {
    /// API base URL (default: `https://api.chapa.co/v1`)
    pub base_url: String,
    /// Server-side secret key
    secret_key: SecretString,
}

impl ChapaConfig {
    /// Create a new configuration with explicit values.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `CHAPA_SECRET_KEY` - server-side secret key
    ///
    /// Optional (with defaults):
    /// - `CHAPA_BASE_URL` - Default: `https://api.chapa.co/v1`
    pub fn from_env() -> Result<Self, ChapaError> {
        let secret_key = env::var("CHAPA_SECRET_KEY")
            .map_err(|_| ChapaError::MissingEnvVar("CHAPA_SECRET_KEY".to_string()))?;

        if secret_key.trim().is_empty() {
            return Err(ChapaError::Config(
                "CHAPA_SECRET_KEY must not be empty".to_string(),
            ));
        }

        let base_url = env::var("CHAPA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            base_url,
            secret_key: SecretString::from(secret_key),
        })
    }

    /// Builder method to set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get the secret key (exposes the secret).
    pub(crate) fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_uses_default_base() {
        let config = ChapaConfig::new("CHASECK_TEST-xyz");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.secret_key(), "CHASECK_TEST-xyz");
    }

    #[test]
    fn base_url_override() {
        let config = ChapaConfig::new("k").with_base_url("http://127.0.0.1:9090/v1");
        assert_eq!(config.base_url, "http://127.0.0.1:9090/v1");
    }
}
