//! Client configuration.

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://api-v3.mbta.com";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "MBTA_API_KEY";
/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "MBTA_BASE_URL";

/// Static configuration, read-only once the client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Sent as `X-API-Key`. Without it the API applies a low request quota.
    pub api_key: Option<SecretString>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl ClientConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key: String = api_key.into();
        self.api_key = (!key.is_empty()).then(|| SecretString::new(key.into_boxed_str()));
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read `MBTA_API_KEY` and `MBTA_BASE_URL`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.is_empty()) {
            config = config.with_base_url(url);
        }
        if let Some(key) = lookup(API_KEY_ENV) {
            config = config.with_api_key(key);
        }
        if config.api_key.is_none() {
            warn!("no API key configured; requests are subject to the anonymous rate limit");
        }
        config
    }

    pub(crate) fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub(crate) fn api_key_header(&self) -> Option<(String, String)> {
        self.api_key
            .as_ref()
            .map(|key| ("X-API-Key".to_string(), key.expose_secret().to_string()))
    }
}
