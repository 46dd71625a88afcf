use std::fmt;
use thiserror::Error;
use url::Url;

/// Environment variable holding the backend base URL.
pub const BASE_URL_VAR: &str = "SUPABASE_URL";
/// Environment variable holding the backend access credential.
pub const ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";

const REDACTED: &str = "***";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid backend URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid docs path {path:?}: {reason}")]
    InvalidDocsPath { path: String, reason: String },
}

/// Backend location and credential, fixed for the lifetime of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    base_url: String,
    anon_key: String,
}

impl ServiceConfig {
    /// Validates both values. Empty or whitespace-only values count as missing.
    pub fn new(base_url: Option<&str>, anon_key: Option<&str>) -> Result<Self, ConfigError> {
        let base_url = base_url
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(BASE_URL_VAR))?;
        let anon_key = anon_key
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(ANON_KEY_VAR))?;

        let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// REST root of the backend, e.g. `https://x.supabase.co/rest/v1`.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url)
    }

    /// Replaces every verbatim occurrence of the credential with `***`.
    pub fn redact(&self, text: &str) -> String {
        text.replace(&self.anon_key, REDACTED)
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("base_url", &self.base_url)
            .field("anon_key", &REDACTED)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_trailing_slash() {
        let config = ServiceConfig::new(Some("https://demo.supabase.co/"), Some("anon")).unwrap();
        assert_eq!(config.base_url(), "https://demo.supabase.co");
        assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(
            ServiceConfig::new(None, Some("anon")),
            Err(ConfigError::Missing(BASE_URL_VAR))
        );
        assert_eq!(
            ServiceConfig::new(Some("https://demo.supabase.co"), Some("  ")),
            Err(ConfigError::Missing(ANON_KEY_VAR))
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = ServiceConfig::new(Some("not a url"), Some("anon")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        let err = ServiceConfig::new(Some("ftp://demo.supabase.co"), Some("anon")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_debug_and_redact_hide_key() {
        let config = ServiceConfig::new(Some("https://demo.supabase.co"), Some("s3cr3t-key")).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cr3t-key"));
        assert_eq!(config.redact("apikey=s3cr3t-key&x=1"), "apikey=***&x=1");
    }
}
