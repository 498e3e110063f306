use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

/// Base URL of the push API when nothing else is configured.
pub const DEFAULT_PUSH_API_URL: &str = "https://push.cloud.coveo.com";

/// Environment variable that overrides [`DEFAULT_PUSH_API_URL`].
pub const PUSH_API_URL_ENV: &str = "PUSH_API_URL";

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity of the caller. Immutable for the lifetime of a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub organization_id: String,
    pub source_id: String,
    pub access_token: String,
}

impl Credentials {
    pub fn new(
        organization_id: impl Into<String>,
        source_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            source_id: source_id.into(),
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("organization_id", &self.organization_id)
            .field("source_id", &self.source_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Transport settings for [`crate::client::PushClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and host of the push API, without a trailing slash.
    pub push_api_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            push_api_url: DEFAULT_PUSH_API_URL.to_string(),
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `push_api_url`, with the default timeouts.
    pub fn with_push_api_url(push_api_url: impl Into<String>) -> Self {
        let push_api_url: String = push_api_url.into();
        Self {
            push_api_url: push_api_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Reads `PUSH_API_URL`, falling back to the default.
    ///
    /// `.env` is loaded once at binary startup, see [`crate::cli::init_tracing`].
    pub fn from_env() -> Self {
        match std::env::var(PUSH_API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => {
                info!(push_api_url = %url, "Using push API URL from environment");
                Self::with_push_api_url(url.trim())
            }
            Ok(_) => {
                warn!(var = PUSH_API_URL_ENV, "Ignoring empty push API URL from environment");
                Self::default()
            }
            Err(e) => {
                debug!(error = ?e, var = PUSH_API_URL_ENV, "Push API URL not set, using default");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_access_token() {
        let creds = Credentials::new("orgA", "srcA", "super-secret");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("orgA"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let config = ClientConfig::with_push_api_url("http://127.0.0.1:1234/");
        assert_eq!(config.push_api_url, "http://127.0.0.1:1234");
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
        assert_eq!(config.read_timeout, Duration::from_secs(10));
    }
}
