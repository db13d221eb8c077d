//! Configuration for the client runtime.
//!
//! All configuration is loaded from environment variables. The runtime
//! needs to know where the game server lives, how long to wait for a
//! response, and whether diagnostics should be forwarded to it.

use std::time::Duration;

use crate::error::ConfigError;

/// Game server address used when `ECHOES_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address of the game server, without a trailing slash.
    pub api_url: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Whether error-level diagnostics are forwarded to `/log`.
    pub telemetry_enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            request_timeout: Duration::from_millis(10_000),
            telemetry_enabled: true,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `ECHOES_API_URL` -- game server base address (default `http://localhost:8080`)
    /// - `ECHOES_REQUEST_TIMEOUT_MS` -- HTTP timeout in milliseconds (default 10000)
    /// - `ECHOES_TELEMETRY_ENABLED` -- forward diagnostics to the server (default `true`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("ECHOES_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_url = raw_url.trim().trim_end_matches('/').to_owned();
        reqwest::Url::parse(&api_url).map_err(|e| ConfigError::Invalid {
            name: "ECHOES_API_URL",
            message: format!("{e}"),
        })?;

        let timeout_ms: u64 = lookup("ECHOES_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "10000".to_owned())
            .trim()
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "ECHOES_REQUEST_TIMEOUT_MS",
                message: format!("{e}"),
            })?;

        let telemetry_enabled: bool = lookup("ECHOES_TELEMETRY_ENABLED")
            .unwrap_or_else(|| "true".to_owned())
            .trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "ECHOES_TELEMETRY_ENABLED",
                message: format!("{e}"),
            })?;

        Ok(Self {
            api_url,
            request_timeout: Duration::from_millis(timeout_ms),
            telemetry_enabled,
        })
    }

    /// Build the HTTP client shared by game actions and log forwarding.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(format!("{e}")))
    }
}
