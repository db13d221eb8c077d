//! Error types for the client runtime.
//!
//! Uses `thiserror` for typed errors. [`RemoteActionError`] is the uniform
//! failure shape of every game action; the dispatcher absorbs it, only the
//! bootstrap load hands it to presentation.

/// A failed game action.
#[derive(Debug, thiserror::Error)]
pub enum RemoteActionError {
    /// The server answered with a non-2xx status.
    ///
    /// `detail` is the server's explanation when it sent one, otherwise a
    /// generic message for the action.
    #[error("{detail}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided or generic explanation.
        detail: String,
    },

    /// No response arrived at all (refused connection, DNS, timeout).
    #[error("{detail}")]
    Connectivity {
        /// The URL that could not be reached.
        url: String,
        /// Connectivity-specific explanation.
        detail: String,
    },

    /// The server answered 2xx but the body was not the expected shape.
    #[error("{detail}")]
    Decode {
        /// HTTP status code.
        status: u16,
        /// What could not be decoded.
        detail: String,
    },
}

impl RemoteActionError {
    /// HTTP status of the response, when there was one.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Decode { status, .. } => Some(*status),
            Self::Connectivity { .. } => None,
        }
    }

    /// Human-readable explanation.
    pub fn detail(&self) -> &str {
        match self {
            Self::Rejected { detail, .. }
            | Self::Connectivity { detail, .. }
            | Self::Decode { detail, .. } => detail,
        }
    }

    /// Build a connectivity failure from a transport error.
    pub(crate) fn connectivity(url: &str, err: &reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out"
        } else if err.is_connect() {
            "connection failed"
        } else {
            "request could not be sent"
        };
        Self::Connectivity {
            url: url.to_owned(),
            detail: format!("Unable to reach the game server ({reason}): {err}"),
        }
    }
}

/// Configuration is invalid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("invalid {name}: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Parse failure.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// The telemetry pipeline could not be wired into a process hook.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The panic hook is process-wide and may only be registered once.
    #[error("telemetry panic hook is already installed")]
    HookAlreadyInstalled,
}
