// ── Core error types ──
//
// Fatal errors halt a run; `CreateError` is per-row and only ever lands
// in a report's failed list. Transport details from `pansync_api` are
// translated here so callers never match on HTTP specifics.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Panorama at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Device group '{name}' does not exist")]
    DeviceGroupNotFound { name: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Cannot read rule file {}: {reason}", path.display())]
    RuleFile { path: PathBuf, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Panorama error code, when the envelope carried one.
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pansync_api::Error> for CoreError {
    fn from(err: pansync_api::Error) -> Self {
        match err {
            pansync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            pansync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            pansync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            pansync_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            pansync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            pansync_api::Error::Api {
                message,
                code,
                status,
            } => {
                if status == 403 {
                    CoreError::AuthenticationFailed { message }
                } else {
                    CoreError::Api {
                        message,
                        code,
                        status: Some(status),
                    }
                }
            }
            pansync_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Unexpected response from Panorama: {message}"),
                code: None,
                status: None,
            },
        }
    }
}

/// A single create call that did not succeed. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("rejected by device: {message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },

    #[error("timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("transport failure: {message}")]
    Transport { message: String },
}

impl From<pansync_api::Error> for CreateError {
    fn from(err: pansync_api::Error) -> Self {
        match err {
            pansync_api::Error::Timeout { timeout_secs } => CreateError::Timeout { timeout_secs },
            pansync_api::Error::Transport(e) if e.is_timeout() => {
                CreateError::Timeout { timeout_secs: 0 }
            }
            pansync_api::Error::Api { message, code, .. } => CreateError::Rejected { message, code },
            pansync_api::Error::Authentication { message } => CreateError::Rejected {
                message,
                code: None,
            },
            other => CreateError::Transport {
                message: other.to_string(),
            },
        }
    }
}
