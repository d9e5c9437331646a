//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use pansync_config::ConfigError;
use pansync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const PARTIAL_FAILURE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Panorama at {url}")]
    #[diagnostic(
        code(pansync::connection_failed),
        help(
            "Check that the management interface is reachable from this host.\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(pansync::tls_error),
        help(
            "Panorama usually presents a self-signed certificate.\n\
             Use --insecure (-k) to accept it, or set ca_cert in your profile."
        )
    )]
    TlsError { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(pansync::auth_failed),
        help(
            "Verify the user ID and password, or the API key.\n\
             The account needs XML and REST API access on Panorama."
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials available for profile '{profile}'")]
    #[diagnostic(
        code(pansync::no_credentials),
        help(
            "Pass USERID and PASSWORD, use --api-key, set PANSYNC_PASSWORD,\n\
             or store a password in the keyring under service 'pansync'."
        )
    )]
    NoCredentials { profile: String },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Device group '{name}' does not exist")]
    #[diagnostic(
        code(pansync::device_group_not_found),
        help("Run: pansync device-groups to see available device groups")
    )]
    DeviceGroupNotFound { name: String },

    // ── Rule file ────────────────────────────────────────────────────
    #[error("Cannot read rule file {path}: {reason}")]
    #[diagnostic(code(pansync::rule_file))]
    RuleFile { path: String, reason: String },

    #[error("{problems} problem(s) found in {path}")]
    #[diagnostic(
        code(pansync::check_failed),
        help("Rows with problems are skipped by `pansync sync`.")
    )]
    CheckFailed { path: String, problems: usize },

    // ── Outcome ──────────────────────────────────────────────────────
    #[error("{failed} of {attempted} rule creation(s) failed")]
    #[diagnostic(
        code(pansync::partial_failure),
        help("Fix the failing rules and run sync again; existing rules are skipped.")
    )]
    PartialFailure { failed: usize, attempted: usize },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", code_suffix(.code.as_deref()))]
    #[diagnostic(code(pansync::api_error))]
    ApiError {
        code: Option<String>,
        message: String,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(pansync::timeout),
        help("Increase the timeout with --timeout or check Panorama responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(pansync::validation))]
    Validation { field: String, reason: String },

    #[error("Missing {name}")]
    #[diagnostic(
        code(pansync::missing_argument),
        help("Pass it as an argument or set `{profile_key}` in the active profile.")
    )]
    MissingArgument { name: String, profile_key: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(pansync::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(pansync::render))]
    Render(String),
}

fn code_suffix(code: Option<&str>) -> String {
    code.map(|c| format!(" ({c})")).unwrap_or_default()
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::DeviceGroupNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::PartialFailure { .. } => exit_code::PARTIAL_FAILURE,
            Self::Validation { .. } | Self::MissingArgument { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                if let Some(tls) = reason.strip_prefix("TLS error: ") {
                    CliError::TlsError { reason: tls.into() }
                } else {
                    CliError::ConnectionFailed {
                        url,
                        source: reason.into(),
                    }
                }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::DeviceGroupNotFound { name } => CliError::DeviceGroupNotFound { name },

            CoreError::RuleFile { path, reason } => CliError::RuleFile {
                path: path.display().to_string(),
                reason,
            },

            CoreError::Api {
                message,
                code,
                status: _,
            } => CliError::ApiError { code, message },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Serialization(e) => CliError::Render(e.to_string()),
            ConfigError::Figment(e) => CliError::Config(e),
        }
    }
}
