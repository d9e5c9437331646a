// ── Runtime session configuration ──
//
// These types describe *how* to reach Panorama and how a pass should
// behave. They carry credential data but never touch disk; the CLI
// builds them from flags and profiles and hands them in.

use std::time::Duration;

use pansync_api::{DEFAULT_API_VERSION, Rulebase};
use secrecy::SecretString;
use url::Url;

/// How to authenticate with Panorama.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Pre-generated API key; skips keygen.
    ApiKey(SecretString),
    /// Username/password exchanged for a key at connect time.
    Credentials {
        username: String,
        password: SecretString,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed management certificates).
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for one session against a Panorama instance.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Management URL (e.g., `https://panorama.example.com`).
    pub url: Url,
    /// Authentication method and credentials.
    pub auth: AuthCredentials,
    /// REST API version segment.
    pub api_version: String,
    /// Which device-group rulebase rules are read from and created in.
    pub rulebase: Rulebase,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SessionConfig {
    pub fn new(url: Url, auth: AuthCredentials) -> Self {
        Self {
            url,
            auth,
            api_version: DEFAULT_API_VERSION.to_owned(),
            rulebase: Rulebase::default(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Tuning for a reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Maximum creates in flight. Values below 1 are treated as 1.
    pub concurrency: usize,
    /// Upper bound on a single create call.
    pub create_timeout: Duration,
    /// Decide everything but never call the device.
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            create_timeout: Duration::from_secs(30),
            dry_run: false,
        }
    }
}
