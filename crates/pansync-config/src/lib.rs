//! Configuration for pansync.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `pansync_core::SessionConfig`. The CLI layers its flags
//! and positional arguments on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use pansync_api::base_url_from_host;
use pansync_core::{AuthCredentials, ReconcileOptions, Rulebase, SessionConfig, TlsVerification};

/// Keyring service name; entries are `<profile>/password` and `<profile>/api-key`.
pub const KEYRING_SERVICE: &str = "pansync";

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named Panorama profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Copy with every plaintext secret masked, for display.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        for profile in cfg.profiles.values_mut() {
            if profile.password.is_some() {
                profile.password = Some(REDACTED.into());
            }
            if profile.api_key.is_some() {
                profile.api_key = Some(REDACTED.into());
            }
        }
        cfg
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_create_timeout")]
    pub create_timeout: u64,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            create_timeout: default_create_timeout(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_create_timeout() -> u64 {
    30
}
fn default_concurrency() -> usize {
    1
}

/// A named Panorama profile. Every field may be overridden from the command line.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Panorama host or URL (e.g., "panorama.example.com").
    pub host: Option<String>,

    /// Device group rules are reconciled into.
    pub device_group: Option<String>,

    /// Username for keygen.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Pre-generated API key (plaintext -- prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// "pre" or "post".
    pub rulebase: Option<Rulebase>,

    /// REST API version segment, e.g. "v10.1".
    pub api_version: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Override per-create timeout (seconds).
    pub create_timeout: Option<u64>,

    /// Override create concurrency.
    pub concurrency: Option<usize>,

    /// Default rule file for this profile.
    pub rule_file: Option<PathBuf>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "pansync", "pansync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pansync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and `PANSYNC_` variables still
/// apply. Nested keys use a double underscore (`PANSYNC_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PANSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|err| {
        debug!(error = %err, "config unusable, using defaults");
        Config::default()
    })
}

/// Resolve the active profile name: explicit request, then the configured default.
pub fn active_profile_name(requested: Option<&str>, config: &Config) -> String {
    requested
        .map(str::to_owned)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

// ── Credential resolution (without CLI flags) ───────────────────────

type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn keyring_secret(profile_name: &str, item: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{item}")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

/// Password chain: `password_env`, `PANSYNC_PASSWORD`, keyring, plaintext.
fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: EnvLookup<'_>,
) -> Option<SecretString> {
    // 1. Profile's password_env, then the well-known variable
    if let Some(pw) = profile.password_env.as_deref().and_then(env) {
        return Some(SecretString::from(pw));
    }
    if let Some(pw) = env("PANSYNC_PASSWORD") {
        return Some(SecretString::from(pw));
    }

    // 2. System keyring
    if let Some(pw) = keyring_secret(profile_name, "password") {
        return Some(pw);
    }

    // 3. Plaintext in config
    profile.password.clone().map(SecretString::from)
}

/// Key chain: `api_key_env`, `PANSYNC_API_KEY`, keyring, plaintext.
fn resolve_api_key_with(
    profile: &Profile,
    profile_name: &str,
    env: EnvLookup<'_>,
) -> Option<SecretString> {
    if let Some(key) = profile.api_key_env.as_deref().and_then(env) {
        return Some(SecretString::from(key));
    }
    if let Some(key) = env("PANSYNC_API_KEY") {
        return Some(SecretString::from(key));
    }
    if let Some(key) = keyring_secret(profile_name, "api-key") {
        return Some(key);
    }
    profile.api_key.clone().map(SecretString::from)
}

/// Resolve `AuthCredentials`: an API key wins over username/password.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    resolve_auth_with(profile, profile_name, &process_env)
}

fn resolve_auth_with(
    profile: &Profile,
    profile_name: &str,
    env: EnvLookup<'_>,
) -> Result<AuthCredentials, ConfigError> {
    if let Some(key) = resolve_api_key_with(profile, profile_name, env) {
        return Ok(AuthCredentials::ApiKey(key));
    }

    let username = profile
        .username
        .clone()
        .or_else(|| env("PANSYNC_USERNAME"));
    let password = resolve_password_with(profile, profile_name, env);

    match (username, password) {
        (Some(username), Some(password)) => Ok(AuthCredentials::Credentials { username, password }),
        _ => Err(ConfigError::NoCredentials {
            profile: profile_name.into(),
        }),
    }
}

// ── Profile translation ─────────────────────────────────────────────

/// Management URL from a host string.
pub fn host_url(host: &str) -> Result<url::Url, ConfigError> {
    base_url_from_host(host).map_err(|_| ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid host or URL: {host}"),
    })
}

/// TLS strategy: insecure wins, then a custom CA, then the system store.
pub fn tls_verification(insecure: bool, ca_cert: Option<&Path>) -> TlsVerification {
    if insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(path) = ca_cert {
        TlsVerification::CustomCa(path.to_path_buf())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Layer a profile's connection settings over `config`, falling back to
/// global defaults. Host and credentials are left to the caller.
pub fn apply_profile_settings(config: &mut SessionConfig, profile: &Profile, defaults: &Defaults) {
    if let Some(ref version) = profile.api_version {
        config.api_version.clone_from(version);
    }
    config.rulebase = profile.rulebase.unwrap_or_default();
    config.tls = tls_verification(
        profile.insecure.unwrap_or(defaults.insecure),
        profile.ca_cert.as_deref(),
    );
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
}

/// Reconcile tuning from a profile, falling back to global defaults.
pub fn profile_reconcile_options(profile: &Profile, defaults: &Defaults) -> ReconcileOptions {
    ReconcileOptions {
        concurrency: profile.concurrency.unwrap_or(defaults.concurrency).max(1),
        create_timeout: Duration::from_secs(
            profile
                .create_timeout
                .unwrap_or(defaults.create_timeout)
                .max(1),
        ),
        dry_run: false,
    }
}
