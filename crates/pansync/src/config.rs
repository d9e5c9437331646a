//! CLI configuration: thin layer over `pansync_config`.
//!
//! Merges positional arguments and global flags over the active profile
//! to produce the `SessionConfig` and `ReconcileOptions` core expects.
//! Arguments always win over the profile, the profile over `[defaults]`.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use pansync_config::{Config, ConfigError, Defaults, Profile};
use pansync_core::{AuthCredentials, ReconcileOptions, Rulebase, SessionConfig, TlsVerification};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat, RulebaseArg, SessionFlags};
use crate::error::CliError;

/// Rule file read when neither an argument nor the profile names one.
pub const DEFAULT_RULE_FILE: &str = "all.csv";

/// Loaded configuration plus the profile selected for this invocation.
pub struct ActiveProfile {
    pub config: Config,
    pub name: String,
    pub profile: Profile,
}

impl ActiveProfile {
    /// Load the config file and select `--profile` (or the default profile).
    ///
    /// An explicitly requested profile must exist; the implicit default
    /// may be absent, in which case an empty profile is used.
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let config = pansync_config::load_config()?;
        let name = pansync_config::active_profile_name(global.profile.as_deref(), &config);

        let profile = match config.profiles.get(&name) {
            Some(p) => p.clone(),
            None if global.profile.is_some() => {
                let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
                available.sort_unstable();
                return Err(CliError::Validation {
                    field: "profile".into(),
                    reason: if available.is_empty() {
                        format!("profile '{name}' not found; no profiles are configured")
                    } else {
                        format!(
                            "profile '{name}' not found; available: {}",
                            available.join(", ")
                        )
                    },
                });
            }
            None => Profile::default(),
        };

        Ok(Self {
            config,
            name,
            profile,
        })
    }
}

/// Fill in `--output` and `--color` from `[defaults]` when neither the flag
/// nor its environment variable was given.
pub fn apply_display_defaults(global: &mut GlobalOpts, defaults: &Defaults) -> Result<(), CliError> {
    if global.output.is_none() {
        let format = OutputFormat::from_str(&defaults.output, true).map_err(|reason| {
            CliError::Validation {
                field: "defaults.output".into(),
                reason,
            }
        })?;
        global.output = Some(format);
    }
    if global.color.is_none() {
        let mode = ColorMode::from_str(&defaults.color, true).map_err(|reason| {
            CliError::Validation {
                field: "defaults.color".into(),
                reason,
            }
        })?;
        global.color = Some(mode);
    }
    Ok(())
}

/// Connection arguments shared by the commands that talk to Panorama.
pub struct ConnectArgs<'a> {
    pub hostname: Option<&'a str>,
    pub userid: Option<&'a str>,
    pub password: Option<&'a str>,
    pub session: &'a SessionFlags,
    pub rulebase: Option<RulebaseArg>,
}

impl From<RulebaseArg> for Rulebase {
    fn from(arg: RulebaseArg) -> Self {
        match arg {
            RulebaseArg::Pre => Rulebase::Pre,
            RulebaseArg::Post => Rulebase::Post,
        }
    }
}

/// Build the `SessionConfig` for this invocation.
pub fn resolve_session(
    active: &ActiveProfile,
    args: &ConnectArgs<'_>,
    global: &GlobalOpts,
) -> Result<SessionConfig, CliError> {
    let profile = &active.profile;

    // 1. Host (argument > profile)
    let host = args
        .hostname
        .or(profile.host.as_deref())
        .ok_or_else(|| CliError::MissingArgument {
            name: "Panorama hostname".into(),
            profile_key: "host".into(),
        })?;
    let url = pansync_config::host_url(host)?;

    // 2. Credentials
    let auth = resolve_auth(active, args)?;

    // 3. Profile settings, then flags on top
    let mut config = SessionConfig::new(url, auth);
    pansync_config::apply_profile_settings(&mut config, profile, &active.config.defaults);

    if let Some(version) = global.api_version.as_deref() {
        version.clone_into(&mut config.api_version);
    }
    if let Some(rulebase) = args.rulebase {
        config.rulebase = rulebase.into();
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    Ok(config)
}

/// Credential precedence: `--api-key`, positional user and password, the
/// profile's key chain, the profile's password chain, then an interactive
/// prompt for the password.
fn resolve_auth(active: &ActiveProfile, args: &ConnectArgs<'_>) -> Result<AuthCredentials, CliError> {
    if let Some(key) = args.session.api_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(AuthCredentials::ApiKey(SecretString::from(key.to_owned())));
    }

    let mut profile = active.profile.clone();
    if let Some(userid) = args.userid {
        profile.username = Some(userid.to_owned());
    }

    if let (Some(username), Some(password)) = (&profile.username, args.password) {
        return Ok(AuthCredentials::Credentials {
            username: username.clone(),
            password: SecretString::from(password.to_owned()),
        });
    }

    match pansync_config::resolve_auth(&profile, &active.name) {
        Err(ConfigError::NoCredentials { profile: name }) => {
            let username = profile
                .username
                .or_else(|| std::env::var("PANSYNC_USERNAME").ok().filter(|u| !u.is_empty()))
                .ok_or(CliError::NoCredentials { profile: name })?;
            let password = prompt_password(&username, &active.name)?;
            Ok(AuthCredentials::Credentials { username, password })
        }
        other => other.map_err(CliError::from),
    }
}

fn prompt_password(username: &str, profile_name: &str) -> Result<SecretString, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NoCredentials {
            profile: profile_name.into(),
        });
    }
    let password = rpassword::prompt_password(format!("Password for {username}: "))?;
    Ok(SecretString::from(password))
}

/// Reconcile tuning: flags, then the profile, then `[defaults]`.
pub fn resolve_reconcile_options(
    active: &ActiveProfile,
    concurrency: Option<u16>,
    create_timeout: Option<u64>,
    dry_run: bool,
) -> ReconcileOptions {
    let mut options = pansync_config::profile_reconcile_options(&active.profile, &active.config.defaults);
    if let Some(n) = concurrency {
        options.concurrency = usize::from(n).max(1);
    }
    if let Some(secs) = create_timeout {
        options.create_timeout = Duration::from_secs(secs);
    }
    options.dry_run = dry_run;
    options
}

/// Device group: argument, then profile.
pub fn resolve_device_group(active: &ActiveProfile, arg: Option<&str>) -> Result<String, CliError> {
    arg.map(str::to_owned)
        .or_else(|| active.profile.device_group.clone())
        .ok_or_else(|| CliError::MissingArgument {
            name: "device group".into(),
            profile_key: "device_group".into(),
        })
}

/// Rule file: argument, then profile, then `all.csv` in the working directory.
pub fn resolve_rule_file(active: Option<&ActiveProfile>, arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| active.and_then(|a| a.profile.rule_file.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RULE_FILE))
}
