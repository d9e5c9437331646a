//! Clap derive structures for the `pansync` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pansync -- create missing Panorama security rules from a rule file
#[derive(Debug, Parser)]
#[command(
    name = "pansync",
    version,
    about = "Create missing Panorama security rules from a CSV rule file",
    long_about = "Reads security rule definitions from a CSV file and creates every rule\n\
        that does not yet exist in a Panorama device group's rulebase.\n\n\
        Existing rules are never modified or deleted, and nothing is committed:\n\
        review and commit the candidate configuration on Panorama yourself.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "PANSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format for reports and listings [default: table]
    #[arg(long, short = 'o', env = "PANSYNC_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, env = "PANSYNC_COLOR", global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress and report output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PANSYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "PANSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// REST API version (e.g. v10.1)
    #[arg(long, env = "PANSYNC_API_VERSION", global = true)]
    pub api_version: Option<String>,

    /// Always exit with status 0, even on failure
    #[arg(long, global = true)]
    pub exit_zero: bool,
}

impl GlobalOpts {
    /// Selected output format; `[defaults] output` fills it in before dispatch.
    pub fn output_format(&self) -> &OutputFormat {
        self.output.as_ref().unwrap_or(&OutputFormat::Table)
    }

    pub fn color_mode(&self) -> &ColorMode {
        self.color.as_ref().unwrap_or(&ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

impl OutputFormat {
    /// Machine-readable formats must own stdout exclusively.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Json | Self::JsonCompact | Self::Yaml)
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RulebaseArg {
    /// Pre-rules, evaluated before local firewall rules
    Pre,
    /// Post-rules, evaluated after local firewall rules
    Post,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create rules from a rule file that are missing in a device group
    Sync(SyncArgs),

    /// Validate a rule file offline, without contacting Panorama
    Check(CheckArgs),

    /// List security rules in a device group's rulebase
    Rules(RulesArgs),

    /// List device groups managed by Panorama
    #[command(alias = "dg")]
    DeviceGroups(DeviceGroupsArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared session flags ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SessionFlags {
    /// Pre-generated API key (skips key generation)
    #[arg(long, env = "PANSYNC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SYNC
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Panorama hostname or URL
    pub hostname: Option<String>,

    /// Device group to provision rules into
    pub device_group: Option<String>,

    /// User ID for key generation
    pub userid: Option<String>,

    /// Password (prefer the keyring, PANSYNC_PASSWORD, or the prompt)
    pub password: Option<String>,

    /// CSV file with rule definitions [default: all.csv]
    pub rule_file: Option<PathBuf>,

    /// CSV file with rule definitions, for when USERID and PASSWORD are omitted
    #[arg(
        long = "rule-file",
        short = 'f',
        value_name = "FILE",
        conflicts_with = "rule_file"
    )]
    pub rule_file_flag: Option<PathBuf>,

    #[command(flatten)]
    pub session: SessionFlags,

    /// Rulebase to read and create rules in
    #[arg(long, value_enum)]
    pub rulebase: Option<RulebaseArg>,

    /// Maximum rule creations in flight
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=64))]
    pub concurrency: Option<u16>,

    /// Seconds to wait for a single rule creation
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub create_timeout: Option<u64>,

    /// Report what would be created without creating anything
    #[arg(long)]
    pub dry_run: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CHECK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// CSV file with rule definitions [default: all.csv]
    pub rule_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RULES / DEVICE GROUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RulesArgs {
    /// Panorama hostname or URL
    pub hostname: Option<String>,

    /// Device group whose rulebase to list
    pub device_group: Option<String>,

    /// User ID for key generation
    pub userid: Option<String>,

    /// Password
    pub password: Option<String>,

    #[command(flatten)]
    pub session: SessionFlags,

    /// Rulebase to list
    #[arg(long, value_enum)]
    pub rulebase: Option<RulebaseArg>,
}

#[derive(Debug, Args)]
pub struct DeviceGroupsArgs {
    /// Panorama hostname or URL
    pub hostname: Option<String>,

    /// User ID for key generation
    pub userid: Option<String>,

    /// Password
    pub password: Option<String>,

    #[command(flatten)]
    pub session: SessionFlags,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the loaded configuration with secrets masked
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
