//! `pansync rules`: list a device group's security rules.

use tabled::Tabled;

use pansync_core::{DeviceApi, RemoteRuleSummary};

use crate::cli::{GlobalOpts, RulesArgs};
use crate::config::{self, ActiveProfile, ConnectArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Disabled")]
    disabled: String,
}

impl From<&RemoteRuleSummary> for RuleRow {
    fn from(r: &RemoteRuleSummary) -> Self {
        Self {
            name: r.name.clone(),
            from: r.source_zones.join(", "),
            to: r.destination_zones.join(", "),
            action: r.action.clone().unwrap_or_default(),
            disabled: if r.disabled { "yes".into() } else { String::new() },
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: RulesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let active = ActiveProfile::load(global)?;
    let device_group = config::resolve_device_group(&active, args.device_group.as_deref())?;
    let session_config = config::resolve_session(
        &active,
        &ConnectArgs {
            hostname: args.hostname.as_deref(),
            userid: args.userid.as_deref(),
            password: args.password.as_deref(),
            session: &args.session,
            rulebase: args.rulebase,
        },
        global,
    )?;

    let session = super::connect(&session_config).await?;
    let rules = session.list_existing_rules(&device_group).await?;

    let out = output::render_list(
        global.output_format(),
        &rules,
        |r| RuleRow::from(r),
        |r| r.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
