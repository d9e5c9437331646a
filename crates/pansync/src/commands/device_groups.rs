//! `pansync device-groups`: list device groups known to Panorama.

use tabled::Tabled;

use pansync_core::{DeviceApi, ManagedDevice};

use crate::cli::{DeviceGroupsArgs, GlobalOpts};
use crate::config::{self, ActiveProfile, ConnectArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceGroupRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Devices")]
    devices: usize,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&ManagedDevice> for DeviceGroupRow {
    fn from(d: &ManagedDevice) -> Self {
        Self {
            name: d.name.clone(),
            devices: d.serials.len(),
            description: d.description.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(args: DeviceGroupsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let active = ActiveProfile::load(global)?;
    let session_config = config::resolve_session(
        &active,
        &ConnectArgs {
            hostname: args.hostname.as_deref(),
            userid: args.userid.as_deref(),
            password: args.password.as_deref(),
            session: &args.session,
            rulebase: None,
        },
        global,
    )?;

    let session = super::connect(&session_config).await?;
    let groups = session.list_devices().await?;

    let out = output::render_list(
        global.output_format(),
        &groups,
        |d| DeviceGroupRow::from(d),
        |d| d.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
