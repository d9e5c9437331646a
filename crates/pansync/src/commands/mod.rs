//! Command handlers, one module per subcommand.

pub mod check;
pub mod config_cmd;
pub mod device_groups;
pub mod rules;
pub mod sync;

use pansync_core::{Session, SessionConfig};

use crate::error::CliError;

/// Authenticate against Panorama, logging where we connect to.
async fn connect(config: &SessionConfig) -> Result<Session, CliError> {
    tracing::debug!(url = %config.url, rulebase = ?config.rulebase, "connecting");
    Ok(Session::connect(config).await?)
}
