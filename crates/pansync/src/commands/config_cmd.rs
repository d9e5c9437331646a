//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(
                &pansync_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }
        ConfigCommand::Show => {
            let config = pansync_config::load_config()?;
            let out = config.redacted().to_toml()?;
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }
    }
}
