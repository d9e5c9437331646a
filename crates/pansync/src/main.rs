mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::{CliError, exit_code};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    let exit_zero = cli.global.exit_zero;
    if let Err(err) = run(cli).await {
        let code = if exit_zero {
            exit_code::SUCCESS
        } else {
            err.exit_code()
        };
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr so stdout stays clean for reports.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    // A broken config file is reported by the commands that need it.
    let config = pansync_config::load_config_or_default();
    config::apply_display_defaults(&mut cli.global, &config.defaults)?;

    match cli.command {
        Command::Sync(args) => commands::sync::handle(args, &cli.global).await,
        Command::Check(args) => commands::check::handle(args, &cli.global).await,
        Command::Rules(args) => commands::rules::handle(args, &cli.global).await,
        Command::DeviceGroups(args) => commands::device_groups::handle(args, &cli.global).await,
        Command::Config(args) => commands::config_cmd::handle(&args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "pansync", &mut std::io::stdout());
            Ok(())
        }
    }
}
