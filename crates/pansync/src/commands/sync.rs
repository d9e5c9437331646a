//! `pansync sync`: create missing rules in a device group.

use pansync_core::{Session, SyncRequest, run_sync};

use crate::cli::{GlobalOpts, SyncArgs};
use crate::config::{self, ActiveProfile, ConnectArgs};
use crate::error::CliError;
use crate::output::{self, Progress};

pub async fn handle(args: SyncArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let active = ActiveProfile::load(global)?;

    let device_group = config::resolve_device_group(&active, args.device_group.as_deref())?;
    let rule_file = config::resolve_rule_file(
        Some(&active),
        args.rule_file_flag.clone().or_else(|| args.rule_file.clone()),
    );
    let options = config::resolve_reconcile_options(
        &active,
        args.concurrency,
        args.create_timeout,
        args.dry_run,
    );
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

    let progress = Progress::new(
        global.output_format(),
        output::should_color(global.color_mode()),
        global.quiet,
    );
    progress.start(&rule_file, &device_group, options.dry_run);
    progress.line(&format!("Connecting to {}", session_config.url));
    tracing::debug!(url = %session_config.url, group = %device_group, "starting sync");

    let request = SyncRequest {
        device_group: &device_group,
        rule_file: &rule_file,
        options,
    };
    let progress = &progress;
    let auth = &session_config.auth;
    let report = Session::oneshot(&session_config, |session| async move {
        progress.connected(auth);
        run_sync(&session, &request, |event| progress.event(&event)).await
    })
    .await?;

    let out = output::render_report(global.output_format(), &report)?;
    output::print_output(&out, global.quiet);

    if let Some(reason) = report.interrupted {
        return Err(CliError::RuleFile {
            path: rule_file.display().to_string(),
            reason,
        });
    }
    if !report.failed.is_empty() {
        return Err(CliError::PartialFailure {
            failed: report.failed.len(),
            attempted: report.created.len() + report.failed.len(),
        });
    }
    Ok(())
}
