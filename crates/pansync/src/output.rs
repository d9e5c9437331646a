//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Live sync progress is written by [`Progress`], separately from the
//! final rendered output.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use pansync_core::{AuthCredentials, ReconciliationReport, RowOutcome, SyncEvent};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Serialize `data` for the structured formats; text formats render as JSON.
pub fn render_structured<T: serde::Serialize + ?Sized>(
    format: &OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    match format {
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Json | OutputFormat::Table | OutputFormat::Plain => render_json(data, false),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

// ── Reconciliation report ────────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Row")]
    row: u64,
    #[tabled(rename = "Rule")]
    name: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

/// Flatten the report back into one row per input line, in file order.
fn outcome_rows(report: &ReconciliationReport) -> Vec<OutcomeRow> {
    let created_label = if report.dry_run { "would create" } else { "created" };

    let mut rows: Vec<OutcomeRow> = report
        .created
        .iter()
        .map(|c| OutcomeRow {
            row: c.row,
            name: c.name.clone(),
            group: c.group.clone().unwrap_or_default(),
            result: created_label.into(),
            detail: String::new(),
        })
        .chain(report.skipped.iter().map(|s| OutcomeRow {
            row: s.row,
            name: s.name.clone().unwrap_or_default(),
            group: s.group.clone().unwrap_or_default(),
            result: "skipped".into(),
            detail: s.reason.to_string(),
        }))
        .chain(report.failed.iter().map(|f| OutcomeRow {
            row: f.row,
            name: f.name.clone(),
            group: f.group.clone().unwrap_or_default(),
            result: "failed".into(),
            detail: f.error.to_string(),
        }))
        .collect();
    rows.sort_by_key(|r| r.row);
    rows
}

/// One-line tally, e.g. `3 created, 2 skipped, 0 failed`.
pub fn summary_line(report: &ReconciliationReport) -> String {
    let verb = if report.dry_run { "to create" } else { "created" };
    let mut line = format!(
        "{} {verb}, {} skipped, {} failed",
        report.created.len(),
        report.skipped.len(),
        report.failed.len()
    );
    if let Some(ref reason) = report.interrupted {
        line.push_str(&format!(" (stopped early: {reason})"));
    }
    line
}

/// Render a reconciliation report in the chosen format.
///
/// `plain` lists the created (or to-be-created) rule names, one per line.
pub fn render_report(format: &OutputFormat, report: &ReconciliationReport) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows = outcome_rows(report);
            if rows.is_empty() {
                Ok(summary_line(report))
            } else {
                Ok(format!("{}\n{}", render_table(&rows), summary_line(report)))
            }
        }
        OutputFormat::Plain => Ok(report.created_names().join("\n")),
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            render_structured(format, report)
        }
    }
}

// ── Live progress ────────────────────────────────────────────────────

/// Human-readable progress lines for a sync pass.
///
/// Goes to stdout, unless stdout carries structured output, in which
/// case it moves to stderr. Quiet mode silences it.
pub struct Progress {
    enabled: bool,
    color: bool,
    to_stderr: bool,
}

impl Progress {
    pub fn new(format: &OutputFormat, color: bool, quiet: bool) -> Self {
        Self {
            enabled: !quiet,
            color,
            to_stderr: format.is_structured(),
        }
    }

    pub fn line(&self, text: &str) {
        if !self.enabled {
            return;
        }
        if self.to_stderr {
            let _ = writeln!(io::stderr().lock(), "{text}");
        } else {
            let _ = writeln!(io::stdout().lock(), "{text}");
        }
    }

    /// Announce the run once arguments are resolved.
    pub fn start(&self, rule_file: &std::path::Path, group: &str, dry_run: bool) {
        let verb = if dry_run { "Checking" } else { "Syncing" };
        self.line(&format!(
            "{verb} {} into device group {}",
            rule_file.display(),
            self.emphasis(group)
        ));
    }

    /// Report a usable session.
    pub fn connected(&self, auth: &AuthCredentials) {
        self.line(&connected_text(auth));
    }

    /// Render one sync phase or row outcome.
    pub fn event(&self, event: &SyncEvent<'_>) {
        let text = match event {
            SyncEvent::DevicesListed { devices } => {
                format!("Found {} device group(s)", devices.len())
            }
            SyncEvent::DeviceGroupConfirmed { group } => {
                format!("Device group {} exists", self.emphasis(group))
            }
            SyncEvent::ExistingRulesFetched { count } => {
                format!("{count} rule(s) already present")
            }
            SyncEvent::RuleFileOpened { path } => {
                format!("Reading rules from {}", path.display())
            }
            SyncEvent::Row(outcome) => self.outcome(outcome),
        };
        self.line(&text);
    }

    fn outcome(&self, outcome: &RowOutcome) -> String {
        match outcome {
            RowOutcome::Created(c) => {
                format!("  {} {} (row {})", self.good("+"), c.name, c.row)
            }
            RowOutcome::Skipped(s) => format!(
                "  {} {} (row {}): {}",
                self.muted("="),
                s.name.as_deref().unwrap_or("<unnamed>"),
                s.row,
                s.reason
            ),
            RowOutcome::Failed(f) => format!(
                "  {} {} (row {}): {}",
                self.bad("!"),
                f.name,
                f.row,
                f.error
            ),
        }
    }

    fn good(&self, s: &str) -> String {
        if self.color { s.green().to_string() } else { s.to_owned() }
    }

    fn bad(&self, s: &str) -> String {
        if self.color { s.red().bold().to_string() } else { s.to_owned() }
    }

    fn muted(&self, s: &str) -> String {
        if self.color { s.dimmed().to_string() } else { s.to_owned() }
    }

    fn emphasis(&self, s: &str) -> String {
        if self.color { s.cyan().bold().to_string() } else { s.to_owned() }
    }
}

/// An API key is only checked by the first request, so it is not "authenticated" yet.
fn connected_text(auth: &AuthCredentials) -> String {
    match auth {
        AuthCredentials::Credentials { username, .. } => format!("Authenticated as {username}"),
        AuthCredentials::ApiKey(_) => "Session ready (API key)".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pansync_core::{CreateError, CreatedRule, FailedRule, SkipReason, SkippedRow};

    use super::*;

    fn report() -> ReconciliationReport {
        let mut report = ReconciliationReport::start(false);
        report.record(RowOutcome::Skipped(SkippedRow {
            row: 3,
            name: Some("old".into()),
            group: None,
            reason: SkipReason::AlreadyExists,
        }));
        report.record(RowOutcome::Created(CreatedRule {
            row: 2,
            name: "web".into(),
            group: Some("G1".into()),
        }));
        report.record(RowOutcome::Failed(FailedRule {
            row: 4,
            name: "dns".into(),
            group: None,
            error: CreateError::Rejected {
                message: "bad zone".into(),
                code: Some("3".into()),
            },
        }));
        report.finish();
        report
    }

    #[test]
    fn table_rows_follow_file_order() {
        let rows = outcome_rows(&report());
        let order: Vec<u64> = rows.iter().map(|r| r.row).collect();
        assert_eq!(order, vec![2, 3, 4]);
        assert_eq!(rows[0].result, "created");
        assert_eq!(rows[2].detail, "rejected by device: bad zone");
    }

    #[test]
    fn summary_counts_each_outcome() {
        assert_eq!(summary_line(&report()), "1 created, 1 skipped, 1 failed");

        let mut dry = ReconciliationReport::start(true);
        dry.interrupted = Some("disk gone".into());
        assert_eq!(
            summary_line(&dry),
            "0 to create, 0 skipped, 0 failed (stopped early: disk gone)"
        );
    }

    #[test]
    fn plain_report_lists_created_names() {
        let out = render_report(&OutputFormat::Plain, &report()).expect("render");
        assert_eq!(out, "web");
    }

    #[test]
    fn json_report_has_all_sections() {
        let out = render_report(&OutputFormat::JsonCompact, &report()).expect("render");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value["created"][0]["name"], "web");
        assert_eq!(value["skipped"][0]["reason"]["kind"], "already_exists");
        assert_eq!(value["failed"][0]["error"], "rejected by device: bad zone");
    }

    #[test]
    fn connected_line_names_the_user_not_the_secret() {
        let creds = AuthCredentials::Credentials {
            username: "admin".into(),
            password: secrecy::SecretString::from("hunter2".to_string()),
        };
        assert_eq!(connected_text(&creds), "Authenticated as admin");

        let key = AuthCredentials::ApiKey(secrecy::SecretString::from("K".to_string()));
        assert_eq!(connected_text(&key), "Session ready (API key)");
    }

    #[test]
    fn uncolored_progress_is_plain_text() {
        let progress = Progress::new(&OutputFormat::Table, false, false);
        let line = progress.outcome(&RowOutcome::Created(CreatedRule {
            row: 7,
            name: "web".into(),
            group: None,
        }));
        assert_eq!(line, "  + web (row 7)");
    }
}
