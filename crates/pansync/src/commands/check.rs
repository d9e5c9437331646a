//! `pansync check`: validate a rule file offline.
//!
//! Runs the same parse-and-dedupe pass as `sync` in dry-run mode against
//! an empty remote index, so every problem `sync` would skip shows up here
//! without contacting Panorama.

use std::path::Path;

use serde::Serialize;
use tabled::Tabled;

use pansync_core::{
    CreateError, ReconcileOptions, Reconciler, RemoteRuleIndex, RuleSink, RuleSource,
    SecurityRule, SkipReason, SkippedRow,
};

use crate::cli::{CheckArgs, GlobalOpts, OutputFormat};
use crate::config::{self, ActiveProfile};
use crate::error::CliError;
use crate::output;

/// Never called: the reconciler does not create anything in a dry run.
struct NoDevice;

impl RuleSink for NoDevice {
    async fn create(&self, _rule: &SecurityRule) -> Result<(), CreateError> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CheckReport {
    path: String,
    rules: usize,
    problems: Vec<Problem>,
}

#[derive(Debug, Serialize)]
struct Problem {
    row: u64,
    name: Option<String>,
    kind: &'static str,
    detail: String,
}

impl From<SkippedRow> for Problem {
    fn from(skipped: SkippedRow) -> Self {
        // With an empty index, "already exists" can only mean an earlier row.
        let (kind, detail) = match skipped.reason {
            SkipReason::AlreadyExists => (
                "duplicate",
                "rule name repeats an earlier row".to_owned(),
            ),
            ref other => (other.kind(), other.to_string()),
        };
        Self {
            row: skipped.row,
            name: skipped.name,
            kind,
            detail,
        }
    }
}

#[derive(Tabled)]
struct ProblemRow {
    #[tabled(rename = "Row")]
    row: u64,
    #[tabled(rename = "Rule")]
    name: String,
    #[tabled(rename = "Problem")]
    kind: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

pub async fn handle(args: CheckArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // An unreadable config file should not stop an offline check.
    let active = ActiveProfile::load(global).ok();
    let rule_file = config::resolve_rule_file(active.as_ref(), args.rule_file);

    let report = check_file(&rule_file).await?;
    let problems = report.problems.len();

    let out = render(global.output_format(), &report)?;
    output::print_output(&out, global.quiet);

    if problems > 0 {
        return Err(CliError::CheckFailed {
            path: report.path,
            problems,
        });
    }
    Ok(())
}

async fn check_file(path: &Path) -> Result<CheckReport, CliError> {
    let source = RuleSource::open(path)?;
    let index = RemoteRuleIndex::default();
    let options = ReconcileOptions {
        dry_run: true,
        ..ReconcileOptions::default()
    };

    let report = Reconciler::new(&index, options)
        .run(source, &NoDevice, |_| {})
        .await;

    if let Some(reason) = report.interrupted {
        return Err(CliError::RuleFile {
            path: path.display().to_string(),
            reason,
        });
    }

    let mut problems: Vec<Problem> = report.skipped.into_iter().map(Problem::from).collect();
    problems.sort_by_key(|p| p.row);

    Ok(CheckReport {
        path: path.display().to_string(),
        rules: report.created.len(),
        problems,
    })
}

fn render(format: &OutputFormat, report: &CheckReport) -> Result<String, CliError> {
    let summary = format!(
        "{}: {} valid rule(s), {} problem(s)",
        report.path,
        report.rules,
        report.problems.len()
    );

    match format {
        OutputFormat::Table if report.problems.is_empty() => Ok(summary),
        OutputFormat::Table => {
            let table = output::render_list(
                format,
                &report.problems,
                |p| ProblemRow {
                    row: p.row,
                    name: p.name.clone().unwrap_or_default(),
                    kind: p.kind.to_owned(),
                    detail: p.detail.clone(),
                },
                |_| String::new(),
            )?;
            Ok(format!("{table}\n{summary}"))
        }
        OutputFormat::Plain => Ok(report
            .problems
            .iter()
            .map(|p| format!("{}:{}", p.row, p.kind))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            output::render_structured(format, report)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    const HEADER: &str = "group_name,rule_name,rule_type,description,tags,group_rules_by_tag,audit_commit,source_zone,source_address,destination_zone,destination_address,application,services,action,profile_type,group_profile,log_settings\n";

    fn row(name: &str) -> String {
        format!("G1,{name},universal,d,,,false,trust,any,untrust,any,web-browsing,application-default,allow,group,default,log\n")
    }

    #[tokio::test]
    async fn clean_file_has_no_problems() {
        let file = csv(&format!("{HEADER}{}{}", row("a"), row("b")));
        let report = check_file(file.path()).await.expect("check");
        assert_eq!(report.rules, 2);
        assert!(report.problems.is_empty());
    }

    #[tokio::test]
    async fn duplicates_and_short_rows_are_problems() {
        let file = csv(&format!("{HEADER}{}G1,short\n{}{}", row("a"), row(" "), row("a")));
        let report = check_file(file.path()).await.expect("check");

        assert_eq!(report.rules, 1);
        let kinds: Vec<(u64, &str)> = report.problems.iter().map(|p| (p.row, p.kind)).collect();
        assert_eq!(
            kinds,
            vec![(3, "malformed_row"), (4, "missing_name"), (5, "duplicate")]
        );
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = check_file(Path::new("/nonexistent/rules.csv"))
            .await
            .expect_err("missing file");
        assert!(matches!(err, CliError::RuleFile { .. }));
    }

    #[test]
    fn plain_output_is_row_and_kind() {
        let report = CheckReport {
            path: "all.csv".into(),
            rules: 0,
            problems: vec![Problem {
                row: 2,
                name: None,
                kind: "missing_name",
                detail: String::new(),
            }],
        };
        assert_eq!(
            render(&OutputFormat::Plain, &report).expect("render"),
            "2:missing_name"
        );
    }
}
