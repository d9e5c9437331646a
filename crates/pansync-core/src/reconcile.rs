// ── Reconciler ──
//
// One linear pass over the rule rows: parse, check the remote index and
// the names claimed so far, then create what is missing. Check-and-claim
// runs when a row is pulled, in input order, so bounded concurrency only
// overlaps the create calls themselves. Outcomes come back in input order.

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use futures_util::StreamExt;
use futures_util::stream;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::config::ReconcileOptions;
use crate::error::{CoreError, CreateError};
use crate::index::RemoteRuleIndex;
use crate::model::{Column, RuleRecord, SecurityRule, SkipReason};
use crate::parser;

/// Destination for rules that need creating.
pub trait RuleSink: Sync {
    fn create(&self, rule: &SecurityRule) -> impl Future<Output = Result<(), CreateError>> + Send;
}

// ── Report ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRule {
    pub row: u64,
    pub name: String,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: u64,
    pub name: Option<String>,
    pub group: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRule {
    pub row: u64,
    pub name: String,
    pub group: Option<String>,
    #[serde(serialize_with = "display")]
    pub error: CreateError,
}

fn display<S: Serializer>(error: &CreateError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// What happened to one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Created(CreatedRule),
    Skipped(SkippedRow),
    Failed(FailedRule),
}

impl RowOutcome {
    pub fn row(&self) -> u64 {
        match self {
            Self::Created(c) => c.row,
            Self::Skipped(s) => s.row,
            Self::Failed(f) => f.row,
        }
    }
}

/// Result of a reconciliation pass. Lists are in input order.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub created: Vec<CreatedRule>,
    pub skipped: Vec<SkippedRow>,
    pub failed: Vec<FailedRule>,
    /// Set when the rule file stopped being readable part way through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<String>,
}

impl ReconciliationReport {
    pub fn start(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            created: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            interrupted: None,
        }
    }

    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Created(c) => self.created.push(c),
            RowOutcome::Skipped(s) => self.skipped.push(s),
            RowOutcome::Failed(f) => self.failed.push(f),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Names created (or, in a dry run, that would have been).
    pub fn created_names(&self) -> Vec<&str> {
        self.created.iter().map(|c| c.name.as_str()).collect()
    }

    /// No create failed and the whole file was read.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.interrupted.is_none()
    }
}

// ── Reconciler ──────────────────────────────────────────────────────

enum Decision {
    Done(RowOutcome),
    Create { row: u64, rule: SecurityRule },
}

pub struct Reconciler<'a> {
    index: &'a RemoteRuleIndex,
    claimed: DashSet<String>,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(index: &'a RemoteRuleIndex, options: ReconcileOptions) -> Self {
        Self {
            index,
            claimed: DashSet::new(),
            options,
        }
    }

    /// Reconcile `rows` against the index, creating missing rules through `sink`.
    ///
    /// `observe` sees every outcome in input order as it is settled. A read
    /// error ends the pass early and is noted in `interrupted`; row-level
    /// problems never do.
    pub async fn run<I, S, F>(&self, rows: I, sink: &S, mut observe: F) -> ReconciliationReport
    where
        I: IntoIterator<Item = Result<RuleRecord, CoreError>>,
        S: RuleSink,
        F: FnMut(&RowOutcome),
    {
        let mut report = ReconciliationReport::start(self.options.dry_run);
        let mut read_error = None;

        {
            let records = rows.into_iter().map_while(|item| match item {
                Ok(record) => Some(record),
                Err(e) => {
                    read_error = Some(e);
                    None
                }
            });

            let mut outcomes = pin!(
                stream::iter(records)
                    .map(|record| self.execute(self.decide(record), sink))
                    .buffered(self.options.concurrency.max(1))
            );

            while let Some(outcome) = outcomes.next().await {
                observe(&outcome);
                report.record(outcome);
            }
        }

        if let Some(e) = read_error {
            warn!(error = %e, "rule file read interrupted");
            report.interrupted = Some(e.to_string());
        }

        report.finish();
        info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            dry_run = report.dry_run,
            "reconciliation finished"
        );
        report
    }

    /// Parse, check and claim. Runs in input order as rows are pulled.
    fn decide(&self, record: RuleRecord) -> Decision {
        let row = record.row;
        let rule = match parser::parse(&record) {
            Ok(rule) => rule,
            Err(reason) => {
                debug!(row, %reason, "skipping row");
                return Decision::Done(RowOutcome::Skipped(SkippedRow {
                    row,
                    name: non_blank(record.get(Column::RuleName)),
                    group: non_blank(record.get(Column::GroupName)),
                    reason,
                }));
            }
        };

        // `insert` is the claim: false means an earlier row already took the name.
        if self.index.contains(&rule.name) || !self.claimed.insert(rule.name.clone()) {
            debug!(row, name = %rule.name, "rule already exists");
            return Decision::Done(RowOutcome::Skipped(SkippedRow {
                row,
                name: Some(rule.name),
                group: rule.group_name,
                reason: SkipReason::AlreadyExists,
            }));
        }

        Decision::Create { row, rule }
    }

    async fn execute<S: RuleSink>(&self, decision: Decision, sink: &S) -> RowOutcome {
        let (row, rule) = match decision {
            Decision::Done(outcome) => return outcome,
            Decision::Create { row, rule } => (row, rule),
        };

        if self.options.dry_run {
            debug!(row, name = %rule.name, "dry run: would create");
            return created(row, rule);
        }

        let result = tokio::time::timeout(self.options.create_timeout, sink.create(&rule))
            .await
            .unwrap_or_else(|_| {
                Err(CreateError::Timeout {
                    timeout_secs: whole_seconds(self.options.create_timeout),
                })
            });

        match result {
            Ok(()) => {
                info!(row, name = %rule.name, group = ?rule.group_name, "rule created");
                created(row, rule)
            }
            Err(error) => {
                self.claimed.remove(&rule.name);
                warn!(row, name = %rule.name, %error, "rule create failed");
                RowOutcome::Failed(FailedRule {
                    row,
                    name: rule.name,
                    group: rule.group_name,
                    error,
                })
            }
        }
    }
}

fn created(row: u64, rule: SecurityRule) -> RowOutcome {
    RowOutcome::Created(CreatedRule {
        row,
        name: rule.name,
        group: rule.group_name,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_owned)
}

/// Seconds for display, rounded up so a sub-second limit never reads as 0s.
fn whole_seconds(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
