//! Rule reconciliation between a rule file and a Panorama device group.
//!
//! This crate owns the domain model and the create-only sync pass:
//!
//! - **Rule model** ([`model`]): [`RuleRecord`] rows, validated
//!   [`SecurityRule`]s, and [`SkipReason`]s for rows that produce no create.
//!
//! - **[`parser`]**: pure row → rule mapping. Blank columns become absent
//!   values, multi-value columns split on single spaces.
//!
//! - **[`RemoteRuleIndex`]**: the names already on the device, fetched once.
//!
//! - **[`Reconciler`]**: walks the rows in order, skips what exists, creates
//!   what is missing through a [`RuleSink`], and returns a
//!   [`ReconciliationReport`]. Creates may overlap up to a bounded
//!   concurrency; decisions never do.
//!
//! - **[`Session`]**: authenticated Panorama handle implementing
//!   [`DeviceApi`], and [`run_sync`] which ties everything together.

pub mod config;
pub mod convert;
pub mod device;
pub mod error;
pub mod index;
pub mod model;
pub mod parser;
pub mod reconcile;
pub mod session;
pub mod source;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{AuthCredentials, ReconcileOptions, SessionConfig, TlsVerification};
pub use device::{DeviceApi, GroupSink, device_group_exists};
pub use error::{CoreError, CreateError};
pub use index::RemoteRuleIndex;
pub use model::{
    Column, FIELD_COUNT, ManagedDevice, MemberSet, RemoteRuleSummary, RuleRecord, SecurityRule,
    SkipReason,
};
pub use reconcile::{
    CreatedRule, FailedRule, ReconciliationReport, Reconciler, RowOutcome, RuleSink, SkippedRow,
};
pub use session::Session;
pub use source::RuleSource;
pub use sync::{SyncEvent, SyncRequest, run_sync};

pub use pansync_api::Rulebase;
