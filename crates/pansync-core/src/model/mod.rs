// ── Domain model ──
//
// Canonical in-memory types for one reconciliation pass. Rows come in as
// `RuleRecord`, become `SecurityRule` or a `SkipReason`, and the device
// side is described by `ManagedDevice` and `RemoteRuleSummary`.

pub mod device;
pub mod record;
pub mod rule;

pub use device::{ManagedDevice, RemoteRuleSummary};
pub use record::{Column, FIELD_COUNT, RuleRecord};
pub use rule::{MemberSet, SecurityRule, SkipReason};
