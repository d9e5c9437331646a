// ── Security rule ──

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Unordered set of members for a multi-value rule field.
pub type MemberSet = BTreeSet<String>;

/// A validated rule definition.
///
/// Optional fields are `None` when the source column was blank, so that a
/// create request only carries values that were actually supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityRule {
    pub name: String,
    /// Device group named on the row. Reported, never used as a key.
    pub group_name: Option<String>,
    pub rule_type: Option<String>,
    pub description: Option<String>,
    pub tags: Option<MemberSet>,
    pub group_tag: Option<String>,
    pub audit_commit: bool,
    pub source_zones: Option<MemberSet>,
    pub source_addresses: Option<MemberSet>,
    pub destination_zones: Option<MemberSet>,
    pub destination_addresses: Option<MemberSet>,
    pub applications: Option<MemberSet>,
    pub services: Option<MemberSet>,
    pub action: Option<String>,
    pub profile_type: Option<String>,
    pub profile_group: Option<String>,
    pub log_setting: Option<String>,
}

/// Why a row produced no create call. None of these abort a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer columns than a rule row needs.
    MalformedRow { field_count: usize, fields: Vec<String> },
    /// Blank rule name.
    MissingName,
    /// Present on the device, or already created earlier in this pass.
    AlreadyExists,
}

impl SkipReason {
    /// Short machine-friendly label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRow { .. } => "malformed_row",
            Self::MissingName => "missing_name",
            Self::AlreadyExists => "already_exists",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRow {
                field_count,
                fields,
            } => write!(
                f,
                "incomplete row (expected {} columns, got {field_count}): {fields:?}",
                super::FIELD_COUNT
            ),
            Self::MissingName => f.write_str("rule name is blank"),
            Self::AlreadyExists => f.write_str("already exists"),
        }
    }
}
