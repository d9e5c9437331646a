// ── Record parser ──
//
// Pure mapping from one raw row to a `SecurityRule` or a `SkipReason`.
// Blank columns become `None`; multi-value columns split on a single space.

use crate::model::{Column, FIELD_COUNT, MemberSet, RuleRecord, SecurityRule, SkipReason};

/// Parse a rule-file row.
pub fn parse(record: &RuleRecord) -> Result<SecurityRule, SkipReason> {
    parse_fields(&record.fields)
}

/// Parse positional fields. Columns past the seventeenth are ignored.
pub fn parse_fields<S: AsRef<str>>(fields: &[S]) -> Result<SecurityRule, SkipReason> {
    if fields.len() < FIELD_COUNT {
        return Err(SkipReason::MalformedRow {
            field_count: fields.len(),
            fields: fields.iter().map(|f| f.as_ref().to_owned()).collect(),
        });
    }

    let col = |c: Column| fields.get(c.index()).map_or("", |f| f.as_ref());

    let Some(name) = text(col(Column::RuleName)) else {
        return Err(SkipReason::MissingName);
    };

    Ok(SecurityRule {
        name,
        group_name: text(col(Column::GroupName)),
        rule_type: text(col(Column::RuleType)),
        description: text(col(Column::Description)),
        tags: members(col(Column::Tags)),
        group_tag: text(col(Column::GroupRulesByTag)),
        audit_commit: flag(col(Column::AuditCommit)),
        source_zones: members(col(Column::SourceZone)),
        source_addresses: members(col(Column::SourceAddress)),
        destination_zones: members(col(Column::DestinationZone)),
        destination_addresses: members(col(Column::DestinationAddress)),
        applications: members(col(Column::Application)),
        services: members(col(Column::Services)),
        action: text(col(Column::Action)),
        profile_type: text(col(Column::ProfileType)),
        profile_group: text(col(Column::GroupProfile)),
        log_setting: text(col(Column::LogSettings)),
    })
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Verbatim value, or `None` when blank.
fn text(value: &str) -> Option<String> {
    (!is_blank(value)).then(|| value.to_owned())
}

/// Space-separated tokens, or `None` when blank. Tokens are kept as-is.
fn members(value: &str) -> Option<MemberSet> {
    (!is_blank(value)).then(|| value.split(' ').map(str::to_owned).collect())
}

fn flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
