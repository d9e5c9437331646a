// ── Raw rule-file rows ──

use serde::Serialize;
use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

/// Number of positional columns a rule row must carry.
pub const FIELD_COUNT: usize = Column::COUNT;

/// Positional columns of a rule file, in file order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumCount, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    GroupName,
    RuleName,
    RuleType,
    Description,
    Tags,
    GroupRulesByTag,
    AuditCommit,
    SourceZone,
    SourceAddress,
    DestinationZone,
    DestinationAddress,
    Application,
    Services,
    Action,
    ProfileType,
    GroupProfile,
    LogSettings,
}

impl Column {
    /// Zero-based position of this column in a row.
    #[allow(clippy::as_conversions)]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One data row of a rule file, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRecord {
    /// 1-based line number in the source file (the header is line 1).
    pub row: u64,
    pub fields: Vec<String>,
}

impl RuleRecord {
    pub fn new(row: u64, fields: Vec<String>) -> Self {
        Self { row, fields }
    }

    /// Raw value of `column`, or `None` when the row is too short.
    pub fn get(&self, column: Column) -> Option<&str> {
        self.fields.get(column.index()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn columns_follow_file_order() {
        assert_eq!(FIELD_COUNT, 17);
        assert_eq!(Column::GroupName.index(), 0);
        assert_eq!(Column::RuleName.index(), 1);
        assert_eq!(Column::LogSettings.index(), 16);
        assert_eq!(Column::iter().last(), Some(Column::LogSettings));
    }

    #[test]
    fn column_names_match_header() {
        assert_eq!(Column::GroupRulesByTag.to_string(), "group_rules_by_tag");
        assert_eq!(Column::LogSettings.to_string(), "log_settings");
    }
}
