// ── API-to-domain type conversions ──
//
// Bridges `pansync_api` wire types and the core model. Outbound, every
// absent field stays absent so a create never sends blanks; inbound,
// wire entries are flattened into the summaries the index and listings use.

use pansync_api::{DeviceGroupEntry, MemberList, ProfileSetting, SecurityRuleEntry};

use crate::model::{ManagedDevice, MemberSet, RemoteRuleSummary, SecurityRule};

// ── Helpers ────────────────────────────────────────────────────────

fn member_list(set: Option<&MemberSet>) -> Option<MemberList> {
    set.map(|s| MemberList::new(s.iter().cloned()))
}

fn members(list: Option<&MemberList>) -> Vec<String> {
    list.map(|l| l.member.clone()).unwrap_or_default()
}

/// Profile groups are attached unless the row names another profile type.
fn profile_setting(rule: &SecurityRule) -> Option<ProfileSetting> {
    let group = rule.profile_group.as_ref()?;
    let is_group = rule
        .profile_type
        .as_deref()
        .is_none_or(|t| t.trim().eq_ignore_ascii_case("group"));
    is_group.then(|| ProfileSetting {
        group: Some(MemberList::new([group.clone()])),
        profiles: None,
    })
}

// ── Security rule ──────────────────────────────────────────────────

impl From<&SecurityRule> for SecurityRuleEntry {
    fn from(rule: &SecurityRule) -> Self {
        SecurityRuleEntry {
            name: rule.name.clone(),
            from: member_list(rule.source_zones.as_ref()),
            to: member_list(rule.destination_zones.as_ref()),
            source: member_list(rule.source_addresses.as_ref()),
            destination: member_list(rule.destination_addresses.as_ref()),
            application: member_list(rule.applications.as_ref()),
            service: member_list(rule.services.as_ref()),
            tag: member_list(rule.tags.as_ref()),
            action: rule.action.clone(),
            description: rule.description.clone(),
            log_setting: rule.log_setting.clone(),
            rule_type: rule.rule_type.clone(),
            group_tag: rule.group_tag.clone(),
            profile_setting: profile_setting(rule),
            ..SecurityRuleEntry::default()
        }
    }
}

impl From<SecurityRuleEntry> for RemoteRuleSummary {
    fn from(entry: SecurityRuleEntry) -> Self {
        let disabled = entry
            .extra
            .get("disabled")
            .and_then(serde_json::Value::as_str)
            .is_some_and(|v| v == "yes");
        RemoteRuleSummary {
            source_zones: members(entry.from.as_ref()),
            destination_zones: members(entry.to.as_ref()),
            name: entry.name,
            uuid: entry.uuid,
            action: entry.action,
            description: entry.description,
            disabled,
        }
    }
}

// ── Device group ───────────────────────────────────────────────────

impl From<DeviceGroupEntry> for ManagedDevice {
    fn from(entry: DeviceGroupEntry) -> Self {
        ManagedDevice {
            serials: entry.device_serials(),
            name: entry.name,
            description: entry.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn set(items: &[&str]) -> Option<MemberSet> {
        Some(items.iter().map(|s| (*s).to_owned()).collect())
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let rule = SecurityRule {
            name: "rule1".into(),
            source_zones: set(&["zoneA"]),
            tags: set(&["tag2", "tag1"]),
            action: Some("allow".into()),
            log_setting: Some("default".into()),
            ..SecurityRule::default()
        };

        let body = serde_json::to_value(SecurityRuleEntry::from(&rule)).expect("json");
        assert_eq!(
            body,
            json!({
                "@name": "rule1",
                "from": { "member": ["zoneA"] },
                "tag": { "member": ["tag1", "tag2"] },
                "action": "allow",
                "log-setting": "default"
            })
        );
    }

    #[test]
    fn profile_group_is_attached() {
        let rule = SecurityRule {
            name: "r".into(),
            profile_group: Some("strict".into()),
            ..SecurityRule::default()
        };
        let entry = SecurityRuleEntry::from(&rule);
        assert_eq!(
            entry.profile_setting.and_then(|p| p.group),
            Some(MemberList::new(["strict".to_string()]))
        );
    }

    #[test]
    fn profile_group_ignored_for_other_profile_types() {
        let rule = SecurityRule {
            name: "r".into(),
            profile_type: Some("profiles".into()),
            profile_group: Some("strict".into()),
            ..SecurityRule::default()
        };
        assert_eq!(SecurityRuleEntry::from(&rule).profile_setting, None);
    }

    #[test]
    fn audit_flag_and_group_name_stay_local() {
        let rule = SecurityRule {
            name: "r".into(),
            group_name: Some("DG1".into()),
            audit_commit: true,
            ..SecurityRule::default()
        };
        let body = serde_json::to_value(SecurityRuleEntry::from(&rule)).expect("json");
        assert_eq!(body, json!({ "@name": "r" }));
    }

    #[test]
    fn remote_entry_to_summary() {
        let entry: SecurityRuleEntry = serde_json::from_value(json!({
            "@name": "allow-web",
            "@uuid": "abc",
            "from": { "member": ["trust"] },
            "to": { "member": ["untrust", "dmz"] },
            "action": "allow",
            "disabled": "yes"
        }))
        .expect("entry");

        let summary = RemoteRuleSummary::from(entry);
        assert_eq!(summary.name, "allow-web");
        assert_eq!(summary.uuid.as_deref(), Some("abc"));
        assert_eq!(summary.source_zones, vec!["trust"]);
        assert_eq!(summary.destination_zones, vec!["untrust", "dmz"]);
        assert!(summary.disabled);
    }

    #[test]
    fn device_group_to_managed_device() {
        let entry: DeviceGroupEntry = serde_json::from_value(json!({
            "@name": "DG-Branch",
            "devices": { "entry": [{ "@name": "0079010001" }, { "@name": "0079010002" }] }
        }))
        .expect("entry");

        let device = ManagedDevice::from(entry);
        assert_eq!(device.name, "DG-Branch");
        assert_eq!(device.serials, vec!["0079010001", "0079010002"]);
        assert!(device.matches_group("Branch"));
        assert!(!device.matches_group("DG-Core"));
    }
}
