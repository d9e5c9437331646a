// REST API wire types
//
// Panorama's REST API mirrors the XML config tree: attributes become
// `@`-prefixed keys and multi-value fields are `{"member": [...]}` objects.
// Unknown keys are kept in `extra` so reads never fail on newer firmware.

use serde::{Deserialize, Serialize};

/// Envelope for every REST response.
///
/// Success: `{"@status": "success", "@code": "19", "result": {"entry": [...]}}`
/// Failure: `{"@status": "error", "code": 3, "message": "...", "details": [...]}`
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct RestResponse<T> {
    #[serde(rename = "@status", default)]
    pub status: Option<String>,
    #[serde(rename = "@code", alias = "code", default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<RestResult<T>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct RestResult<T> {
    #[serde(rename = "@total-count", default)]
    pub total_count: Option<String>,
    #[serde(default)]
    pub entry: Vec<T>,
}

/// A `{"member": [...]}` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberList {
    pub member: Vec<String>,
}

impl MemberList {
    pub fn new(member: impl IntoIterator<Item = String>) -> Self {
        Self {
            member: member.into_iter().collect(),
        }
    }
}

/// Security profile attachment: either a named profile group or individual profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<MemberList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<serde_json::Value>,
}

/// A security rule as read from or written to a Panorama rulebase.
///
/// Every field except the name is optional and omitted when absent, so a
/// create request never sends blanks over values the device would default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityRuleEntry {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@location", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "@device-group", default, skip_serializing_if = "Option::is_none")]
    pub device_group: Option<String>,
    #[serde(rename = "@uuid", default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<MemberList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<MemberList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MemberList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<MemberList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<MemberList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<MemberList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<MemberList>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "log-setting", default, skip_serializing_if = "Option::is_none")]
    pub log_setting: Option<String>,
    #[serde(rename = "rule-type", default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    #[serde(rename = "group-tag", default, skip_serializing_if = "Option::is_none")]
    pub group_tag: Option<String>,
    #[serde(rename = "profile-setting", default, skip_serializing_if = "Option::is_none")]
    pub profile_setting: Option<ProfileSetting>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `{"entry": ...}` wrapper for create requests.
#[derive(Debug, Serialize)]
pub struct EntryBody<'a, T> {
    pub entry: &'a T,
}

/// A device group as listed under `Panorama/DeviceGroups`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceGroupEntry {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub devices: Option<NamedEntries>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeviceGroupEntry {
    /// Serial numbers of the firewalls assigned to this group.
    pub fn device_serials(&self) -> Vec<String> {
        self.devices
            .as_ref()
            .map(|d| d.entry.iter().map(|e| e.name.clone()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntries {
    #[serde(default)]
    pub entry: Vec<NamedEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntry {
    #[serde(rename = "@name")]
    pub name: String,
}

/// Which device-group rulebase to read from and write to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rulebase {
    /// Pre-rules: evaluated before the firewall's local rules.
    #[default]
    Pre,
    /// Post-rules: evaluated after the firewall's local rules.
    Post,
}

impl Rulebase {
    /// REST collection name for security rules in this rulebase.
    pub fn security_collection(self) -> &'static str {
        match self {
            Self::Pre => "Policies/SecurityPreRules",
            Self::Post => "Policies/SecurityPostRules",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_of_non_default_entries_deserializes() {
        let resp: RestResponse<DeviceGroupEntry> = serde_json::from_value(serde_json::json!({
            "@status": "success",
            "@code": "19",
            "result": {
                "@total-count": "1",
                "entry": [{
                    "@name": "DG1",
                    "devices": { "entry": [{ "@name": "0071" }] }
                }]
            }
        }))
        .expect("envelope");
        let entries = resp.result.expect("result").entry;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].device_serials(), vec!["0071"]);
    }

    #[test]
    fn missing_entry_list_is_empty() {
        let resp: RestResponse<DeviceGroupEntry> = serde_json::from_value(serde_json::json!({
            "@status": "success",
            "result": { "@total-count": "0" }
        }))
        .expect("envelope");
        assert!(resp.result.expect("result").entry.is_empty());
    }
}
