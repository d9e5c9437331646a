// ── Device-side views ──

use serde::Serialize;

/// A managed entry reported by the device (a Panorama device group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedDevice {
    pub name: String,
    pub description: Option<String>,
    /// Serial numbers of the firewalls assigned to it.
    pub serials: Vec<String>,
}

impl ManagedDevice {
    /// Whether this device name equals or contains `group`.
    pub fn matches_group(&self, group: &str) -> bool {
        self.name.contains(group)
    }
}

/// Summary of a rule already provisioned on the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoteRuleSummary {
    pub name: String,
    pub uuid: Option<String>,
    pub action: Option<String>,
    pub source_zones: Vec<String>,
    pub destination_zones: Vec<String>,
    pub description: Option<String>,
    pub disabled: bool,
}
