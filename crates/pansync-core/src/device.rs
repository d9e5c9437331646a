// ── Device collaborator ──
//
// The seam between the sync pass and whatever actually holds the rules.
// `Session` is the Panorama implementation; tests substitute their own.

use std::future::Future;

use crate::error::{CoreError, CreateError};
use crate::model::{ManagedDevice, RemoteRuleSummary, SecurityRule};
use crate::reconcile::RuleSink;

/// Operations a sync pass needs from a policy-management device.
pub trait DeviceApi: Sync {
    /// Every managed entry the device reports.
    fn list_devices(&self)
    -> impl Future<Output = Result<Vec<ManagedDevice>, CoreError>> + Send;

    /// Rules currently provisioned for `group`.
    fn list_existing_rules(
        &self,
        group: &str,
    ) -> impl Future<Output = Result<Vec<RemoteRuleSummary>, CoreError>> + Send;

    /// Create one rule for `group`.
    fn create_rule(
        &self,
        group: &str,
        rule: &SecurityRule,
    ) -> impl Future<Output = Result<(), CreateError>> + Send;
}

/// Whether any listed device equals or contains `group`.
pub fn device_group_exists(devices: &[ManagedDevice], group: &str) -> bool {
    devices.iter().any(|d| d.matches_group(group))
}

/// A [`DeviceApi`] bound to one device group, usable as a [`RuleSink`].
pub struct GroupSink<'a, D> {
    device: &'a D,
    group: &'a str,
}

impl<'a, D: DeviceApi> GroupSink<'a, D> {
    pub fn new(device: &'a D, group: &'a str) -> Self {
        Self { device, group }
    }
}

impl<D: DeviceApi> RuleSink for GroupSink<'_, D> {
    fn create(&self, rule: &SecurityRule) -> impl Future<Output = Result<(), CreateError>> + Send {
        self.device.create_rule(self.group, rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str) -> ManagedDevice {
        ManagedDevice {
            name: name.into(),
            description: None,
            serials: Vec::new(),
        }
    }

    #[test]
    fn any_match_is_enough() {
        let devices = [device("DG-Branch"), device("DG-Core"), device("Shared")];
        assert!(device_group_exists(&devices, "DG-Branch"));
        assert!(device_group_exists(&devices, "Core"));
    }

    #[test]
    fn last_device_does_not_decide() {
        let devices = [device("DG1"), device("Other")];
        assert!(device_group_exists(&devices, "DG1"));
    }

    #[test]
    fn no_match_or_no_devices() {
        assert!(!device_group_exists(&[device("DG1")], "DG2"));
        assert!(!device_group_exists(&[], "DG1"));
    }
}
