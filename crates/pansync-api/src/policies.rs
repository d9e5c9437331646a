// Security rule endpoints
//
// Rules live in a device group's pre- or post-rulebase:
// `/restapi/{v}/Policies/Security{Pre,Post}Rules?location=device-group&device-group=..`

use tracing::debug;

use crate::client::PanoramaClient;
use crate::error::Error;
use crate::models::{Rulebase, SecurityRuleEntry};

impl PanoramaClient {
    /// List every security rule in a device group's rulebase.
    ///
    /// `GET /restapi/{v}/Policies/Security{Pre,Post}Rules?location=device-group&device-group={group}`
    pub async fn list_security_rules(
        &self,
        device_group: &str,
        rulebase: Rulebase,
    ) -> Result<Vec<SecurityRuleEntry>, Error> {
        let url = self.rest_url(
            rulebase.security_collection(),
            &[("location", "device-group"), ("device-group", device_group)],
        )?;
        debug!(device_group, ?rulebase, "listing security rules");
        self.get(url).await
    }

    /// Create one security rule in a device group's rulebase.
    ///
    /// `POST /restapi/{v}/Policies/Security{Pre,Post}Rules?location=device-group&device-group={group}&name={name}`
    /// with `{"entry": {...}}`. The device rejects names that already exist.
    pub async fn create_security_rule(
        &self,
        device_group: &str,
        rulebase: Rulebase,
        entry: &SecurityRuleEntry,
    ) -> Result<(), Error> {
        let url = self.rest_url(
            rulebase.security_collection(),
            &[
                ("location", "device-group"),
                ("device-group", device_group),
                ("name", entry.name.as_str()),
            ],
        )?;
        debug!(device_group, ?rulebase, name = %entry.name, "creating security rule");
        self.post_entry(url, entry).await
    }
}
