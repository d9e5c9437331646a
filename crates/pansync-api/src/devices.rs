// Device group endpoints
//
// Device groups are Panorama-level objects, so the listing takes no
// location query.

use tracing::debug;

use crate::client::PanoramaClient;
use crate::error::Error;
use crate::models::DeviceGroupEntry;

impl PanoramaClient {
    /// List all device groups managed by this Panorama.
    ///
    /// `GET /restapi/{v}/Panorama/DeviceGroups`
    pub async fn list_device_groups(&self) -> Result<Vec<DeviceGroupEntry>, Error> {
        let url = self.rest_url("Panorama/DeviceGroups", &[])?;
        debug!("listing device groups");
        self.get(url).await
    }
}
