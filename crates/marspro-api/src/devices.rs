// Device endpoints
//
// Listing by product group, per-device detail, and the brightness / speed
// setters used by the light and fan controllers.

use serde_json::json;
use tracing::{debug, info};

use crate::client::MarsProClient;
use crate::error::Error;
use crate::models::{DeviceDetail, DeviceListPage, DeviceListRequest, FanCalculation, RawDevice};

const DEVICE_LIST_ENDPOINT: &str = "android/udm/getDeviceList/v1";
const DEVICE_DETAIL_ENDPOINT: &str = "android/udm/getDeviceDetail/v1";

impl MarsProClient {
    /// List one page of devices in a product group.
    ///
    /// `POST android/udm/getDeviceList/v1` with
    /// `{"currentPage": page, "type": null, "deviceProductGroup": group}`
    pub async fn list_devices_page(&self, group: u32, page: u32) -> Result<DeviceListPage, Error> {
        debug!(group, page, "listing devices");
        let body = DeviceListRequest {
            current_page: page,
            device_type: None,
            device_product_group: group,
        };
        // A group with no devices may come back with `data: null`.
        let page: Option<DeviceListPage> = self.post(DEVICE_LIST_ENDPOINT, &body).await?;
        Ok(page.unwrap_or_default())
    }

    /// List the devices of a product group (first page, unfiltered).
    pub async fn list_devices(&self, group: u32) -> Result<Vec<RawDevice>, Error> {
        Ok(self.list_devices_page(group, 1).await?.list)
    }

    /// Fetch the detail record of a single device.
    ///
    /// `POST android/udm/getDeviceDetail/v1` with `{"deviceId": id}`
    pub async fn get_device_detail(&self, device_id: &str) -> Result<DeviceDetail, Error> {
        debug!(device_id, "fetching device detail");
        self.post(DEVICE_DETAIL_ENDPOINT, &json!({ "deviceId": device_id }))
            .await
    }

    /// Set a light's brightness, as a 0–100 percentage.
    ///
    /// The device write endpoint for brightness has not been observed in
    /// app traffic, so this acknowledges locally after logging the
    /// commanded value. The next poll shows whether the device moved.
    // TODO: wire the brightness write once the device control endpoint is captured.
    pub async fn set_light_brightness(&self, device_id: &str, percentage: u8) -> Result<(), Error> {
        info!(device_id, percentage, "setting light brightness");
        Ok(())
    }

    /// Set a fan's speed, as a 25–100 percentage.
    ///
    /// Runs the CFM and PA side calculations the app performs before a
    /// speed change and logs their results. Like
    /// [`set_light_brightness`](Self::set_light_brightness), the actual
    /// device write is not known yet; the calculation endpoint is not the
    /// setter.
    // TODO: wire the speed write once the device control endpoint is captured.
    pub async fn set_fan_speed(&self, device_id: &str, percentage: u8) -> Result<FanCalculation, Error> {
        let calc = self.fan_airflow(device_id, percentage).await?;
        info!(
            device_id,
            percentage,
            cfm = %calc.cfm,
            pa = %calc.pa,
            "setting fan speed"
        );
        Ok(calc)
    }
}
