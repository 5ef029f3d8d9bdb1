// Device endpoints
//
// Listing and administration of sensor devices, and the heartbeat a
// device sends to keep its `last_seen` fresh.

use secrecy::SecretString;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{Device, DeviceCreated, DeviceList, MessageResponse, NewDevice};

impl ApiClient {
    /// All registered devices: `GET /devices`.
    pub async fn list_devices(&self, token: &SecretString) -> Result<DeviceList, Error> {
        self.get("devices", Some(token)).await
    }

    /// Register a new sensor device: `POST /devices/register`.
    pub async fn register_device(
        &self,
        token: &SecretString,
        device: &NewDevice,
    ) -> Result<Device, Error> {
        let resp: DeviceCreated = self.post("devices/register", device, Some(token)).await?;
        Ok(resp.device)
    }

    /// Remove a device: `DELETE /devices/{id}`.
    pub async fn remove_device(
        &self,
        token: &SecretString,
        device_id: &str,
    ) -> Result<Option<String>, Error> {
        let resp: MessageResponse = self
            .delete(&format!("devices/{device_id}"), Some(token))
            .await?;
        Ok(resp.message)
    }

    /// Refresh a device's `last_seen`: `POST /devices/{id}/heartbeat`.
    ///
    /// Unauthenticated, like the sensor script that calls it.
    pub async fn heartbeat(&self, device_id: &str) -> Result<Option<String>, Error> {
        let resp: MessageResponse = self
            .post_empty(&format!("devices/{device_id}/heartbeat"), None)
            .await?;
        Ok(resp.message)
    }
}
