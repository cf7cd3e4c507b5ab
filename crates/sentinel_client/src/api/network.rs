use async_trait::async_trait;
use reqwest::Method;

use super::client::ApiClient;
use super::models::{AuthorizationRequest, Device, DeviceNameRequest, NetworkStatus, ScanStatus};
use crate::client_trait::StatusSource;
use crate::error::Result;

impl ApiClient {
    pub async fn network_status(&self) -> Result<NetworkStatus> {
        self.get_json(&["network", "status"]).await
    }

    pub async fn scan_status(&self) -> Result<ScanStatus> {
        self.get_json(&["network", "scan-status"]).await
    }

    pub async fn devices(&self) -> Result<Vec<Device>> {
        self.get_json(&["network", "devices"]).await
    }

    pub async fn start_scan(&self) -> Result<()> {
        self.send_unit::<()>(Method::POST, &["network", "start-scan"], None)
            .await
    }

    pub async fn stop_scan(&self) -> Result<()> {
        self.send_unit::<()>(Method::POST, &["network", "stop-scan"], None)
            .await
    }

    /// Authorizes (`true`) or revokes (`false`) the device with the given MAC.
    pub async fn set_device_authorization(&self, mac: &str, authorized: bool) -> Result<()> {
        self.send_unit(
            Method::POST,
            &["network", "devices", mac, "authorize"],
            Some(&AuthorizationRequest { authorized }),
        )
        .await
    }

    pub async fn rename_device(&self, mac: &str, name: &str) -> Result<()> {
        self.send_unit(
            Method::PATCH,
            &["network", "devices", mac, "name"],
            Some(&DeviceNameRequest { name }),
        )
        .await
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn network_status(&self) -> Result<NetworkStatus> {
        ApiClient::network_status(self).await
    }

    async fn scan_status(&self) -> Result<ScanStatus> {
        ApiClient::scan_status(self).await
    }
}
