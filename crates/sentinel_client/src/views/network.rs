//! Network monitor: device list, scan control and device authorization.

use std::sync::Arc;

use log::warn;
use tokio::sync::RwLock;

use crate::alerts::AlertPoller;
use crate::api::models::{Device, NetworkStatus};
use crate::api::ApiClient;
use crate::notify::Notifier;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkSnapshot {
    pub devices: Vec<Device>,
    pub status: NetworkStatus,
}

pub struct NetworkMonitor {
    api: ApiClient,
    alerts: AlertPoller,
    notifier: Arc<dyn Notifier>,
    snapshot: RwLock<NetworkSnapshot>,
}

impl NetworkMonitor {
    pub fn new(api: ApiClient, alerts: AlertPoller, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            alerts,
            notifier,
            snapshot: RwLock::new(NetworkSnapshot::default()),
        }
    }

    pub async fn snapshot(&self) -> NetworkSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Reloads devices and status. A failed half keeps its previous value.
    pub async fn refresh(&self) -> NetworkSnapshot {
        self.fetch_status().await;
        self.fetch_devices().await;
        self.snapshot().await
    }

    pub async fn fetch_devices(&self) -> bool {
        match self.api.devices().await {
            Ok(devices) => {
                self.snapshot.write().await.devices = devices;
                true
            }
            Err(err) => {
                warn!("Fetching devices failed: {err}");
                self.notifier.error("Failed to fetch devices");
                false
            }
        }
    }

    pub async fn fetch_status(&self) -> bool {
        match self.api.network_status().await {
            Ok(status) => {
                self.snapshot.write().await.status = status;
                true
            }
            Err(err) => {
                warn!("Fetching network status failed: {err}");
                self.notifier.error("Failed to fetch network status");
                false
            }
        }
    }

    /// Authorizes or revokes a device, then reloads the device list and status.
    pub async fn set_authorization(&self, mac: &str, authorized: bool) -> bool {
        if let Err(err) = self.api.set_device_authorization(mac, authorized).await {
            warn!("Updating authorization of {mac} failed: {err}");
            self.notifier.error("Failed to update device authorization");
            return false;
        }

        self.notifier.success(if authorized {
            "Device authorized"
        } else {
            "Device unauthorized"
        });
        self.fetch_devices().await;
        self.fetch_status().await;
        true
    }

    pub async fn rename_device(&self, mac: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            self.notifier.error("Device name cannot be empty");
            return false;
        }

        match self.api.rename_device(mac, name).await {
            Ok(()) => {
                self.notifier.success("Device name updated");
                self.fetch_devices().await;
                true
            }
            Err(err) => {
                warn!("Renaming {mac} failed: {err}");
                self.notifier.error("Failed to update device name");
                false
            }
        }
    }

    /// Starts or stops scanning depending on the last known scan state.
    pub async fn toggle_scan(&self) -> bool {
        let scanning = self.alerts.state().scanning;
        let outcome = if scanning {
            self.api.stop_scan().await
        } else {
            self.api.start_scan().await
        };

        match outcome {
            Ok(()) => {
                self.notifier.success(if scanning {
                    "Scanning stopped"
                } else {
                    "Scanning started"
                });
                self.alerts.refresh_status().await;
                true
            }
            Err(err) => {
                warn!("Toggling scan failed: {err}");
                let verb = if scanning { "stop" } else { "start" };
                self.notifier.error(&format!("Failed to {verb} scanning"));
                false
            }
        }
    }
}
