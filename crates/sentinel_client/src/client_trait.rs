use async_trait::async_trait;

use crate::api::models::{NetworkStatus, ScanStatus};
use crate::error::Result;

/// Backend status endpoints the alert poller reads from.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn network_status(&self) -> Result<NetworkStatus>;

    async fn scan_status(&self) -> Result<ScanStatus>;
}
