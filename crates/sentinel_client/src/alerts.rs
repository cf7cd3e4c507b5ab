//! Alert Poller: a periodic projection of backend network state.
//!
//! Every cycle reads `/network/status` and `/network/scan-status` and publishes
//! one [`AlertState`] snapshot. Errors reset the snapshot to its zero value.
//! There is no retry and no backoff; the next tick simply tries again.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client_trait::StatusSource;
use crate::error::ClientError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AlertState {
    pub unauthorized_count: u64,
    pub scanning: bool,
}

impl AlertState {
    pub fn has_alert(&self) -> bool {
        self.unauthorized_count > 0 || self.scanning
    }

    /// Header banner text, or `None` when there is nothing to report.
    pub fn banner(&self) -> Option<String> {
        let mut parts = Vec::new();
        match self.unauthorized_count {
            0 => {}
            1 => parts.push("1 unauthorized device detected".to_string()),
            n => parts.push(format!("{n} unauthorized devices detected")),
        }
        if self.scanning {
            parts.push("Network scan in progress".to_string());
        }
        (!parts.is_empty()).then(|| parts.join(" · "))
    }
}

#[derive(Clone)]
pub struct AlertPoller {
    source: Arc<dyn StatusSource>,
    interval: Duration,
    state: Arc<watch::Sender<AlertState>>,
}

impl AlertPoller {
    pub fn new(source: Arc<dyn StatusSource>, interval: Duration) -> Self {
        let (tx, _rx) = watch::channel(AlertState::default());
        Self {
            source,
            interval,
            state: Arc::new(tx),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> AlertState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AlertState> {
        self.state.subscribe()
    }

    /// Immediate out-of-band poll. The periodic task keeps its own cadence.
    pub async fn refresh_status(&self) -> AlertState {
        let next = poll_once(self.source.as_ref()).await;
        self.state.send_replace(next);
        next
    }

    /// Spawns the periodic task. The first poll runs right away.
    pub fn start(&self) -> AlertPollerHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let next = tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    next = poll_once(source.as_ref()) => next,
                };
                state.send_replace(next);
            }
            debug!("Alert poller stopped");
        });

        AlertPollerHandle {
            cancel,
            task: Some(task),
        }
    }
}

async fn poll_once(source: &dyn StatusSource) -> AlertState {
    let cycle = async {
        let status = source.network_status().await?;
        let scan = source.scan_status().await?;
        Ok::<_, ClientError>(AlertState {
            unauthorized_count: status.unauthorized_devices,
            scanning: scan.scanning,
        })
    };
    match cycle.await {
        Ok(state) => state,
        Err(err) => {
            debug!("Status poll failed, reporting nothing: {err}");
            AlertState::default()
        }
    }
}

/// Owns the periodic task; stopping or dropping it cancels polling.
pub struct AlertPollerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AlertPollerHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for AlertPollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{NetworkStatus, ScanStatus};
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        unauthorized: AtomicU64,
        scanning: AtomicBool,
        failing: AtomicBool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StatusSource for FakeSource {
        async fn network_status(&self) -> Result<NetworkStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ClientError::Network("connection refused".to_string()));
            }
            Ok(NetworkStatus {
                unauthorized_devices: self.unauthorized.load(Ordering::SeqCst),
                ..NetworkStatus::default()
            })
        }

        async fn scan_status(&self) -> Result<ScanStatus> {
            Ok(ScanStatus {
                scanning: self.scanning.load(Ordering::SeqCst),
            })
        }
    }

    #[test]
    fn banner_text() {
        assert_eq!(AlertState::default().banner(), None);
        assert_eq!(
            AlertState { unauthorized_count: 1, scanning: false }.banner().as_deref(),
            Some("1 unauthorized device detected")
        );
        assert_eq!(
            AlertState { unauthorized_count: 3, scanning: true }.banner().as_deref(),
            Some("3 unauthorized devices detected · Network scan in progress")
        );
    }

    #[tokio::test]
    async fn refresh_replaces_state_wholesale() {
        let source = Arc::new(FakeSource::default());
        source.unauthorized.store(2, Ordering::SeqCst);
        source.scanning.store(true, Ordering::SeqCst);
        let poller = AlertPoller::new(source.clone(), DEFAULT_POLL_INTERVAL);

        let state = poller.refresh_status().await;
        assert_eq!(state, AlertState { unauthorized_count: 2, scanning: true });

        source.failing.store(true, Ordering::SeqCst);
        assert_eq!(poller.refresh_status().await, AlertState::default());
        assert_eq!(poller.state(), AlertState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_task_polls_every_interval_until_stopped() {
        let source = Arc::new(FakeSource::default());
        let poller = AlertPoller::new(source.clone(), Duration::from_secs(5));

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        source.unauthorized.store(4, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(poller.state().unauthorized_count, 4);

        assert!(handle.is_running());
        handle.stop().await;
        let calls = source.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels_polling() {
        let source = Arc::new(FakeSource::default());
        let poller = AlertPoller::new(source.clone(), Duration::from_secs(5));

        drop(poller.start());
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(source.calls.load(Ordering::SeqCst) <= 1);
    }
}
