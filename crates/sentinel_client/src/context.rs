//! Application root context.
//!
//! Owns the shared client, session and alert poller and hands them to views.
//! The alert poller runs while a session exists: it starts on restore or
//! login and stops on logout or when the [`Dashboard`] is dropped.

use std::sync::Arc;

use crate::alerts::{AlertPoller, AlertPollerHandle};
use crate::api::ApiClient;
use crate::auth::{FileTokenStore, SessionManager, TokenStore};
use crate::config::Config;
use crate::error::Result;
use crate::notify::Notifier;
use crate::views::{AuditTrail, NetworkMonitor, SecurityTools, UserAdmin};

pub struct Dashboard {
    api: ApiClient,
    sessions: Arc<SessionManager>,
    alerts: AlertPoller,
    notifier: Arc<dyn Notifier>,
    poller: Option<AlertPollerHandle>,
}

impl Dashboard {
    /// Builds the context with the token persisted under the configured data directory.
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.data_dir()));
        Self::with_store(config, store, notifier)
    }

    pub fn with_store(
        config: &Config,
        store: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let api = ApiClient::new(config)?;
        let sessions = Arc::new(SessionManager::new(
            api.clone(),
            store,
            Arc::clone(&notifier),
        ));
        let alerts = AlertPoller::new(Arc::new(api.clone()), config.poll_interval());
        Ok(Self {
            api,
            sessions,
            alerts,
            notifier,
            poller: None,
        })
    }

    /// Restores a persisted session and, if one exists, starts alert polling.
    pub async fn bootstrap(&mut self) -> bool {
        if self.sessions.restore().await.is_some() {
            self.start_polling();
            true
        } else {
            false
        }
    }

    /// Logs in through the session manager and starts polling on success.
    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        let ok = self.sessions.login(username, password).await;
        if ok {
            self.start_polling();
        }
        ok
    }

    /// Stops polling, then clears the session.
    pub async fn logout(&mut self) {
        self.stop_polling().await;
        self.sessions.logout().await;
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| h.is_running())
    }

    pub fn start_polling(&mut self) {
        if self.is_polling() {
            return;
        }
        self.poller = Some(self.alerts.start());
    }

    pub async fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.stop().await;
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn alerts(&self) -> &AlertPoller {
        &self.alerts
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn network_monitor(&self) -> NetworkMonitor {
        NetworkMonitor::new(
            self.api.clone(),
            self.alerts.clone(),
            Arc::clone(&self.notifier),
        )
    }

    pub fn audit_trail(&self) -> AuditTrail {
        AuditTrail::new(self.api.clone(), Arc::clone(&self.notifier))
    }

    pub fn security_tools(&self) -> SecurityTools {
        SecurityTools::new(Arc::clone(&self.sessions), Arc::clone(&self.notifier))
    }

    pub fn user_admin(&self) -> UserAdmin {
        UserAdmin::new(Arc::clone(&self.sessions), Arc::clone(&self.notifier))
    }
}
