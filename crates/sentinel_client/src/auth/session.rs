//! Session Manager: the client's record of who is logged in.
//!
//! A [`Session`] exists only after the backend's identity lookup accepted the
//! bearer token. Every public operation resolves errors into a return value
//! plus a notification; nothing here returns an error to the caller except the
//! explicit gating helpers.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::RwLock;

use crate::api::models::{Identity, Role};
use crate::api::ApiClient;
use crate::auth::token_store::TokenStore;
use crate::error::{ClientError, Result};
use crate::notify::Notifier;

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("token", &"<redacted>")
            .finish()
    }
}

pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    session: RwLock<Option<Session>>,
}

impl SessionManager {
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            store,
            notifier,
            session: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn login(&self, username: &str, password: &str) -> bool {
        if username.trim().is_empty() || password.is_empty() {
            self.clear().await;
            self.notifier.error("Username and password are required");
            return false;
        }

        match self.establish(username, password).await {
            Ok(session) => {
                let greeting = if session.identity.is_admin() {
                    "Admin"
                } else {
                    "Observer"
                };
                info!("Logged in as {} ({:?})", session.identity.username, session.identity.role);
                *self.session.write().await = Some(session);
                self.notifier.success(&format!("Welcome back, {greeting}"));
                true
            }
            Err(err) => {
                warn!("Login for {username} failed: {err}");
                self.clear().await;
                let message = match err {
                    ClientError::Storage(_) | ClientError::Io(_) => {
                        "Could not save the session token".to_string()
                    }
                    other => other.user_message("Invalid credentials"),
                };
                self.notifier.error(&message);
                false
            }
        }
    }

    async fn establish(&self, username: &str, password: &str) -> Result<Session> {
        let token = self.api.login(username, password).await?;
        self.api.token_slot().set(token.clone()).await;
        self.store.save(&token).await?;
        let identity = self.api.me().await?;
        Ok(Session { identity, token })
    }

    pub async fn logout(&self) {
        self.clear().await;
        info!("Session cleared");
        self.notifier.info("You have been logged out");
    }

    /// Creates an account. Never touches the current session.
    pub async fn register(&self, username: &str, password: &str, role: Role) -> bool {
        if username.trim().is_empty() || password.is_empty() {
            self.notifier.error("Username and password are required");
            return false;
        }

        match self.api.register(username, password, role).await {
            Ok(()) => {
                info!("Registered user {username} as {:?}", role);
                self.notifier
                    .success("Registration successful! You can now log in.");
                true
            }
            Err(err) => {
                warn!("Registration of {username} failed: {err}");
                self.notifier.error(&err.user_message("Registration failed"));
                false
            }
        }
    }

    /// Startup restore from the persisted token. Failures clear state without notifying.
    pub async fn restore(&self) -> Option<Identity> {
        let token = match self.store.load().await {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(err) => {
                warn!("Could not read persisted token: {err}");
                self.clear().await;
                return None;
            }
        };

        self.api.token_slot().set(token.clone()).await;
        match self.api.me().await {
            Ok(identity) => {
                info!("Restored session for {}", identity.username);
                *self.session.write().await = Some(Session {
                    identity: identity.clone(),
                    token,
                });
                Some(identity)
            }
            Err(err) => {
                debug!("Persisted token rejected: {err}");
                self.clear().await;
                None
            }
        }
    }

    async fn clear(&self) {
        *self.session.write().await = None;
        self.api.token_slot().clear().await;
        if let Err(err) = self.store.clear().await {
            warn!("Failed to remove persisted token: {err}");
        }
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.identity.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub async fn is_admin(&self) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .is_some_and(|session| session.identity.is_admin())
    }

    /// Gate for protected views.
    pub async fn require_session(&self) -> Result<Session> {
        self.current().await.ok_or(ClientError::NotAuthenticated)
    }

    pub async fn require_admin(&self) -> Result<Session> {
        let session = self.require_session().await?;
        if session.identity.is_admin() {
            Ok(session)
        } else {
            Err(ClientError::Forbidden("Admin access required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token_store::MemoryTokenStore;
    use crate::config::Config;
    use crate::notify::{Level, RecordingNotifier};

    fn manager(store: Arc<MemoryTokenStore>, notifier: Arc<RecordingNotifier>) -> SessionManager {
        // Nothing listens on port 9; any request fails fast with a network error.
        let api = ApiClient::new(&Config::default().with_api_base("http://127.0.0.1:9/api"))
            .expect("client");
        SessionManager::new(api, store, notifier)
    }

    #[tokio::test]
    async fn empty_credentials_are_rejected_locally() {
        let store = Arc::new(MemoryTokenStore::with_token("stale"));
        let notifier = Arc::new(RecordingNotifier::new());
        let sessions = manager(store.clone(), notifier.clone());

        assert!(!sessions.login("", "secret").await);
        assert!(sessions.current().await.is_none());
        assert_eq!(store.load().await.unwrap(), None);
        let last = notifier.last().expect("notification");
        assert_eq!(last.level, Level::Error);
        assert_eq!(last.message, "Username and password are required");
    }

    #[tokio::test]
    async fn logout_without_session_still_succeeds() {
        let store = Arc::new(MemoryTokenStore::with_token("left-over"));
        let notifier = Arc::new(RecordingNotifier::new());
        let sessions = manager(store.clone(), notifier.clone());

        sessions.logout().await;

        assert!(!sessions.is_authenticated().await);
        assert_eq!(store.load().await.unwrap(), None);
        assert!(!sessions.api().token_slot().is_set().await);
        assert_eq!(
            notifier.last().map(|n| n.message),
            Some("You have been logged out".to_string())
        );
    }

    #[tokio::test]
    async fn gating_without_session() {
        let sessions = manager(
            Arc::new(MemoryTokenStore::new()),
            Arc::new(RecordingNotifier::new()),
        );
        assert!(matches!(
            sessions.require_session().await,
            Err(ClientError::NotAuthenticated)
        ));
        assert!(matches!(
            sessions.require_admin().await,
            Err(ClientError::NotAuthenticated)
        ));
        assert!(!sessions.is_admin().await);
    }

    #[test]
    fn session_debug_redacts_token() {
        let session = Session {
            identity: Identity {
                id: None,
                username: "ops".to_string(),
                display_name: None,
                role: Role::Observer,
            },
            token: "super-secret".to_string(),
        };
        let printed = format!("{session:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
