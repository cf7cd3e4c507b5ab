use std::sync::Arc;

use log::warn;

use crate::api::models::{Role, UserSummary};
use crate::auth::SessionManager;
use crate::notify::Notifier;

/// User administration. Every operation requires an admin session.
pub struct UserAdmin {
    sessions: Arc<SessionManager>,
    notifier: Arc<dyn Notifier>,
}

impl UserAdmin {
    pub fn new(sessions: Arc<SessionManager>, notifier: Arc<dyn Notifier>) -> Self {
        Self { sessions, notifier }
    }

    async fn ensure_admin(&self) -> bool {
        match self.sessions.require_admin().await {
            Ok(_) => true,
            Err(err) => {
                self.notifier.error(&err.user_message("Admin access required"));
                false
            }
        }
    }

    pub async fn list(&self) -> Option<Vec<UserSummary>> {
        if !self.ensure_admin().await {
            return None;
        }
        match self.sessions.api().list_users().await {
            Ok(users) => Some(users),
            Err(err) => {
                warn!("Listing users failed: {err}");
                self.notifier.error("Failed to fetch users");
                None
            }
        }
    }

    pub async fn create(&self, username: &str, password: &str, role: Role) -> bool {
        if !self.ensure_admin().await {
            return false;
        }
        let created = self.sessions.register(username, password, role).await;
        if created {
            self.notifier
                .success(&format!("User {username} created successfully"));
        }
        created
    }

    pub async fn delete(&self, username: &str) -> bool {
        if !self.ensure_admin().await {
            return false;
        }
        match self.sessions.api().delete_user(username).await {
            Ok(()) => {
                self.notifier
                    .success(&format!("User {username} deleted successfully"));
                true
            }
            Err(err) => {
                warn!("Deleting user {username} failed: {err}");
                self.notifier.error(&err.user_message("Error deleting user"));
                false
            }
        }
    }
}
