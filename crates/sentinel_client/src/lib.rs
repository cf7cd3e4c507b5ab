//! # sentinel_client
//!
//! Client side of the IoT Sentinel security dashboard: a bearer-token HTTP
//! client for the backend REST API, the session manager, the alert poller and
//! the page-level operations built on top of them.

pub mod alerts;
pub mod api;
pub mod auth;
pub mod client_trait;
pub mod config;
pub mod context;
pub mod error;
pub mod notify;
pub mod paths;
pub mod views;

pub use alerts::{AlertPoller, AlertPollerHandle, AlertState};
pub use api::models::{Identity, Role};
pub use api::{ApiClient, TokenSlot};
pub use auth::{FileTokenStore, MemoryTokenStore, Session, SessionManager, TokenStore};
pub use client_trait::StatusSource;
pub use config::Config;
pub use context::Dashboard;
pub use error::{ClientError, Result};
pub use notify::{ChannelNotifier, Level, Notification, Notifier, RecordingNotifier};
