//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use sentinel_client::{
    ApiClient, Config, MemoryTokenStore, RecordingNotifier, SessionManager, TokenStore,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn config_for(server: &MockServer) -> Config {
    Config::default().with_api_base(format!("{}/api", server.uri()))
}

pub fn api_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&config_for(server)).expect("Failed to build API client")
}

pub struct Harness {
    pub server: MockServer,
    pub api: ApiClient,
    pub store: Arc<MemoryTokenStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub sessions: Arc<SessionManager>,
}

pub async fn harness() -> Harness {
    harness_with_store(Arc::new(MemoryTokenStore::new())).await
}

pub async fn harness_with_store(store: Arc<MemoryTokenStore>) -> Harness {
    let server = MockServer::start().await;
    let api = api_for(&server);
    let notifier = Arc::new(RecordingNotifier::new());
    let token_store: Arc<dyn TokenStore> = store.clone();
    let sessions = Arc::new(SessionManager::new(
        api.clone(),
        token_store,
        notifier.clone(),
    ));
    Harness {
        server,
        api,
        store,
        notifier,
        sessions,
    }
}

pub fn identity_json(username: &str, role: &str) -> serde_json::Value {
    serde_json::json!({ "username": username, "role": role })
}

/// Mounts a successful login for `username` that yields `token`, plus the matching `/auth/me`.
pub async fn mount_login(server: &MockServer, username: &str, role: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_string_contains(format!("username={username}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_json(username, role)))
        .mount(server)
        .await;
}

pub fn device_json(mac: &str, authorized: bool) -> serde_json::Value {
    serde_json::json!({
        "ip": "192.168.1.42",
        "mac": mac,
        "authorized": authorized,
        "first_seen": "2025-04-07T09:15:22.123000",
        "last_seen": "2025-04-07T10:01:00",
        "name": null
    })
}

/// Mounts `/network/status` and `/network/scan-status` with the given alert values.
pub async fn mount_status(server: &MockServer, unauthorized: u64, scanning: bool) {
    Mock::given(method("GET"))
        .and(path("/api/network/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "secure": unauthorized == 0,
            "connected_devices": 7,
            "unauthorized_devices": unauthorized
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/network/scan-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "scanning": scanning
        })))
        .mount(server)
        .await;
}

/// Number of requests the server has seen for `request_path`.
pub async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}
