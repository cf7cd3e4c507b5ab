mod common;

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use common::{api_for, harness, mount_login};
use sentinel_client::api::models::{AuditEventType, AuditQuery};
use sentinel_client::views::{AuditTrail, SecurityTools, UserAdmin};
use sentinel_client::{ApiClient, ClientError, Config, RecordingNotifier, Role};
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn audit_body() -> serde_json::Value {
    serde_json::json!([
        {
            "_id": "661234abcd",
            "timestamp": "2025-04-07T09:15:22.123000",
            "device_mac": "aa:bb:cc:dd:ee:01",
            "event_type": "authorize",
            "ip_address": "192.168.1.42",
            "details": "Authorized by admin",
            "device_name": "Thermostat"
        },
        {
            "timestamp": "2025-04-06T18:00:00Z",
            "device_mac": "aa:bb:cc:dd:ee:02",
            "event_type": "connect"
        }
    ])
}

#[tokio::test]
async fn audit_query_is_sent_as_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/network/audit"))
        .and(query_param("limit", "50"))
        .and(query_param("event_type", "authorize"))
        .and(query_param("start_date", "2025-04-01"))
        .and(query_param("end_date", "2025-04-07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(audit_body()))
        .expect(1)
        .mount(&server)
        .await;

    let query = AuditQuery {
        limit: 50,
        device_mac: Some(String::new()),
        event_type: Some(AuditEventType::Authorize),
        start_date: NaiveDate::from_ymd_opt(2025, 4, 1),
        end_date: NaiveDate::from_ymd_opt(2025, 4, 7),
    };
    let logs = api_for(&server).audit_logs(&query).await.expect("audit logs");

    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].id.as_deref(), Some("661234abcd"));
    assert_eq!(
        logs[0].timestamp,
        Utc.with_ymd_and_hms(2025, 4, 7, 9, 15, 22).unwrap()
            + chrono::Duration::milliseconds(123)
    );
    assert_eq!(logs[1].ip_address, None);

    let requests = server.received_requests().await.expect("recording enabled");
    let query_string = requests[0].url.query().unwrap_or_default().to_string();
    assert!(!query_string.contains("device_mac"));
}

#[tokio::test]
async fn audit_trail_exports_and_downloads_what_it_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/network/audit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(audit_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/network/audit/report"))
        .and(body_partial_json(serde_json::json!({
            "filters": { "limit": 100, "event_type": "connect" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4 fake".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let trail = AuditTrail::new(api_for(&server), notifier.clone());

    let query = AuditQuery {
        event_type: Some(AuditEventType::Connect),
        ..AuditQuery::default()
    };
    assert_eq!(trail.fetch(query).await.map(|l| l.len()), Some(2));
    let cached = trail.logs().await;
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].device_name.as_deref(), Some("Thermostat"));

    let mut csv = Vec::new();
    assert!(trail.export_csv(&mut csv).await);
    let csv = String::from_utf8(csv).expect("utf8");
    assert!(csv.starts_with("\"Timestamp\",\"Event Type\""));
    assert!(csv.contains("\"N/A\""));

    let pdf = trail.download_report().await.expect("pdf bytes");
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(
        notifier.last().map(|n| n.message),
        Some("PDF downloaded".to_string())
    );
}

#[tokio::test]
async fn export_without_logs_warns() {
    let server = MockServer::start().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let trail = AuditTrail::new(api_for(&server), notifier.clone());

    assert!(!trail.export_csv(Vec::new()).await);
    assert_eq!(
        notifier.last().map(|n| n.message),
        Some("No data to export".to_string())
    );
}

#[tokio::test]
async fn url_analysis_decodes_camel_case_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/security/analyze-url"))
        .and(body_json(serde_json::json!({ "url": "http://phish.example/login" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "isMalicious": true,
            "confidence": 0.93,
            "reason": "Known phishing pattern"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let analysis = api_for(&server)
        .analyze_url("http://phish.example/login")
        .await
        .expect("analysis");
    assert!(analysis.is_malicious);
    assert!((analysis.confidence - 0.93).abs() < f64::EPSILON);
    assert_eq!(analysis.reason.as_deref(), Some("Known phishing pattern"));
}

#[tokio::test]
async fn user_names_are_encoded_as_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/auth/users/john%20doe"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .delete_user("john doe")
        .await
        .expect("delete user");
}

#[tokio::test]
async fn forbidden_status_keeps_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "detail": "Not authorized"
        })))
        .mount(&server)
        .await;

    let err = api_for(&server).list_users().await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(ref m) if m == "Not authorized"));
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let config = Config::default().with_api_base("http://127.0.0.1:9/api");
    let api = ApiClient::new(&config).expect("client");

    let err = api.network_status().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(err.user_message("Failed to fetch network status"), "Failed to fetch network status");
}

#[tokio::test]
async fn observer_is_denied_admin_views_without_a_request() {
    let h = harness().await;
    mount_login(&h.server, "viewer", "observer", "jwt-viewer").await;
    Mock::given(method("GET"))
        .and(path("/api/security/reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&h.server)
        .await;

    assert!(h.sessions.login("viewer", "pw").await);

    let tools = SecurityTools::new(h.sessions.clone(), h.notifier.clone());
    assert!(tools.reports().await.is_none());
    assert_eq!(
        h.notifier.last().map(|n| n.message),
        Some("Admin access required".to_string())
    );

    let admin = UserAdmin::new(h.sessions.clone(), h.notifier.clone());
    assert!(admin.list().await.is_none());
}

#[tokio::test]
async fn admin_lists_and_creates_users() {
    let h = harness().await;
    mount_login(&h.server, "root", "admin", "jwt-root").await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "username": "root", "role": "admin" },
            { "username": "viewer", "role": "observer" }
        ])))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_partial_json(serde_json::json!({ "username": "ops", "role": "admin" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.sessions.login("root", "pw").await);
    let admin = UserAdmin::new(h.sessions.clone(), h.notifier.clone());

    let users = admin.list().await.expect("users");
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].role, Role::Observer);

    assert!(admin.create("ops", "pw", Role::Admin).await);
    assert_eq!(
        h.notifier.last().map(|n| n.message),
        Some("User ops created successfully".to_string())
    );
    assert!(h.sessions.is_admin().await);
}
