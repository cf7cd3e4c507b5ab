use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Backend timestamps arrive either with an offset or as naive UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Observer,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Observer => "Observer",
            Role::Unknown => "Unknown",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "observer" => Ok(Role::Observer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Identity record returned by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub role: Role,
}

impl Identity {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.username)
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkStatus {
    pub secure: bool,
    pub connected_devices: u64,
    pub unauthorized_devices: u64,
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self {
            secure: true,
            connected_devices: 0,
            unauthorized_devices: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanStatus {
    pub scanning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub ip: String,
    pub mac: String,
    #[serde(default)]
    pub authorized: bool,
    #[serde(with = "timestamp")]
    pub first_seen: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Device {
    pub fn label(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AuthorizationRequest {
    pub authorized: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DeviceNameRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    Connect,
    Disconnect,
    Authorize,
    Revoke,
    NameChange,
    All,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::Connect => "connect",
            AuditEventType::Disconnect => "disconnect",
            AuditEventType::Authorize => "authorize",
            AuditEventType::Revoke => "revoke",
            AuditEventType::NameChange => "name_change",
            AuditEventType::All => "all",
        }
    }
}

impl std::str::FromStr for AuditEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "connect" => Ok(Self::Connect),
            "disconnect" => Ok(Self::Disconnect),
            "authorize" => Ok(Self::Authorize),
            "revoke" => Ok(Self::Revoke),
            "name_change" => Ok(Self::NameChange),
            "all" => Ok(Self::All),
            other => Err(format!("unknown audit event type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub device_mac: String,
    pub event_type: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
}

pub const DEFAULT_AUDIT_LIMIT: u32 = 100;

/// Filters for `/network/audit`. Dates are inclusive calendar days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditQuery {
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<AuditEventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_AUDIT_LIMIT,
            device_mac: None,
            event_type: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl AuditQuery {
    /// The audit page opens on the last seven days.
    pub fn last_days(days: u32) -> crate::error::Result<Self> {
        Self::days_before(Utc::now().date_naive(), days)
    }

    fn days_before(end: NaiveDate, days: u32) -> crate::error::Result<Self> {
        let start = chrono::Duration::try_days(i64::from(days))
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| {
                crate::error::ClientError::Validation(format!(
                    "cannot look back {days} days from {end}"
                ))
            })?;
        Ok(Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Self::default()
        })
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.limit.to_string())];
        if let Some(mac) = self.device_mac.as_deref().filter(|m| !m.is_empty()) {
            params.push(("device_mac", mac.to_string()));
        }
        if let Some(event_type) = self.event_type.filter(|e| *e != AuditEventType::All) {
            params.push(("event_type", event_type.as_str().to_string()));
        }
        if let Some(start) = self.start_date {
            params.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AuditReportRequest<'a> {
    pub logs: &'a [AuditLog],
    pub filters: &'a AuditQuery,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UrlRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EmailRequest<'a> {
    pub email_text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlAnalysis {
    #[serde(rename = "isMalicious")]
    pub is_malicious: bool,
    pub confidence: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAnalysis {
    #[serde(rename = "isPhishing")]
    pub is_phishing: bool,
    pub confidence: f64,
    #[serde(default)]
    pub reasons: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub tool: String,
    pub input_data: String,
    pub result: String,
    pub confidence: f64,
    #[serde(default)]
    pub reasons: Option<Vec<String>>,
}
