use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("token storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ClientError::Network(format!("malformed response body: {err}"));
        }
        ClientError::Network(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for ClientError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => ClientError::Network(e.to_string()),
        }
    }
}

/// FastAPI error bodies carry either a string or a list of validation items in `detail`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Detail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Items(Vec<DetailItem>),
}

#[derive(Debug, Deserialize)]
struct DetailItem {
    msg: Option<String>,
}

pub(crate) fn extract_detail(body: &[u8]) -> Option<String> {
    let parsed = serde_json::from_slice::<ErrorBody>(body).ok()?;
    match parsed.detail? {
        Detail::Message(message) => Some(message),
        Detail::Items(items) => {
            let joined = items
                .into_iter()
                .filter_map(|item| item.msg)
                .collect::<Vec<_>>()
                .join("; ");
            (!joined.is_empty()).then_some(joined)
        }
    }
}

impl ClientError {
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let message = extract_detail(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            other => ClientError::Api {
                status: other.as_u16(),
                message,
            },
        }
    }

    /// The backend-provided message, if the error came from a response body.
    pub fn backend_detail(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized(m)
            | ClientError::Forbidden(m)
            | ClientError::Validation(m)
            | ClientError::NotFound(m) => Some(m),
            ClientError::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Text for a user-facing notification, preferring the backend detail over `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_detail()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized(_) | ClientError::Forbidden(_) | ClientError::NotAuthenticated
        )
    }
}
