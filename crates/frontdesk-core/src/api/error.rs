use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Keyword that marks a 401 as a rejected credential rather than, say, a
/// wrong password.
const TOKEN_KEYWORD: &str = "token";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session rejected by server: {0}")]
    AuthRejected(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// The `message` field of a JSON error body. Null or missing is `None`;
    /// non-string values are stringified.
    pub fn message_field(body: &str) -> Option<String> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => match map.get("message") {
                Some(Value::String(message)) => Some(message.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            },
            _ => None,
        }
    }

    /// The human-readable message of an error body: the `message` field of a
    /// JSON body when there is one, otherwise the body itself.
    pub fn server_message(body: &str) -> String {
        Self::message_field(body).unwrap_or_else(|| Self::truncate_body(body))
    }

    /// Whether a 401 message says the credential itself was rejected.
    pub fn mentions_token(message: &str) -> bool {
        message.to_lowercase().contains(TOKEN_KEYWORD)
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::server_message(body);
        match status.as_u16() {
            401 if Self::message_field(body).is_some_and(|m| Self::mentions_token(&m)) => {
                ApiError::AuthRejected(message)
            }
            401 => ApiError::Unauthorized(message),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// True when the server rejected the session's credential.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, ApiError::AuthRejected(_))
    }

    /// The server-supplied message, for screen-level reporting.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::AuthRejected(m)
            | ApiError::Unauthorized(m)
            | ApiError::AccessDenied(m)
            | ApiError::NotFound(m)
            | ApiError::ServerError(m) => Some(m),
            _ => None,
        }
    }
}
