//! Error handling module for the Flock admin client.
//!
//! Provides the client error taxonomy and maps backend error payloads onto it.

use serde_json::Value;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const UNEXPECTED_STATUS: &str = "UNEXPECTED_STATUS";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub const NETWORK_UNAVAILABLE: &str = "Network error. Please check your connection.";
const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Client error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Client-side validation failure; no request was sent
    Validation(String),
    /// Authentication failed or the session could not be renewed
    Unauthorized(String),
    /// Authenticated but not allowed
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Backend rejected the request with a `detail` payload
    Server { status: u16, message: String },
    /// The request never produced an HTTP status
    Network(String),
    /// A success body could not be decoded
    Decode(String),
    /// Any other status without a usable payload
    Unexpected { status: u16 },
    /// Invalid client configuration
    Config(String),
}

impl ApiError {
    /// Get the HTTP status code behind this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server { status, .. } | ApiError::Unexpected { status } => Some(*status),
            ApiError::Validation(_)
            | ApiError::Network(_)
            | ApiError::Decode(_)
            | ApiError::Config(_) => None,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => codes::VALIDATION_ERROR,
            ApiError::Unauthorized(_) => codes::UNAUTHORIZED,
            ApiError::Forbidden(_) => codes::FORBIDDEN,
            ApiError::NotFound(_) => codes::NOT_FOUND,
            ApiError::Server { .. } => codes::SERVER_ERROR,
            ApiError::Network(_) => codes::NETWORK_ERROR,
            ApiError::Decode(_) => codes::DECODE_ERROR,
            ApiError::Unexpected { .. } => codes::UNEXPECTED_STATUS,
            ApiError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// Get the user-facing message.
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Network(msg)
            | ApiError::Decode(msg)
            | ApiError::Config(msg) => msg.clone(),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Unexpected { status } => format!("Request failed with status {}", status),
        }
    }

    /// Classify a non-success response from its status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|payload| payload.get("detail").and_then(flatten_detail));

        match (status, detail) {
            (401, detail) => ApiError::Unauthorized(detail.unwrap_or_else(|| SESSION_EXPIRED.to_string())),
            (403, detail) => {
                ApiError::Forbidden(detail.unwrap_or_else(|| PERMISSION_DENIED.to_string()))
            }
            (404, detail) => {
                ApiError::NotFound(detail.unwrap_or_else(|| "Resource not found".to_string()))
            }
            (status, Some(message)) => ApiError::Server { status, message },
            (status, None) => ApiError::Unexpected { status },
        }
    }
}

/// Flatten a `detail` payload into one message.
///
/// Strings pass through; arrays of `{msg}` objects (or bare strings) are joined with `". "`.
pub fn flatten_detail(detail: &Value) -> Option<String> {
    let message = match detail {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.clone()),
                other => other.get("msg").and_then(Value::as_str).map(str::to_string),
            })
            .collect::<Vec<_>>()
            .join(". "),
        Value::Object(_) => detail.get("msg").and_then(Value::as_str)?.to_string(),
        _ => return None,
    };

    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            tracing::error!("Response decode error: {:?}", err);
            return ApiError::Decode(format!("Invalid response body: {}", err));
        }
        match err.status() {
            Some(status) => ApiError::Unexpected {
                status: status.as_u16(),
            },
            None => {
                tracing::warn!("Network error: {:?}", err);
                ApiError::Network(NETWORK_UNAVAILABLE.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        ApiError::Decode(format!("JSON error: {}", err))
    }
}
