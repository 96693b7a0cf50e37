use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session may be expired{}", message_suffix(.0))]
    Unauthorized(Option<String>),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying: {0}")]
    RateLimited(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Validation(String),

    #[error("Session storage failed: {0}")]
    Session(#[from] StoreError),
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error bodies from the portal API carry a `message` field.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the server's `message` out of a JSON error body, falling back
    /// to the (truncated) raw body.
    fn extract_message(body: &str) -> Option<String> {
        if let Ok(ErrorBody { message: Some(m) }) = serde_json::from_str::<ErrorBody>(body) {
            return Some(m);
        }
        let trimmed = body.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::truncate_body(trimmed))
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        let text = message
            .clone()
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::AccessDenied(text),
            404 => ApiError::NotFound(text),
            429 => ApiError::RateLimited(text),
            code @ 500..=599 => ApiError::ServerError(code, text),
            code => ApiError::Rejected { status: code, message: text },
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// HTTP status of the failed call, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::AccessDenied(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::RateLimited(_) => Some(429),
            ApiError::ServerError(code, _) => Some(*code),
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse(_) | ApiError::Validation(_) | ApiError::Session(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Message suitable for showing to the applicant inline.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(m) => m.as_deref(),
            ApiError::AccessDenied(m)
            | ApiError::NotFound(m)
            | ApiError::RateLimited(m)
            | ApiError::ServerError(_, m)
            | ApiError::Rejected { message: m, .. }
            | ApiError::Validation(m) => Some(m.as_str()),
            _ => None,
        }
    }

    /// Server message if there is one, otherwise the given fallback.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message().filter(|m| !m.is_empty()).unwrap_or(fallback)
    }
}
