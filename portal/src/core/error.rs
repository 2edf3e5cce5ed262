//! # Common Error Types
//!
//! Consolidated error handling for the portal client.
//!
//! ## Error Categories
//!
//! - **Network**: the request never produced a response (DNS, refused, timeout)
//! - **Api**: the backend answered with an error envelope; its `message` is shown verbatim
//! - **Unauthorized / SessionExpired**: authentication failures after the refresh attempt
//! - **Validation**: client-side field errors, never sent to the server
//! - **Decode / Storage / State / Config**: local failures
//!
//! ## Usage Pattern
//!
//! ```rust,no_run
//! use portal::core::error::{PortalError, Result};
//!
//! fn require_positive(amount: i64) -> Result<i64> {
//!     if amount <= 0 {
//!         return Err(PortalError::State("Amount must be positive".to_string()));
//!     }
//!     Ok(amount)
//! }
//! ```

use crate::utils::validation::FieldErrors;
use thiserror::Error;

/// Application-wide error type for the portal client.
#[derive(Debug, Clone, Error)]
pub enum PortalError {
    /// No response from the backend.
    #[error("Network error: {0}")]
    Network(String),

    /// Backend error envelope.
    ///
    /// `message` is the backend's text, displayed to the user as-is.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 401/403 that survived the refresh-and-retry.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The refresh token was rejected; stored tokens have been cleared.
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Client-side validation failed; the request was not sent.
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// Response body did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Token file or download target could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Operation not valid in the current state (e.g. confirm before preview).
    #[error("State error: {0}")]
    State(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for `Result<T, PortalError>`.
pub type Result<T> = std::result::Result<T, PortalError>;

impl PortalError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        PortalError::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PortalError::Api { status, .. } => Some(*status),
            PortalError::Unauthorized(_) | PortalError::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// True for errors meaning the stored credentials are no good.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, PortalError::Unauthorized(_) | PortalError::SessionExpired)
            || matches!(self.status(), Some(401) | Some(403))
    }

    /// Text to show the user.
    ///
    /// Backend messages and validation messages pass through unchanged; transport
    /// and parsing failures collapse to `fallback` (e.g. "Failed to load transactions").
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            PortalError::Api { message, .. } => message.clone(),
            PortalError::Unauthorized(message) => message.clone(),
            PortalError::SessionExpired => self.to_string(),
            PortalError::Validation(errors) => errors
                .first()
                .map(|(_, message)| message.to_string())
                .unwrap_or_else(|| fallback.to_string()),
            PortalError::State(message) => message.clone(),
            PortalError::Network(_)
            | PortalError::Decode(_)
            | PortalError::Storage(_)
            | PortalError::Config(_) => fallback.to_string(),
        }
    }
}

impl From<FieldErrors> for PortalError {
    fn from(errors: FieldErrors) -> Self {
        PortalError::Validation(errors)
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PortalError::Decode(err.to_string())
        } else {
            PortalError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_passes_backend_text_through() {
        let err = PortalError::api(422, "Insufficient balance for withdrawal");
        assert_eq!(err.user_message("Failed to save"), "Insufficient balance for withdrawal");
        assert_eq!(err.to_string(), "Insufficient balance for withdrawal");
    }

    #[test]
    fn test_user_message_hides_transport_details() {
        let err = PortalError::Network("connection refused (os error 111)".to_string());
        assert_eq!(err.user_message("Failed to load transactions"), "Failed to load transactions");
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(PortalError::SessionExpired.is_auth_failure());
        assert!(PortalError::api(403, "Forbidden").is_auth_failure());
        assert!(!PortalError::api(500, "Internal error").is_auth_failure());
        assert!(!PortalError::Network("timeout".to_string()).is_auth_failure());
    }

    #[test]
    fn test_validation_message_is_first_field_error() {
        let mut errors = FieldErrors::new();
        errors.insert("bankName", "Bank name is required");
        let err = PortalError::from(errors);
        assert_eq!(err.user_message("Failed to save"), "Bank name is required");
    }
}
