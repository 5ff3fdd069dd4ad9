//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message surfaced for failures whose shape is not one of the known
/// transport, HTTP, or authentication errors.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred while syncing the fleet";

/// Main error type for RavenFleet
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FleetError {
    /// The login (or re-login) exchange was rejected.
    #[error("Authentication failed: {message}")]
    Auth { status: Option<u16>, message: String },

    /// Any other non-2xx response.
    #[error("HTTP {status} {status_text}")]
    Http { status: u16, status_text: String, body: String },

    /// The request never produced a response.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Malformed or missing fields in a payload or in user input.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A token refresh failed; the session must be re-established from
    /// credentials entered by the user.
    #[error("Session expired: {message}")]
    SessionExpired { message: String },

    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FleetError {
    pub fn auth(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Auth { status, message: message.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::SessionExpired { message: message.into() }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// True when a data call was rejected because the bearer token is no
    /// longer accepted. Such failures are answered with one re-login and a
    /// single retry.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401 | 403, .. })
    }

    /// True when the failure means the whole session is gone and the user
    /// has to enter credentials again.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::SessionExpired { .. })
    }

    /// Stable label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Http { .. } => "http",
            Self::Network { .. } => "network",
            Self::Validation { .. } => "validation",
            Self::SessionExpired { .. } => "session_expired",
            Self::InvalidState { .. } => "invalid_state",
            Self::Config { .. } => "config",
            Self::Storage { .. } => "storage",
            Self::Internal { .. } => "internal",
        }
    }

    /// Single human-readable message shown after a failed sync pass.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth { message, .. } => {
                format!("Could not sign in to the fleet API: {message}. Please re-enter your credentials.")
            }
            Self::SessionExpired { .. } => {
                "Your session has expired. Please re-enter your credentials.".to_string()
            }
            Self::Http { status, status_text, .. } => {
                if status_text.is_empty() {
                    format!("The fleet API responded with status {status}.")
                } else {
                    format!("The fleet API responded with status {status} ({status_text}).")
                }
            }
            Self::Network { message } => format!("Could not reach the fleet API: {message}"),
            Self::Validation { message } => format!("The fleet API returned unexpected data: {message}"),
            Self::Config { message } => format!("Configuration problem: {message}"),
            Self::Storage { message } => format!("Could not access saved credentials: {message}"),
            Self::InvalidState { .. } | Self::Internal { .. } => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Result type alias for RavenFleet operations
pub type Result<T> = std::result::Result<T, FleetError>;
