//! SDK error types
//!
//! The taxonomy callers branch on:
//! - `NotAuthenticated`: no local identity, send the user to login
//! - `Unauthorized`: the server rejected the token (credentials already cleared)
//! - `ProfileNotFound`: calibration never completed
//! - `RequestFailed`: any other transport or HTTP failure
//! - `GenerationFailed` / `ProblemUnavailable`: endpoint-specific rejections

use thiserror::Error;

/// SDK-specific errors
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Not authenticated: no stored credentials")]
    NotAuthenticated,

    #[error("Unauthorized: the server rejected the stored credentials")]
    Unauthorized,

    #[error("Profile not found for {user_id}: calibration required")]
    ProfileNotFound { user_id: String },

    #[error("Request failed: {message}")]
    RequestFailed { status: Option<u16>, message: String },

    #[error("Problem generation failed: {0}")]
    GenerationFailed(String),

    #[error("Problem {problem_id} unavailable: {message}")]
    ProblemUnavailable { problem_id: String, message: String },

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Credential store error: {0}")]
    Credentials(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SdkError {
    /// A non-success HTTP status with the server's message
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        SdkError::RequestFailed {
            status: Some(status),
            message: format!("HTTP {}: {}", status, message.into()),
        }
    }

    /// A failure that never produced an HTTP status
    pub fn transport(message: impl Into<String>) -> Self {
        SdkError::RequestFailed {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status behind the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::RequestFailed { status, .. } => *status,
            SdkError::Unauthorized => Some(401),
            SdkError::ProfileNotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Errors that mean the user must (re)authenticate
    pub fn requires_login(&self) -> bool {
        matches!(self, SdkError::NotAuthenticated | SdkError::Unauthorized)
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        SdkError::RequestFailed {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for SdkError {
    fn from(e: std::io::Error) -> Self {
        SdkError::Credentials(e.to_string())
    }
}

/// SDK Result type
pub type SdkResult<T> = std::result::Result<T, SdkError>;
