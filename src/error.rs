//! Error types for canal-denuncia
//!
//! This module provides the error taxonomy for the service:
//! - [`Error`] for startup, configuration and server failures
//! - [`StoreError`] and [`MailError`] for the two downstream collaborators
//! - [`SubmissionError`] for the submission pipeline, with HTTP status mapping
//! - [`ApiError`], the JSON error body returned by the intake routes

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for canal-denuncia operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for canal-denuncia
///
/// Used for everything outside a single submission: loading configuration,
/// building clients, binding the listener.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "SUPABASE_URL")
        key: Option<String>,
    },

    /// Mail notifier error
    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Report store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store answered with a non-success status
    #[error("store rejected insert (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status returned by the store
        status: u16,
        /// Error message reported by the store
        message: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset, ...)
    #[error("store request failed: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout
    #[error("store request timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    /// The underlying detail surfaced to API callers
    ///
    /// For rejections this is the store's own message, matching what the
    /// store reports for e.g. a policy violation.
    pub fn detail(&self) -> String {
        match self {
            StoreError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            StoreError::Timeout(timeout)
        } else {
            StoreError::Transport(error.to_string())
        }
    }
}

/// Mail notifier errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    /// A credential needed to send mail is not configured
    #[error("missing mail credential: {0}")]
    MissingCredential(&'static str),

    /// Exchanging the refresh token (or an authorization code) failed
    #[error("token request failed (HTTP {status}): {message}")]
    Token {
        /// HTTP status returned by the token endpoint
        status: u16,
        /// Error description reported by the token endpoint
        message: String,
    },

    /// The mail API refused the message
    #[error("mail API rejected message (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status returned by the mail API
        status: u16,
        /// Error message reported by the mail API
        message: String,
    },

    /// The request never produced a response
    #[error("mail request failed: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout
    #[error("mail request timed out after {0:?}")]
    Timeout(Duration),

    /// The notifier panicked while sending
    #[error("notifier panicked: {0}")]
    Panicked(String),
}

impl MailError {
    /// The underlying detail surfaced to API callers
    pub fn detail(&self) -> String {
        match self {
            MailError::Token { message, .. } | MailError::Rejected { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            MailError::Timeout(timeout)
        } else {
            MailError::Transport(error.to_string())
        }
    }
}

/// Failure of a single submission
///
/// Each variant corresponds to one terminal branch of the pipeline. Whether the
/// report reached the store is part of the error, so a notification failure
/// after a successful append is never confused with data loss.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// One or more required fields were missing or empty
    #[error("missing required field(s): {}", .missing.join(", "))]
    Validation {
        /// Wire names of the offending fields, in payload order
        missing: Vec<&'static str>,
    },

    /// Appending the report failed; no notification was attempted
    #[error("failed to persist report: {0}")]
    Persist(#[source] StoreError),

    /// Sending the notification failed
    #[error("failed to send notification: {source}")]
    Notify {
        /// The mail transport failure
        source: MailError,
        /// Whether the report had already been appended to the store
        persisted: bool,
    },

    /// Any other failure while processing the request
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl SubmissionError {
    /// Whether the report exists in the store despite this failure
    pub fn report_persisted(&self) -> bool {
        matches!(
            self,
            SubmissionError::Notify {
                persisted: true,
                ..
            }
        )
    }

    /// The collaborator's error text, if this failure came from one
    pub fn detail(&self) -> Option<String> {
        match self {
            SubmissionError::Validation { .. } => None,
            SubmissionError::Persist(e) => Some(e.detail()),
            SubmissionError::Notify { source, .. } => Some(source.detail()),
            SubmissionError::Unexpected(msg) => Some(msg.clone()),
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for SubmissionError {
    fn status_code(&self) -> u16 {
        match self {
            // Client-correctable
            SubmissionError::Validation { .. } => 400,
            // Downstream or internal failures
            SubmissionError::Persist(_) => 500,
            SubmissionError::Notify { .. } => 500,
            SubmissionError::Unexpected(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            SubmissionError::Validation { .. } => "validation_error",
            SubmissionError::Persist(_) => "persist_error",
            SubmissionError::Notify { .. } => "notify_error",
            SubmissionError::Unexpected(_) => "unexpected_error",
        }
    }
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "Falha ao salvar no Supabase",
///   "details": "new row violates row-level security policy"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,

    /// Error text from the failing collaborator, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Present (and `true`) when the report was saved even though the request failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
}

impl ApiError {
    /// Create a new API error with a message only
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: None,
            persisted: None,
        }
    }

    /// Create an API error with collaborator details
    pub fn with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: Some(details.into()),
            persisted: None,
        }
    }
}

/// Text of a panic payload, for error bodies and logs
pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked without a message".to_string()
    }
}
