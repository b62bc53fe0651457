//! Core types for canal-denuncia

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One submitted report, as appended to the store
///
/// Immutable once built. `created_at` is the client's ISO-8601 timestamp,
/// carried verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// The submitter's narrative, trimmed
    pub text: String,
    /// Client-provided creation instant (UTC, ISO-8601), never reformatted
    pub created_at: String,
}

impl Report {
    /// Build a report, trimming the narrative
    pub fn new(text: &str, created_at: impl Into<String>) -> Self {
        Self {
            text: text.trim().to_string(),
            created_at: created_at.into(),
        }
    }
}

/// What the mail notifier sends for one report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Narrative included in the email body
    pub text: String,
    /// Human-readable timestamp included in the email body
    pub display_timestamp: String,
}

impl Notification {
    /// Create a notification
    pub fn new(text: impl Into<String>, display_timestamp: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            display_timestamp: display_timestamp.into(),
        }
    }

    /// Plain-text email body
    pub fn body(&self) -> String {
        format!("Relato: {}\nData: {}", self.text, self.display_timestamp)
    }
}

/// Request body for POST /relato
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RelatoRequest {
    /// The report narrative
    #[serde(default)]
    pub text: Option<String>,

    /// Creation instant in ISO-8601 (UTC), stored verbatim
    #[serde(rename = "timestampISO", default)]
    pub timestamp_iso: Option<String>,

    /// Creation instant rendered for humans, used only in the email
    #[serde(rename = "timestampDisplay", default)]
    pub timestamp_display: Option<String>,
}

/// Request body for POST /enviar-email (legacy clients)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LegacyEmailRequest {
    /// The report narrative
    #[serde(default)]
    pub text: Option<String>,

    /// Timestamp shown in the email
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Success body shared by both intake routes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    /// Always `true`
    pub success: bool,
}

impl SuccessResponse {
    /// The `{"success": true}` body
    pub const OK: SuccessResponse = SuccessResponse { success: true };
}
