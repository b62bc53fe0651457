//! Payload validation
//!
//! Presence checks only; timestamps are never parsed.

use crate::error::SubmissionError;
use crate::types::{LegacyEmailRequest, Notification, RelatoRequest, Report};

/// A primary-route payload that passed validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// What gets appended to the store
    pub report: Report,
    /// What gets emailed once the report is stored
    pub notification: Notification,
}

impl TryFrom<RelatoRequest> for Submission {
    type Error = SubmissionError;

    fn try_from(request: RelatoRequest) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let text = require(request.text, "text", &mut missing);
        let created_at = require(request.timestamp_iso, "timestampISO", &mut missing);
        let display = require(request.timestamp_display, "timestampDisplay", &mut missing);

        match (text, created_at, display) {
            (Some(text), Some(created_at), Some(display)) => {
                let report = Report::new(&text, created_at);
                let notification = Notification::new(report.text.clone(), display);
                Ok(Submission {
                    report,
                    notification,
                })
            }
            _ => Err(SubmissionError::Validation { missing }),
        }
    }
}

impl TryFrom<LegacyEmailRequest> for Notification {
    type Error = SubmissionError;

    /// Legacy fields are forwarded untouched; only empty values are rejected.
    fn try_from(request: LegacyEmailRequest) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let text = request.text.filter(|t| !t.is_empty());
        if text.is_none() {
            missing.push("text");
        }
        let timestamp = request.timestamp.filter(|t| !t.is_empty());
        if timestamp.is_none() {
            missing.push("timestamp");
        }

        match (text, timestamp) {
            (Some(text), Some(timestamp)) => Ok(Notification::new(text, timestamp)),
            _ => Err(SubmissionError::Validation { missing }),
        }
    }
}

/// Blank (whitespace-only) values count as missing
fn require(
    value: Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            missing.push(field);
            None
        }
    }
}
