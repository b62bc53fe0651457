//! Submission pipeline
//!
//! A primary submission runs three steps in a fixed order:
//!
//! 1. **Validate** the payload ([`Submission::try_from`]); nothing is called on failure.
//! 2. **Persist** the report through the [`ReportStore`]. A failure stops here,
//!    so no email ever announces a report that was not saved.
//! 3. **Notify** through the [`MailNotifier`]. A failure here leaves the report
//!    saved, and the error says so.
//!
//! There is no retry and no deduplication: submitting the same payload twice
//! stores two reports and sends two emails.
//!
//! The legacy `/enviar-email` behavior is kept apart as [`SubmissionPipeline::notify_only`],
//! which never touches the store.

use crate::error::{MailError, SubmissionError, panic_message};
use crate::mail::MailNotifier;
use crate::store::ReportStore;
use crate::types::{LegacyEmailRequest, Notification, RelatoRequest};
use std::sync::Arc;

mod validation;

pub use validation::Submission;

/// Terminal state of a submission, as seen from the store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Stored and notified
    Success,
    /// Stored, but the notification was not delivered
    PersistedNotNotified,
    /// Nothing was stored (validation, store or legacy notify failure)
    NotPersisted,
}

impl Outcome {
    /// Classify a pipeline result
    pub fn of<T>(result: &Result<T, SubmissionError>) -> Self {
        match result {
            Ok(_) => Outcome::Success,
            Err(e) if e.report_persisted() => Outcome::PersistedNotNotified,
            Err(_) => Outcome::NotPersisted,
        }
    }

    /// Short label for structured logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::PersistedNotNotified => "persisted_not_notified",
            Outcome::NotPersisted => "not_persisted",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates, persists and notifies one report at a time
///
/// Cheap to share: the collaborators are behind `Arc` and the pipeline keeps
/// no per-submission state.
#[derive(Clone)]
pub struct SubmissionPipeline {
    store: Arc<dyn ReportStore>,
    notifier: Arc<dyn MailNotifier>,
}

impl SubmissionPipeline {
    /// Create a pipeline over the given collaborators
    pub fn new(store: Arc<dyn ReportStore>, notifier: Arc<dyn MailNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Run a primary-route submission
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::Validation`] - a required field is missing; no side effects
    /// - [`SubmissionError::Persist`] - the store append failed; no email was sent
    /// - [`SubmissionError::Notify`] with `persisted: true` - stored, email failed
    pub async fn submit(&self, request: RelatoRequest) -> Result<(), SubmissionError> {
        let submission = Submission::try_from(request)?;
        let text_len = submission.report.text.chars().count();

        if let Err(e) = self.store.append(&submission.report).await {
            tracing::error!(
                store = self.store.name(),
                error = %e,
                text_len,
                "failed to persist report, notification skipped"
            );
            return Err(SubmissionError::Persist(e));
        }
        tracing::info!(store = self.store.name(), text_len, "report persisted");

        if let Err(e) = self.notify(submission.notification).await {
            tracing::error!(
                notifier = self.notifier.name(),
                error = %e,
                "report persisted but notification failed"
            );
            return Err(SubmissionError::Notify {
                source: e,
                persisted: true,
            });
        }
        tracing::info!(notifier = self.notifier.name(), "notification sent");

        Ok(())
    }

    /// Run a legacy-route submission: email only, nothing is stored
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::Validation`] - `text` or `timestamp` missing
    /// - [`SubmissionError::Notify`] with `persisted: false` - the email failed
    pub async fn notify_only(&self, request: LegacyEmailRequest) -> Result<(), SubmissionError> {
        let notification = Notification::try_from(request)?;

        self.notify(notification).await.map_err(|e| {
            tracing::error!(
                notifier = self.notifier.name(),
                error = %e,
                "legacy notification failed"
            );
            SubmissionError::Notify {
                source: e,
                persisted: false,
            }
        })?;
        tracing::info!(notifier = self.notifier.name(), "legacy notification sent");

        Ok(())
    }

    /// Send on a separate task; a panic in the notifier becomes
    /// [`MailError::Panicked`].
    async fn notify(&self, notification: Notification) -> Result<(), MailError> {
        let notifier = Arc::clone(&self.notifier);
        let task = tokio::spawn(async move { notifier.send(&notification).await });

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(MailError::Panicked(panic_message(
                e.into_panic().as_ref(),
            ))),
            Err(e) => Err(MailError::Panicked(e.to_string())),
        }
    }
}
