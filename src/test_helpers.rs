//! Shared test doubles for the store and mail collaborators.

use crate::error::{MailError, StoreError};
use crate::mail::MailNotifier;
use crate::pipeline::SubmissionPipeline;
use crate::store::ReportStore;
use crate::types::{Notification, Report};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// One collaborator invocation, in the order it happened
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Append(Report),
    Send(Notification),
}

/// Call log shared by a store and notifier pair
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    fn record(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn appends(&self) -> Vec<Report> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Append(r) => Some(r),
                Call::Send(_) => None,
            })
            .collect()
    }

    pub(crate) fn sends(&self) -> Vec<Notification> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send(n) => Some(n),
                Call::Append(_) => None,
            })
            .collect()
    }
}

pub(crate) struct RecordingStore {
    journal: Journal,
    failure: Option<StoreError>,
}

#[async_trait]
impl ReportStore for RecordingStore {
    async fn append(&self, report: &Report) -> Result<(), StoreError> {
        self.journal.record(Call::Append(report.clone()));
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub(crate) struct RecordingNotifier {
    journal: Journal,
    failure: Option<MailError>,
}

#[async_trait]
impl MailNotifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), MailError> {
        self.journal.record(Call::Send(notification.clone()));
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Store whose append panics, for exercising the panic boundary
pub(crate) struct PanickingStore;

#[async_trait]
impl ReportStore for PanickingStore {
    async fn append(&self, _report: &Report) -> Result<(), StoreError> {
        panic!("store client exploded")
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Notifier whose send panics, for exercising failures after a stored report
pub(crate) struct PanickingNotifier;

#[async_trait]
impl MailNotifier for PanickingNotifier {
    async fn send(&self, _notification: &Notification) -> Result<(), MailError> {
        panic!("notifier exploded")
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Pipeline over recording fakes; `None` means the collaborator succeeds.
pub(crate) fn recording_pipeline(
    store_failure: Option<StoreError>,
    mail_failure: Option<MailError>,
) -> (SubmissionPipeline, Journal) {
    let journal = Journal::default();
    let store = RecordingStore {
        journal: journal.clone(),
        failure: store_failure,
    };
    let notifier = RecordingNotifier {
        journal: journal.clone(),
        failure: mail_failure,
    };
    (
        SubmissionPipeline::new(Arc::new(store), Arc::new(notifier)),
        journal,
    )
}

/// Pipeline whose store panics on append
pub(crate) fn panicking_pipeline() -> (SubmissionPipeline, Journal) {
    let journal = Journal::default();
    let notifier = RecordingNotifier {
        journal: journal.clone(),
        failure: None,
    };
    (
        SubmissionPipeline::new(Arc::new(PanickingStore), Arc::new(notifier)),
        journal,
    )
}

/// Pipeline whose store records appends and whose notifier panics
pub(crate) fn panicking_notifier_pipeline() -> (SubmissionPipeline, Journal) {
    let journal = Journal::default();
    let store = RecordingStore {
        journal: journal.clone(),
        failure: None,
    };
    (
        SubmissionPipeline::new(Arc::new(store), Arc::new(PanickingNotifier)),
        journal,
    )
}
