//! Mail notification
//!
//! - [`message`] - RFC 5322 message composition and Gmail `raw` encoding
//! - [`gmail`] - [`GmailNotifier`], sending through the Gmail API
//! - [`oauth`] - consent URL, code exchange and refresh-token grant

use crate::error::MailError;
use crate::types::Notification;
use async_trait::async_trait;

pub mod gmail;
pub mod message;
pub mod oauth;

pub use gmail::GmailNotifier;

/// Sends one notification email per report
///
/// Recipient and subject are fixed by the implementation's configuration;
/// callers only supply the report text and its display timestamp.
#[async_trait]
pub trait MailNotifier: Send + Sync {
    /// Transmit one notification
    ///
    /// # Errors
    ///
    /// Returns a [`MailError`] if no access token can be obtained, the mail API
    /// refuses the message, or the request fails or times out.
    async fn send(&self, notification: &Notification) -> Result<(), MailError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
