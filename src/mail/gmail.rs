//! Gmail API notifier

use super::{MailNotifier, message, oauth};
use crate::config::MailConfig;
use crate::error::{Error, MailError};
use crate::types::Notification;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Access tokens are refreshed this long before Google says they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Used when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Sends notifications through `users.messages.send`
///
/// Holds the refresh credential and caches the short-lived access token it
/// yields; the cache is the only state shared between concurrent sends.
pub struct GmailNotifier {
    client: reqwest::Client,
    config: MailConfig,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
}

impl GmailNotifier {
    /// Create a notifier from mail configuration
    pub fn new(config: MailConfig) -> crate::Result<Self> {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a notifier reusing an existing HTTP client
    pub fn with_client(client: reqwest::Client, config: MailConfig) -> crate::Result<Self> {
        if config.recipient.trim().is_empty() {
            return Err(Error::config("MAIL_RECIPIENT", "MAIL_RECIPIENT is required"));
        }
        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/gmail/v1/users/me/messages/send",
            self.config.api_base.trim_end_matches('/')
        )
    }

    async fn access_token(&self) -> Result<String, MailError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.value.clone());
        }

        let fresh = oauth::refresh_access_token(&self.client, &self.config).await?;
        let lifetime = fresh
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        tracing::debug!(lifetime_secs = lifetime.as_secs(), "mail access token refreshed");

        *cached = Some(CachedToken {
            value: fresh.access_token.clone(),
            expires_at: token_deadline(Instant::now(), lifetime),
        });
        Ok(fresh.access_token)
    }
}

/// When a token with the given lifetime must be refreshed
///
/// A lifetime too large to represent falls back to [`DEFAULT_TOKEN_LIFETIME`].
fn token_deadline(now: Instant, lifetime: Duration) -> Instant {
    now.checked_add(lifetime.saturating_sub(EXPIRY_MARGIN))
        .unwrap_or_else(|| now + DEFAULT_TOKEN_LIFETIME.saturating_sub(EXPIRY_MARGIN))
}

#[async_trait]
impl MailNotifier for GmailNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), MailError> {
        let access_token = self.access_token().await?;
        let raw = message::encode_raw(&message::compose(
            &self.config.recipient,
            &self.config.subject,
            notification,
        ));
        let timeout = self.config.timeout;

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "raw": raw }))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| MailError::from_reqwest(e, timeout))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "notification sent");
            return Ok(());
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Revoked or expired early; next send refreshes.
            self.token.lock().await.take();
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<GoogleErrorBody>(&body) {
            Ok(parsed) => parsed.error.message,
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => format!("HTTP {}", status.as_u16()),
        };
        tracing::warn!(status = status.as_u16(), error = %message, "mail API rejected notification");
        Err(MailError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn name(&self) -> &'static str {
        "gmail"
    }
}
