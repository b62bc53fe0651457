//! Supabase (PostgREST) report store

use super::ReportStore;
use crate::config::StoreConfig;
use crate::error::{Error, StoreError};
use crate::types::Report;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Appends reports through the Supabase REST interface
///
/// Authenticates with the service-role key so inserts succeed even when the
/// table's row-level security denies anonymous writes.
#[derive(Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    endpoint: Url,
    service_key: String,
    timeout: Duration,
}

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    details: Option<String>,
}

impl SupabaseStore {
    /// Create a store client for the configured project and table
    pub fn new(config: &StoreConfig) -> crate::Result<Self> {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a store client reusing an existing HTTP client
    pub fn with_client(client: reqwest::Client, config: &StoreConfig) -> crate::Result<Self> {
        let endpoint = table_endpoint(&config.url, &config.table)?;
        Ok(Self {
            client,
            endpoint,
            service_key: config.service_key.clone(),
            timeout: config.timeout,
        })
    }

    /// The REST endpoint rows are inserted into
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ReportStore for SupabaseStore {
    async fn append(&self, report: &Report) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=minimal")
            .json(&[report])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "report appended");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = rejection_message(status.as_u16(), &body);
        tracing::warn!(status = status.as_u16(), error = %message, "store rejected report");
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}

/// `{url}/rest/v1/{table}`, with the table name percent-encoded as a path segment
fn table_endpoint(base: &str, table: &str) -> crate::Result<Url> {
    let mut url = Url::parse(base.trim())
        .map_err(|e| Error::config("SUPABASE_URL", format!("invalid store URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| Error::config("SUPABASE_URL", "store URL cannot be a base"))?
        .pop_if_empty()
        .extend(["rest", "v1", table]);
    Ok(url)
}

fn rejection_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(PostgrestError {
            message: Some(message),
            ..
        }) => message,
        Ok(PostgrestError {
            details: Some(details),
            ..
        }) => details,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("HTTP {status}"),
    }
}
