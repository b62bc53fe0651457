//! # canal-denuncia
//!
//! Anonymous report intake service.
//!
//! A submitted report is appended to a durable store and, only once stored,
//! announced to a fixed recipient by email. A failed store means no email; a
//! failed email after a successful store is reported as such, so the caller
//! always knows whether the report was saved.
//!
//! ## Layout
//!
//! - [`pipeline`] - validation, ordering and outcome of a submission
//! - [`store`] - the [`ReportStore`] seam and its Supabase implementation
//! - [`mail`] - the [`MailNotifier`] seam, Gmail sending and the OAuth consent flow
//! - [`api`] - HTTP routes, CORS, security headers and the server lifecycle
//!
//! ## Quick Start
//!
//! ```no_run
//! use canal_denuncia::{Config, GmailNotifier, SubmissionPipeline, SupabaseStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!
//!     let pipeline = SubmissionPipeline::new(
//!         Arc::new(SupabaseStore::new(&config.store)?),
//!         Arc::new(GmailNotifier::new(config.mail.clone())?),
//!     );
//!
//!     canal_denuncia::api::start_api_server(Arc::new(pipeline), Arc::new(config)).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Mail notification
pub mod mail;
/// Submission pipeline
pub mod pipeline;
/// Report persistence
pub mod store;
/// Core types
pub mod types;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{Config, MailConfig, ServerConfig, StoreConfig};
pub use error::{
    ApiError, Error, MailError, Result, StoreError, SubmissionError, ToHttpStatus,
};
pub use mail::{GmailNotifier, MailNotifier};
pub use pipeline::{Outcome, SubmissionPipeline};
pub use store::{ReportStore, SupabaseStore};
pub use types::{LegacyEmailRequest, Notification, RelatoRequest, Report, SuccessResponse};

/// Wait for a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Used by [`api::start_api_server`] to drain in-flight requests before exiting.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

/// Wait for a termination signal (Ctrl+C).
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
