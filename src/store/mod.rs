//! Report persistence
//!
//! The pipeline only ever appends; there is no read, update or delete path.

use crate::error::StoreError;
use crate::types::Report;
use async_trait::async_trait;

mod supabase;

pub use supabase::SupabaseStore;

/// Append-only sink for reports
///
/// # Examples
///
/// ```no_run
/// use canal_denuncia::config::StoreConfig;
/// use canal_denuncia::store::{ReportStore, SupabaseStore};
/// use canal_denuncia::types::Report;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SupabaseStore::new(&StoreConfig {
///     url: "https://project.supabase.co".into(),
///     service_key: "service-role-key".into(),
///     ..Default::default()
/// })?;
///
/// store.append(&Report::new("relato", "2024-01-15T10:00:00Z")).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Durably append one report
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store refuses the record, cannot be
    /// reached, or does not answer within the configured timeout.
    async fn append(&self, report: &Report) -> Result<(), StoreError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
