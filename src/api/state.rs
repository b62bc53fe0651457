//! Application state for the API server

use crate::pipeline::SubmissionPipeline;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// Validates, persists and notifies submissions
    pub pipeline: Arc<SubmissionPipeline>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(pipeline: Arc<SubmissionPipeline>) -> Self {
        Self { pipeline }
    }
}
