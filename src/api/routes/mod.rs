//! Route handlers for the REST API
//!
//! - [`intake`] - report submission (`/relato`, `/enviar-email`)
//! - [`system`] - health and OpenAPI

mod intake;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use intake::*;
pub use system::*;
