//! REST API server module
//!
//! Serves the two intake routes plus health and OpenAPI endpoints, with CORS,
//! a body size ceiling, security response headers and panic containment.

use crate::pipeline::SubmissionPipeline;
use crate::{Config, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod security;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Intake
/// - `POST /relato` - Store a report, then email it
/// - `POST /enviar-email` - Email a report without storing it (legacy clients)
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
pub fn create_router(pipeline: Arc<SubmissionPipeline>, config: Arc<Config>) -> Router {
    let state = AppState::new(pipeline);

    let router = Router::new()
        // Intake; a panic inside either handler becomes that route's 500 body
        .route(
            "/relato",
            post(routes::submit_relato)
                .layer(CatchPanicLayer::custom(error_response::relato_panic)),
        )
        .route(
            "/enviar-email",
            post(routes::send_legacy_email)
                .layer(CatchPanicLayer::custom(error_response::legacy_email_panic)),
        )
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .with_state(state);

    // Middleware layer ordering: In Axum's onion model, the LAST layer applied
    // is the OUTERMOST (runs first on requests). We want:
    //   Request → Strip forwarding headers → Security headers → Trace → CORS → Body limit → Handler
    let router = router
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(build_cors_layer(&config.server.cors_origins))
        .layer(TraceLayer::new_for_http());

    security::with_security_headers(router)
        .layer(middleware::from_fn(security::strip_forwarding_headers))
}

/// Build a CORS layer based on configured origins
///
/// `"*"` anywhere in the list, or an empty list, allows any origin. Only
/// `POST` and `OPTIONS` are allowed and credentials are never sent.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allow_any || origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        cors.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until SIGTERM or SIGINT (Ctrl+C on non-unix platforms), then lets
/// in-flight requests finish before returning.
///
/// # Example
///
/// ```no_run
/// use canal_denuncia::{Config, SubmissionPipeline, GmailNotifier, SupabaseStore};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::from_env()?;
/// config.validate()?;
/// let pipeline = SubmissionPipeline::new(
///     Arc::new(SupabaseStore::new(&config.store)?),
///     Arc::new(GmailNotifier::new(config.mail.clone())?),
/// );
///
/// // Start API server (blocks until shutdown)
/// canal_denuncia::api::start_api_server(Arc::new(pipeline), Arc::new(config)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(
    pipeline: Arc<SubmissionPipeline>,
    config: Arc<Config>,
) -> Result<()> {
    let bind_address = config.server.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    serve(listener, pipeline, config, crate::wait_for_signal()).await
}

/// Serve the API on an already-bound listener until `shutdown` completes
pub async fn serve<F>(
    listener: TcpListener,
    pipeline: Arc<SubmissionPipeline>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(pipeline, config);

    tracing::info!(
        address = %listener.local_addr().map_err(crate::error::Error::Io)?,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
