//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the intake API using
//! utoipa for compile-time spec generation. Served at `/openapi.json`.

use utoipa::OpenApi;

/// OpenAPI documentation for the canal-denuncia REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "canal-denuncia REST API",
        description = "Anonymous report intake: store each report, then notify by email",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    paths(
        // Intake
        crate::api::routes::submit_relato,
        crate::api::routes::send_legacy_email,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::RelatoRequest,
        crate::types::LegacyEmailRequest,
        crate::types::SuccessResponse,
        crate::error::ApiError,
    )),
    tags(
        (name = "intake", description = "Report submission"),
        (name = "system", description = "System endpoints - Health check and OpenAPI spec"),
    )
)]
pub struct ApiDoc;
