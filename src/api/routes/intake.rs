//! Intake handlers: primary report submission and the legacy email-only route.

use crate::api::AppState;
use crate::api::error_response::{Intake, IntakeFailure};
use crate::error::{ApiError, SubmissionError};
use crate::pipeline::Outcome;
use crate::types::{LegacyEmailRequest, RelatoRequest, SuccessResponse};
use axum::{Json, extract::State, extract::rejection::JsonRejection};

/// POST /relato - Submit a report
///
/// Stores the report, then emails it. A failed store means no email; a failed
/// email after a successful store is reported with `"persisted": true`.
#[utoipa::path(
    post,
    path = "/relato",
    tag = "intake",
    request_body = RelatoRequest,
    responses(
        (status = 200, description = "Report stored and notification sent", body = SuccessResponse),
        (status = 400, description = "A required field is missing or the body is not valid JSON", body = ApiError),
        (status = 413, description = "Body exceeds the configured limit", body = ApiError),
        (status = 415, description = "Body is not declared as JSON", body = ApiError),
        (status = 500, description = "Store, mail or unexpected failure", body = ApiError)
    )
)]
pub async fn submit_relato(
    State(state): State<AppState>,
    payload: Result<Json<RelatoRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, IntakeFailure> {
    let Json(request) = payload.map_err(|rejection| reject(Intake::Relato, &rejection))?;

    let result = state.pipeline.submit(request).await;
    finish(Intake::Relato, result)
}

/// POST /enviar-email - Email a report without storing it
///
/// Kept for clients that predate `/relato`.
#[utoipa::path(
    post,
    path = "/enviar-email",
    tag = "intake",
    request_body = LegacyEmailRequest,
    responses(
        (status = 200, description = "Notification sent", body = SuccessResponse),
        (status = 400, description = "A required field is missing or the body is not valid JSON", body = ApiError),
        (status = 413, description = "Body exceeds the configured limit", body = ApiError),
        (status = 415, description = "Body is not declared as JSON", body = ApiError),
        (status = 500, description = "Mail failure", body = ApiError)
    )
)]
pub async fn send_legacy_email(
    State(state): State<AppState>,
    payload: Result<Json<LegacyEmailRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, IntakeFailure> {
    let Json(request) = payload.map_err(|rejection| reject(Intake::LegacyEmail, &rejection))?;

    let result = state.pipeline.notify_only(request).await;
    finish(Intake::LegacyEmail, result)
}

fn reject(route: Intake, rejection: &JsonRejection) -> IntakeFailure {
    let failure = IntakeFailure::from_rejection(route, rejection);
    tracing::warn!(
        route = route.path(),
        status = failure.status.as_u16(),
        "request body rejected"
    );
    failure
}

fn finish(
    route: Intake,
    result: Result<(), SubmissionError>,
) -> Result<Json<SuccessResponse>, IntakeFailure> {
    let outcome = Outcome::of(&result);
    match result {
        Ok(()) => {
            tracing::info!(route = route.path(), %outcome, "submission handled");
            Ok(Json(SuccessResponse::OK))
        }
        Err(e) => {
            let failure = IntakeFailure::from_submission(route, &e);
            tracing::warn!(
                route = route.path(),
                %outcome,
                status = failure.status.as_u16(),
                error = %e,
                "submission failed"
            );
            Err(failure)
        }
    }
}
