//! HTTP error response handling for the intake routes
//!
//! Each route has its own fixed error messages, so the conversion from a
//! [`SubmissionError`] (or a body rejection) to a response needs to know which
//! route produced it. [`IntakeFailure`] carries that pairing.

use crate::error::{ApiError, SubmissionError, ToHttpStatus, panic_message};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;

/// Which intake route a failure belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intake {
    /// `POST /relato`
    Relato,
    /// `POST /enviar-email`
    LegacyEmail,
}

impl Intake {
    /// Route path, for logs
    pub fn path(self) -> &'static str {
        match self {
            Intake::Relato => "/relato",
            Intake::LegacyEmail => "/enviar-email",
        }
    }

    /// Body of a 400 response
    pub fn validation_message(self) -> &'static str {
        match self {
            Intake::Relato => "text, timestampISO e timestampDisplay são obrigatórios",
            Intake::LegacyEmail => "text e timestamp são obrigatórios",
        }
    }

    /// Body of a 500 response for the given failure
    pub fn failure_message(self, error: &SubmissionError) -> &'static str {
        match (self, error) {
            (Intake::Relato, SubmissionError::Persist(_)) => "Falha ao salvar no Supabase",
            (Intake::Relato, _) => "Falha ao processar relato",
            (Intake::LegacyEmail, _) => "Erro ao enviar email",
        }
    }
}

/// A failed intake request, ready to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeFailure {
    /// Response status
    pub status: StatusCode,
    /// Response body
    pub body: ApiError,
}

impl IntakeFailure {
    /// Render a pipeline failure for the given route
    pub fn from_submission(route: Intake, error: &SubmissionError) -> Self {
        let status =
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match error {
            SubmissionError::Validation { .. } => ApiError::new(route.validation_message()),
            other => {
                let mut body = ApiError::new(route.failure_message(other));
                body.details = other.detail();
                if other.report_persisted() {
                    body.persisted = Some(true);
                }
                body
            }
        };

        Self { status, body }
    }

    /// Render a JSON body rejection for the given route
    ///
    /// Unparseable or mistyped JSON is reported like a missing field. A missing
    /// content type (415) or an oversized body (413) keeps axum's own status.
    pub fn from_rejection(route: Intake, rejection: &JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => Self {
                status: StatusCode::BAD_REQUEST,
                body: ApiError::with_details(route.validation_message(), rejection.body_text()),
            },
            other => Self {
                status: other.status(),
                body: ApiError::new(other.body_text()),
            },
        }
    }

    /// Render a handler panic for the given route
    pub fn from_panic(route: Intake, panic: Box<dyn Any + Send + 'static>) -> Self {
        let message = panic_message(panic.as_ref());
        tracing::error!(route = route.path(), panic = %message, "intake handler panicked");

        Self::from_submission(route, &SubmissionError::Unexpected(message))
    }
}

impl IntoResponse for IntakeFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Panic handler for `POST /relato`
pub(crate) fn relato_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    IntakeFailure::from_panic(Intake::Relato, panic).into_response()
}

/// Panic handler for `POST /enviar-email`
pub(crate) fn legacy_email_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    IntakeFailure::from_panic(Intake::LegacyEmail, panic).into_response()
}
