//! RFC 7807 problem responses.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use crate::content::ContentError;
use crate::story::AccessError;

pub const CONTENT_TYPE: &str = "application/problem+json";

#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
}

impl ProblemDetails {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            problem_type: "about:blank",
            title: status.canonical_reason().unwrap_or("Error"),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, CONTENT_TYPE)], Json(self)).into_response()
    }
}

pub fn unauthorized(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::UNAUTHORIZED, detail)
}

pub fn forbidden(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::FORBIDDEN, detail)
}

pub fn not_found(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::NOT_FOUND, detail)
}

pub fn unprocessable(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
}

pub fn internal_error(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
}

pub fn bad_gateway(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::BAD_GATEWAY, detail)
}

pub fn service_unavailable(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::SERVICE_UNAVAILABLE, detail)
}

// ============================================================================
// Error mapping
// ============================================================================

/// Map a failed remote content call.
pub fn from_content_error(e: &ContentError) -> ProblemDetails {
    match e {
        e if e.is_unavailable() => {
            warn!(error = %e, "Content service unavailable");
            service_unavailable("the story service is waking up, try again shortly")
        }
        ContentError::Api { status: 404, .. } => not_found("not found on the story service"),
        ContentError::Api { status, message } if (400..500).contains(status) => {
            unprocessable(format!("story service rejected the request: {message}"))
        }
        other => {
            error!(error = %other, "Content request failed");
            bad_gateway("story service request failed")
        }
    }
}

/// Map a failed authoring permission check.
pub fn from_access_error(e: &AccessError) -> ProblemDetails {
    match e {
        AccessError::Unauthenticated => unauthorized(e.to_string()),
        AccessError::Forbidden { .. } => forbidden(e.to_string()),
        AccessError::Storage(inner) => {
            error!(error = %inner, "Ownership lookup failed");
            internal_error("failed to check story ownership")
        }
    }
}
