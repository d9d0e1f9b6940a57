// Error mapping between the registration domain and HTTP responses
//
// Business-rule violations arrive as typed RegistryError variants and map
// to their status codes here. Anything unanticipated becomes a uniform 500
// with a generic body; the detail is logged server-side only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use turnout_core::RegistryError;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range input, carries field-level detail
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),

    /// Business-rule rejection
    #[error("{0}")]
    BadRequest(&'static str),

    /// Missing event or registration
    #[error("{0}")]
    NotFound(&'static str),

    /// Store failure or unexpected error; detail never crosses the boundary
    #[error("internal error")]
    Internal(String),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::EventNotFound(_) => ApiError::NotFound("Event not found"),
            RegistryError::EventExpired(_) => {
                ApiError::BadRequest("Cannot register for past events")
            }
            RegistryError::AlreadyRegistered { .. } => {
                ApiError::BadRequest("User already registered")
            }
            RegistryError::EventFull(_) => ApiError::BadRequest("Event is full"),
            RegistryError::NotRegistered { .. } => {
                ApiError::NotFound("User not registered for this event")
            }
            RegistryError::Store(_) | RegistryError::Internal(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Something went wrong. Please try again later."
                    })),
                )
                    .into_response()
            }
        }
    }
}
