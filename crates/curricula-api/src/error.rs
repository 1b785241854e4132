//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use curricula_service::ServiceError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Service(#[from] ServiceError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    use curricula_core::Error as Engine;

    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Service(ServiceError::Engine(e)) => match e {
        Engine::Validation(_) => StatusCode::BAD_REQUEST,
        Engine::DuplicateCode(_) => StatusCode::CONFLICT,
        Engine::SubjectNotFound(_) | Engine::SemesterNotFound(_) => StatusCode::NOT_FOUND,
        Engine::InvariantViolation(_) | Engine::Serialization(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
      ApiError::Service(ServiceError::PreconditionFailed(_)) => StatusCode::PRECONDITION_FAILED,
      ApiError::Service(ServiceError::Sync { .. }) => StatusCode::BAD_GATEWAY,
      ApiError::Service(ServiceError::Store { .. } | ServiceError::Json(_)) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
