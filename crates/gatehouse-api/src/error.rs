//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use gatehouse_core::ErrorClass;

/// An error returned by an API handler. The message is the stable, specific
/// reason the calling UI branches on; the variant picks the status code.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Unauthenticated(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Unavailable(String),

  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
      Self::Forbidden(_) => StatusCode::FORBIDDEN,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Wrap a storage failure on the read path.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(error = %e, "store error");
    Self::Internal("internal error".into())
  }
}

impl From<gatehouse_engine::Error> for ApiError {
  fn from(e: gatehouse_engine::Error) -> Self {
    let message = e.to_string();
    match e.class() {
      ErrorClass::Unauthenticated => Self::Unauthenticated(message),
      ErrorClass::Forbidden => Self::Forbidden(message),
      ErrorClass::NotFound => Self::NotFound(message),
      ErrorClass::Conflict => Self::Conflict(message),
      ErrorClass::InvalidInput => Self::BadRequest(message),
      ErrorClass::ServiceUnavailable => Self::Unavailable(message),
      ErrorClass::Internal => {
        tracing::error!(error = %e, "orchestrator internal error");
        Self::Internal("internal error".into())
      }
    }
  }
}

impl From<gatehouse_core::Error> for ApiError {
  fn from(e: gatehouse_core::Error) -> Self {
    ApiError::from(gatehouse_engine::Error::Domain(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
