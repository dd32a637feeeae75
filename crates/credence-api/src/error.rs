//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use credence_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Every variant renders as
/// `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Unauthenticated(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  /// A uniqueness collision. Rendered as 400, not 409.
  #[error("{0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// Hashing or token signing failed.
  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Map a backend error, surfacing any domain failure it carries.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.domain() {
      Some(domain) => Self::from_domain(domain),
      None => ApiError::Store(Box::new(e)),
    }
  }

  fn from_domain(e: &credence_core::Error) -> Self {
    use credence_core::Error as E;
    match e {
      E::UserNotFound(_) => ApiError::NotFound("User not found".into()),
      E::ClaimNotFound(_) => ApiError::NotFound("Claim not found".into()),
      E::EvidenceNotFound(_) => ApiError::NotFound("Evidence not found".into()),
      E::CommentNotFound(_) => ApiError::NotFound("Comment not found".into()),
      E::EmailTaken => ApiError::Conflict("Email already registered".into()),
      E::UsernameTaken => ApiError::Conflict("Username already taken".into()),
      E::ParentCommentMismatch { .. } => ApiError::Validation(
        "Parent comment belongs to a different claim".into(),
      ),
      E::UnknownStatus(_)
      | E::UnknownEvidenceType(_)
      | E::UnknownVoteType(_) => ApiError::Validation(e.to_string()),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::Validation(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::Validation(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(_: PathRejection) -> Self { ApiError::Validation("Invalid id".into()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Validation(m) | ApiError::Conflict(m) => {
        (StatusCode::BAD_REQUEST, m.clone())
      }
      ApiError::Unauthenticated(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Store(_) | ApiError::Internal(_) => {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}
