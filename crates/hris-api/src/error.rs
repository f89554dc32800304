//! API error type, its [`axum::response::IntoResponse`] implementation, and
//! the body/path/query extractors that reject through it.

use axum::{
  Json,
  extract::{
    FromRequest, FromRequestParts, OptionalFromRequest, Request,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use hris_core::{Error, ErrorKind};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
///
/// Every failure is a [`hris_core::Error`]; this wrapper only decides how it
/// looks on the wire.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match (self.0.kind(), &self.0) {
      (ErrorKind::Auth, _) => StatusCode::UNAUTHORIZED,
      (ErrorKind::Validation, Error::InvalidTransition { .. }) => StatusCode::CONFLICT,
      (ErrorKind::Validation, _) => StatusCode::BAD_REQUEST,
      (ErrorKind::Duplicate, _) => StatusCode::CONFLICT,
      (ErrorKind::Authorization, _) => StatusCode::FORBIDDEN,
      (ErrorKind::NotFound, _) => StatusCode::NOT_FOUND,
      (ErrorKind::Remote, Error::Timeout { .. }) => StatusCode::SERVICE_UNAVAILABLE,
      (ErrorKind::Remote, _) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self.0, "request failed");
    }

    let body = json!({ "error": self.0.user_message(), "kind": self.0.kind() });
    let mut res = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic realm=\"hris\""));
    }
    res
  }
}

// ─── Extractors ───────────────────────────────────────────────────────────────

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self(Error::Validation(rejection.body_text()))
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self(Error::Validation(rejection.body_text()))
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self(Error::Validation(rejection.body_text()))
  }
}

/// [`axum::Json`] with malformed bodies answered as a validation error.
///
/// As an `Option<JsonBody<T>>`, a request without a `Content-Type` header
/// yields `None` instead of a rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl<T, S> OptionalFromRequest<S> for JsonBody<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
    let json = <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
    Ok(json.map(|Json(value)| Self(value)))
  }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);
