//! Handlers for sign-up, the sign-in check and the dashboard.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/sign-up` | Public. Body: [`Registration`]; returns 201 + identity |
//! | `GET`  | `/me` | Own identity, profile and role |
//! | `GET`  | `/dashboard` | Counts and the recent-activity feed |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use hris_core::{
  dashboard::Dashboard,
  identity::Account,
  session::{AuthProvider, Registration},
  store::HrStore,
};

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, JsonBody},
};

/// `POST /auth/sign-up`
pub async fn sign_up<S: HrStore>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<Registration>,
) -> Result<impl IntoResponse, ApiError> {
  let registration = body.prepare()?;
  let identity = state.auth.sign_up(&registration).await?;
  Ok((StatusCode::CREATED, Json(identity)))
}

/// `GET /me`
pub async fn me<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<Account>, ApiError> {
  Ok(Json(state.hris.directory().account(&actor).await?))
}

/// `GET /dashboard`
pub async fn dashboard<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(_): Authenticated,
) -> Result<Json<Dashboard>, ApiError> {
  Ok(Json(state.hris.dashboard().summary().await?))
}
