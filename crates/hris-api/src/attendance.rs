//! Handlers for `/attendance` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/attendance` | Own history, or everyone's for an admin |
//! | `GET`  | `/attendance/today` | Caller's own standing |
//! | `POST` | `/attendance/check-in` | Body (optional): `{"user_id"?}`; defaults to the caller |
//! | `POST` | `/attendance/check-out` | Body (optional): `{"user_id"?}`; defaults to the caller |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use hris_core::{
  attendance::{AttendanceRecord, AttendanceRow, TodayStatus},
  identity::Identity,
  store::HrStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, JsonBody},
};

/// Body of the marking endpoints. An empty object, or no body at all, marks
/// the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MarkBody {
  pub user_id: Option<Uuid>,
}

fn mark_target(body: Option<JsonBody<MarkBody>>, actor: &Identity) -> Uuid {
  body.and_then(|JsonBody(b)| b.user_id).unwrap_or(actor.id)
}

/// `GET /attendance`
pub async fn list<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<Vec<AttendanceRow>>, ApiError> {
  Ok(Json(state.hris.attendance().list_attendance(&actor).await?))
}

/// `GET /attendance/today`
pub async fn today<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<TodayStatus>, ApiError> {
  Ok(Json(state.hris.attendance().today_status(&actor).await?))
}

/// `POST /attendance/check-in` — returns 201 + the opened record.
pub async fn check_in<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  body: Option<JsonBody<MarkBody>>,
) -> Result<impl IntoResponse, ApiError> {
  let target = mark_target(body, &actor);
  let record = state.hris.attendance().check_in(&actor, target).await?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /attendance/check-out`
pub async fn check_out<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  body: Option<JsonBody<MarkBody>>,
) -> Result<Json<AttendanceRecord>, ApiError> {
  let target = mark_target(body, &actor);
  Ok(Json(state.hris.attendance().check_out(&actor, target).await?))
}
