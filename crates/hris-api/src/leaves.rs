//! Handlers for `/leaves` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/leaves` | Own requests, or everyone's for an admin |
//! | `POST` | `/leaves` | Body: [`LeaveApplication`]; returns 201 + request |
//! | `POST` | `/leaves/{id}/approve` | Admin only. Body (optional): `{"notes"?}` |
//! | `POST` | `/leaves/{id}/reject` | Admin only. Body (optional): `{"notes"?}` |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use hris_core::{
  leave::{Decision, LeaveApplication, LeaveRequest, LeaveRow},
  store::HrStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, JsonBody, PathParam},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewBody {
  pub notes: Option<String>,
}

/// `GET /leaves`
pub async fn list<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<Vec<LeaveRow>>, ApiError> {
  Ok(Json(state.hris.leaves().list(&actor).await?))
}

/// `POST /leaves`
pub async fn submit<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<LeaveApplication>,
) -> Result<impl IntoResponse, ApiError> {
  let request = state.hris.leaves().submit(&actor, body).await?;
  Ok((StatusCode::CREATED, Json(request)))
}

/// `POST /leaves/{id}/approve`
pub async fn approve<S: HrStore>(
  state: State<AppState<S>>,
  actor: Authenticated,
  id: PathParam<Uuid>,
  body: Option<JsonBody<ReviewBody>>,
) -> Result<Json<LeaveRequest>, ApiError> {
  review(state, actor, id, body, Decision::Approve).await
}

/// `POST /leaves/{id}/reject`
pub async fn reject<S: HrStore>(
  state: State<AppState<S>>,
  actor: Authenticated,
  id: PathParam<Uuid>,
  body: Option<JsonBody<ReviewBody>>,
) -> Result<Json<LeaveRequest>, ApiError> {
  review(state, actor, id, body, Decision::Reject).await
}

async fn review<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  PathParam(id): PathParam<Uuid>,
  body: Option<JsonBody<ReviewBody>>,
  decision: Decision,
) -> Result<Json<LeaveRequest>, ApiError> {
  let body = body.map(|JsonBody(b)| b).unwrap_or_default();
  let request = state.hris.leaves().review(&actor, id, decision, body.notes).await?;
  Ok(Json(request))
}
