//! Handlers for `/employees` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/employees` | Optional `?search=` over name, email, department, position |
//! | `GET`   | `/employees/{id}` | 404 if not found |
//! | `PATCH` | `/employees/{id}` | Body: [`ProfileUpdate`]; owner or admin |

use axum::{Json, extract::State};
use hris_core::{
  identity::{EmployeeEntry, Profile, ProfileUpdate},
  store::HrStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, JsonBody, PathParam, QueryParams},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub search: Option<String>,
}

/// `GET /employees[?search=<text>]`
pub async fn list<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(_): Authenticated,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<EmployeeEntry>>, ApiError> {
  let entries = state.hris.directory().list_employees(params.search.as_deref()).await?;
  Ok(Json(entries))
}

/// `GET /employees/{id}`
pub async fn get_one<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(_): Authenticated,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Profile>, ApiError> {
  Ok(Json(state.hris.directory().get_profile(id).await?))
}

/// `PATCH /employees/{id}`
pub async fn update<S: HrStore>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError> {
  Ok(Json(state.hris.directory().update_profile(&actor, id, body).await?))
}
