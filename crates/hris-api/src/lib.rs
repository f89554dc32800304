//! JSON REST API for the HRIS.
//!
//! Exposes an axum [`Router`] backed by any [`hris_core::store::HrStore`].
//! Every route except sign-up authenticates with HTTP Basic auth
//! (`email:password`). TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = hris_api::AppState::new(Arc::new(hris));
//! axum::serve(listener, hris_api::api_router(state)).await?;
//! ```

pub mod account;
pub mod attendance;
pub mod auth;
pub mod employees;
pub mod error;
pub mod leaves;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use hris_core::{Hris, store::HrStore};
use tower_http::trace::TraceLayer;

pub use auth::{Authenticated, StoreAuth};
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub hris: Arc<Hris<S>>,
  pub auth: Arc<StoreAuth<S>>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { hris: Arc::clone(&self.hris), auth: Arc::clone(&self.auth) }
  }
}

impl<S: HrStore> AppState<S> {
  pub fn new(hris: Arc<Hris<S>>) -> Self {
    let auth = Arc::new(StoreAuth::new(Arc::clone(&hris)));
    Self { hris, auth }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: HrStore + 'static,
{
  Router::new()
    // Session
    .route("/auth/sign-up", post(account::sign_up::<S>))
    .route("/me", get(account::me::<S>))
    .route("/dashboard", get(account::dashboard::<S>))
    // Attendance
    .route("/attendance", get(attendance::list::<S>))
    .route("/attendance/today", get(attendance::today::<S>))
    .route("/attendance/check-in", post(attendance::check_in::<S>))
    .route("/attendance/check-out", post(attendance::check_out::<S>))
    // Leave
    .route("/leaves", get(leaves::list::<S>).post(leaves::submit::<S>))
    .route("/leaves/{id}/approve", post(leaves::approve::<S>))
    .route("/leaves/{id}/reject", post(leaves::reject::<S>))
    // Directory
    .route("/employees", get(employees::list::<S>))
    .route("/employees/{id}", get(employees::get_one::<S>).patch(employees::update::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
