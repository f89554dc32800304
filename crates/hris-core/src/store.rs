//! The `HrStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `hris-store-sqlite`).
//! The engines in this crate depend on this abstraction, not on any concrete
//! backend. Durable schema and constraints belong to the backend; in
//! particular "one attendance record per identity per day" is enforced by the
//! store and reported through [`StoreFault::is_conflict`].

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  activity::{ActivityEntry, ActivityRow, NewActivity},
  attendance::{AttendanceRecord, AttendanceRow, NewAttendance},
  identity::{EmployeeEntry, Identity, NewIdentity, Profile, ProfileUpdate, Role, StoredCredentials},
  leave::{LeaveRequest, LeaveRow, LeaveStatus, NewLeave},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`HrStore::list_attendance`].
#[derive(Debug, Clone, Default)]
pub struct AttendanceQuery {
  /// Restrict to records owned by this identity.
  pub user_id: Option<Uuid>,
  /// Restrict to one calendar day.
  pub date:    Option<NaiveDate>,
  pub limit:   Option<usize>,
}

/// Parameters for [`HrStore::list_leaves`].
#[derive(Debug, Clone, Default)]
pub struct LeaveQuery {
  /// Restrict to requests owned by this identity.
  pub user_id: Option<Uuid>,
  pub status:  Option<LeaveStatus>,
}

/// The outcome stamped onto a pending leave request.
#[derive(Debug, Clone)]
pub struct LeaveReview {
  pub status:      LeaveStatus,
  pub reviewed_by: Uuid,
  pub reviewed_at: DateTime<Utc>,
  pub notes:       Option<String>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Classification a backend error must offer to the engines.
pub trait StoreFault: std::error::Error + Send + Sync + 'static {
  /// `true` when the failure is a uniqueness-constraint violation.
  fn is_conflict(&self) -> bool;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational data store behind the HRIS.
///
/// Attendance records and leave requests are never deleted. Their only
/// mutations are the conditional updates [`close_attendance`] and
/// [`review_leave`], which must be atomic with respect to their condition.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
///
/// [`close_attendance`]: HrStore::close_attendance
/// [`review_leave`]: HrStore::review_leave
pub trait HrStore: Send + Sync {
  type Error: StoreFault;

  // ── Identities ────────────────────────────────────────────────────────

  /// Create an identity and its profile together. Fails with a conflict if
  /// the email is already registered.
  fn create_identity(
    &self,
    input: NewIdentity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Look up the credentials registered for `email` (case-insensitive).
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<StoredCredentials>, Self::Error>> + Send + 'a;

  // ── Roles ─────────────────────────────────────────────────────────────

  /// The role assigned to `user_id`; [`Role::Member`] when no assignment
  /// exists.
  fn role_of(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Role, Self::Error>> + Send + '_;

  /// Grant or revoke the admin role.
  fn set_role(
    &self,
    user_id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// All profiles with their roles, ordered by name.
  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<EmployeeEntry>, Self::Error>> + Send + '_;

  /// Apply `update` and return the stored result, or `None` if the profile
  /// does not exist.
  fn update_profile(
    &self,
    user_id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  fn count_profiles(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Insert a fresh record. Fails with a conflict if one already exists for
  /// `(user_id, date)`.
  fn insert_attendance(
    &self,
    input: NewAttendance,
  ) -> impl Future<Output = Result<AttendanceRecord, Self::Error>> + Send + '_;

  /// Set `check_out` on the record for `(user_id, date)` if and only if it is
  /// still open. Returns `None` when no open record matched.
  fn close_attendance(
    &self,
    user_id: Uuid,
    date: NaiveDate,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<AttendanceRecord>, Self::Error>> + Send + '_;

  fn get_attendance(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<AttendanceRecord>, Self::Error>> + Send + '_;

  /// Records matching `query`, joined with the owner's name, date descending.
  /// Records sharing a date keep insertion order.
  fn list_attendance<'a>(
    &'a self,
    query: &'a AttendanceQuery,
  ) -> impl Future<Output = Result<Vec<AttendanceRow>, Self::Error>> + Send + 'a;

  fn count_attendance(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Leave ─────────────────────────────────────────────────────────────

  /// Persist a new request in [`LeaveStatus::Pending`].
  fn insert_leave(
    &self,
    input: NewLeave,
  ) -> impl Future<Output = Result<LeaveRequest, Self::Error>> + Send + '_;

  fn get_leave(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<LeaveRequest>, Self::Error>> + Send + '_;

  /// Stamp `review` onto request `id` if and only if it is still pending.
  /// Returns `None` when no pending request matched.
  fn review_leave(
    &self,
    id: Uuid,
    review: LeaveReview,
  ) -> impl Future<Output = Result<Option<LeaveRequest>, Self::Error>> + Send + '_;

  /// Requests matching `query`, joined with the owner's name, newest first.
  fn list_leaves<'a>(
    &'a self,
    query: &'a LeaveQuery,
  ) -> impl Future<Output = Result<Vec<LeaveRow>, Self::Error>> + Send + 'a;

  fn count_leaves(
    &self,
    status: Option<LeaveStatus>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Activity log ──────────────────────────────────────────────────────

  fn append_activity(
    &self,
    input: NewActivity,
  ) -> impl Future<Output = Result<ActivityEntry, Self::Error>> + Send + '_;

  /// The newest `limit` entries joined with the actor's name.
  fn recent_activity(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ActivityRow>, Self::Error>> + Send + '_;
}
