//! Error types for `hris-core`.
//!
//! Every failure an operation can produce is a variant of [`Error`]. Callers
//! that only care about the broad category (to pick an HTTP status or decide
//! whether a retry makes sense) use [`Error::kind`].

use std::{fmt, time::Duration};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::leave::LeaveStatus;

#[derive(Debug, Error)]
pub enum Error {
  // ── Authentication ───────────────────────────────────────────────────

  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("not signed in")]
  NotSignedIn,

  // ── Validation ───────────────────────────────────────────────────────

  #[error("{0}")]
  Validation(String),

  #[error("{user_id} has not checked in on {date}")]
  NotCheckedIn { user_id: Uuid, date: NaiveDate },

  #[error("{user_id} has already checked out on {date}")]
  AlreadyCheckedOut { user_id: Uuid, date: NaiveDate },

  #[error("leave request {id} is already {from}")]
  InvalidTransition { id: Uuid, from: LeaveStatus },

  // ── Uniqueness conflicts ─────────────────────────────────────────────

  #[error("{user_id} has already checked in on {date}")]
  AlreadyCheckedIn { user_id: Uuid, date: NaiveDate },

  #[error("email {0} is already registered")]
  EmailTaken(String),

  #[error("uniqueness conflict: {0}")]
  Conflict(String),

  // ── Authorization ────────────────────────────────────────────────────

  #[error("{action} requires the admin role")]
  AdminRequired { action: &'static str },

  #[error("{action} is only allowed on your own records")]
  NotOwner { action: &'static str },

  // ── Lookup ───────────────────────────────────────────────────────────

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: Uuid },

  // ── Remote ───────────────────────────────────────────────────────────

  #[error("{op} timed out after {after:?}")]
  Timeout { op: &'static str, after: Duration },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  Auth,
  Validation,
  Duplicate,
  Authorization,
  NotFound,
  Remote,
}

impl ErrorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Auth => "auth",
      Self::Validation => "validation",
      Self::Duplicate => "duplicate",
      Self::Authorization => "authorization",
      Self::NotFound => "not_found",
      Self::Remote => "remote",
    }
  }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::InvalidCredentials | Self::NotSignedIn => ErrorKind::Auth,
      Self::Validation(_)
      | Self::NotCheckedIn { .. }
      | Self::AlreadyCheckedOut { .. }
      | Self::InvalidTransition { .. } => ErrorKind::Validation,
      Self::AlreadyCheckedIn { .. } | Self::EmailTaken(_) | Self::Conflict(_) => {
        ErrorKind::Duplicate
      }
      Self::AdminRequired { .. } | Self::NotOwner { .. } => ErrorKind::Authorization,
      Self::NotFound { .. } => ErrorKind::NotFound,
      Self::Timeout { .. } | Self::Store(_) => ErrorKind::Remote,
    }
  }

  /// Text suitable for a non-fatal notification shown to the person who
  /// triggered the operation.
  pub fn user_message(&self) -> String {
    match self {
      Self::InvalidCredentials => "Invalid email or password".into(),
      Self::NotSignedIn => "Please sign in first".into(),
      Self::Validation(msg) => msg.clone(),
      Self::NotCheckedIn { .. } => "You have not checked in today".into(),
      Self::AlreadyCheckedOut { .. } => "You have already checked out today".into(),
      Self::InvalidTransition { from, .. } => {
        format!("This leave request has already been {from}")
      }
      Self::AlreadyCheckedIn { .. } => "You have already checked in today".into(),
      Self::EmailTaken(_) => "An account with this email already exists".into(),
      Self::Conflict(_) => "That record already exists".into(),
      Self::AdminRequired { .. } => "Only administrators can do that".into(),
      Self::NotOwner { .. } => "You can only change your own records".into(),
      Self::NotFound { entity, .. } => format!("The {entity} could not be found"),
      Self::Timeout { .. } => "The server took too long to respond, please try again".into(),
      Self::Store(_) => "Something went wrong, please try again".into(),
    }
  }
}

/// Surfaces the first message of a failed `validator` check, ordered by field
/// name so the result is stable.
impl From<validator::ValidationErrors> for Error {
  fn from(errors: validator::ValidationErrors) -> Self {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let message = fields
      .into_iter()
      .flat_map(|(field, list)| {
        list.iter().map(move |e| {
          e.message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("invalid {field}"))
        })
      })
      .next()
      .unwrap_or_else(|| "invalid input".to_owned());

    Error::Validation(message)
  }
}
