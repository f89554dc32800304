//! Leave requests and the approval workflow.
//!
//! ```text
//!          ┌──approve──▶ Approved
//! Pending ─┤
//!          └──reject───▶ Rejected
//! ```
//!
//! Both outcomes are terminal. Only an admin may review, and only a pending
//! request can be reviewed.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Hris, Result,
  activity::ActivityAction,
  identity::Identity,
  store::{HrStore, LeaveQuery, LeaveReview},
};

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
  Sick,
  Vacation,
  Personal,
  Other,
}

impl LeaveType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Sick => "sick",
      Self::Vacation => "vacation",
      Self::Personal => "personal",
      Self::Other => "other",
    }
  }
}

impl fmt::Display for LeaveType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for LeaveType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "sick" => Ok(Self::Sick),
      "vacation" => Ok(Self::Vacation),
      "personal" => Ok(Self::Personal),
      "other" => Ok(Self::Other),
      other => Err(Error::Validation(format!("unknown leave type: {other:?}"))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
  Pending,
  Approved,
  Rejected,
}

impl LeaveStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }

  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }

  /// The status reached by applying `decision`, or `None` if this status is
  /// terminal.
  pub fn apply(self, decision: Decision) -> Option<LeaveStatus> {
    match self {
      Self::Pending => Some(decision.outcome()),
      Self::Approved | Self::Rejected => None,
    }
  }
}

impl fmt::Display for LeaveStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// An admin's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Approve,
  Reject,
}

impl Decision {
  pub fn outcome(self) -> LeaveStatus {
    match self {
      Self::Approve => LeaveStatus::Approved,
      Self::Reject => LeaveStatus::Rejected,
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
  pub id:           Uuid,
  pub user_id:      Uuid,
  #[serde(rename = "type")]
  pub leave_type:   LeaveType,
  pub start_date:   NaiveDate,
  pub end_date:     NaiveDate,
  pub reason:       String,
  pub status:       LeaveStatus,
  pub reviewed_by:  Option<Uuid>,
  pub reviewed_at:  Option<DateTime<Utc>>,
  pub review_notes: Option<String>,
  pub created_at:   DateTime<Utc>,
}

impl LeaveRequest {
  /// Number of calendar days covered, both ends inclusive.
  pub fn days(&self) -> i64 { (self.end_date - self.start_date).num_days() + 1 }
}

/// A request joined with its owner's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRow {
  #[serde(flatten)]
  pub request:       LeaveRequest,
  pub employee_name: String,
}

/// What an employee fills in to ask for leave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApplication {
  #[serde(rename = "type")]
  pub leave_type: LeaveType,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  pub reason:     String,
}

impl LeaveApplication {
  /// Reject malformed input before anything reaches the store.
  pub fn check(&self) -> Result<()> {
    if self.start_date > self.end_date {
      return Err(Error::Validation("End date cannot be before start date".into()));
    }
    if self.reason.trim().is_empty() {
      return Err(Error::Validation("A reason is required".into()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone)]
pub struct NewLeave {
  pub user_id:     Uuid,
  pub application: LeaveApplication,
  pub created_at:  DateTime<Utc>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct LeaveWorkflow<'a, S> {
  hris: &'a Hris<S>,
}

impl<'a, S: HrStore> LeaveWorkflow<'a, S> {
  pub(crate) fn new(hris: &'a Hris<S>) -> Self { Self { hris } }

  /// File a new request for `owner`, starting in [`LeaveStatus::Pending`].
  pub async fn submit(&self, owner: &Identity, application: LeaveApplication) -> Result<LeaveRequest> {
    application.check()?;

    let application = LeaveApplication {
      reason: application.reason.trim().to_owned(),
      ..application
    };
    let description = format!(
      "Requested {} leave {} to {}",
      application.leave_type, application.start_date, application.end_date
    );
    let input = NewLeave {
      user_id: owner.id,
      application,
      created_at: self.hris.clock.now(),
    };

    let request = self
      .hris
      .call("insert_leave", self.hris.store.insert_leave(input))
      .await?;

    info!(owner = %owner.id, leave = %request.id, "leave requested");
    self.hris.log_activity(owner.id, ActivityAction::Leave, description).await;
    Ok(request)
  }

  pub async fn approve(&self, actor: &Identity, id: Uuid, notes: Option<String>) -> Result<LeaveRequest> {
    self.review(actor, id, Decision::Approve, notes).await
  }

  pub async fn reject(&self, actor: &Identity, id: Uuid, notes: Option<String>) -> Result<LeaveRequest> {
    self.review(actor, id, Decision::Reject, notes).await
  }

  /// Apply `decision` to a pending request.
  pub async fn review(
    &self,
    actor: &Identity,
    id: Uuid,
    decision: Decision,
    notes: Option<String>,
  ) -> Result<LeaveRequest> {
    let action = match decision {
      Decision::Approve => "approving leave",
      Decision::Reject => "rejecting leave",
    };
    self.hris.require_admin(actor, action).await?;

    let current = self
      .hris
      .call("get_leave", self.hris.store.get_leave(id))
      .await?
      .ok_or(Error::NotFound { entity: "leave request", id })?;

    let Some(status) = current.status.apply(decision) else {
      warn!(actor = %actor.id, leave = %id, from = %current.status, "review of terminal request refused");
      return Err(Error::InvalidTransition { id, from: current.status });
    };

    let review = LeaveReview {
      status,
      reviewed_by: actor.id,
      reviewed_at: self.hris.clock.now(),
      notes: notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
    };

    let reviewed = match self
      .hris
      .call("review_leave", self.hris.store.review_leave(id, review))
      .await?
    {
      Some(request) => request,
      // Another reviewer won between the read and the conditional update.
      None => {
        let from = self
          .hris
          .call("get_leave", self.hris.store.get_leave(id))
          .await?
          .map_or(status, |r| r.status);
        return Err(Error::InvalidTransition { id, from });
      }
    };

    info!(actor = %actor.id, leave = %id, status = %reviewed.status, "leave reviewed");
    let description = match decision {
      Decision::Approve => "Approved leave request",
      Decision::Reject => "Rejected leave request",
    };
    self.hris.log_activity(actor.id, ActivityAction::Leave, description).await;
    Ok(reviewed)
  }

  /// Requests visible to `actor`: all of them for an admin, only their own
  /// otherwise. Newest first.
  pub async fn list(&self, actor: &Identity) -> Result<Vec<LeaveRow>> {
    let admin = self.hris.role_of(actor).await?.is_admin();
    let query = LeaveQuery { user_id: (!admin).then_some(actor.id), status: None };
    self.hris.call("list_leaves", self.hris.store.list_leaves(&query)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  fn application(start: NaiveDate, end: NaiveDate, reason: &str) -> LeaveApplication {
    LeaveApplication {
      leave_type: LeaveType::Vacation,
      start_date: start,
      end_date: end,
      reason: reason.into(),
    }
  }

  #[test]
  fn only_pending_can_transition() {
    assert_eq!(LeaveStatus::Pending.apply(Decision::Approve), Some(LeaveStatus::Approved));
    assert_eq!(LeaveStatus::Pending.apply(Decision::Reject), Some(LeaveStatus::Rejected));
    assert_eq!(LeaveStatus::Approved.apply(Decision::Reject), None);
    assert_eq!(LeaveStatus::Rejected.apply(Decision::Approve), None);
    assert_eq!(LeaveStatus::Approved.apply(Decision::Approve), None);
  }

  #[test]
  fn inverted_range_is_rejected() {
    let app = application(date(2024, 6, 5), date(2024, 6, 1), "beach");
    assert!(matches!(app.check(), Err(Error::Validation(_))));
  }

  #[test]
  fn single_day_range_is_fine() {
    let app = application(date(2024, 6, 1), date(2024, 6, 1), "dentist");
    assert!(app.check().is_ok());
  }

  #[test]
  fn blank_reason_is_rejected() {
    let app = application(date(2024, 6, 1), date(2024, 6, 5), "   ");
    assert!(matches!(app.check(), Err(Error::Validation(_))));
  }

  #[test]
  fn leave_type_parses_case_insensitively() {
    assert_eq!("Vacation".parse::<LeaveType>().unwrap(), LeaveType::Vacation);
    assert!("sabbatical".parse::<LeaveType>().is_err());
  }

  #[test]
  fn type_field_is_renamed_on_the_wire() {
    let app = application(date(2024, 6, 1), date(2024, 6, 5), "beach");
    let json = serde_json::to_value(&app).unwrap();
    assert_eq!(json["type"], "vacation");
  }
}
