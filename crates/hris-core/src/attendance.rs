//! Attendance — daily check-in/check-out records and the engine that marks
//! them.
//!
//! Per `(identity, date)` a record moves through three states:
//!
//! ```text
//! Absent ──check_in──▶ CheckedIn ──check_out──▶ Completed
//! ```
//!
//! `Completed` is terminal for that date. Uniqueness of the record is owned
//! by the store; a second check-in surfaces as
//! [`Error::AlreadyCheckedIn`] when the store reports a conflict.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Hris, Result,
  activity::ActivityAction,
  identity::Identity,
  store::{AttendanceQuery, HrStore},
};

/// How many records an attendance history shows.
pub const HISTORY_LIMIT: usize = 30;

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub id:        Uuid,
  pub user_id:   Uuid,
  /// UTC calendar day the record belongs to.
  pub date:      NaiveDate,
  pub check_in:  Option<DateTime<Utc>>,
  pub check_out: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
  /// Hours between check-in and check-out, if both are set.
  pub fn hours_worked(&self) -> Option<f64> {
    let (start, end) = (self.check_in?, self.check_out?);
    Some((end - start).num_seconds() as f64 / 3600.0)
  }

  pub fn status(&self) -> TodayStatus {
    match (self.check_in, self.check_out) {
      (Some(check_in), Some(check_out)) => TodayStatus::Completed { check_in, check_out },
      (Some(at), None) => TodayStatus::CheckedIn { at },
      _ => TodayStatus::Absent,
    }
  }
}

/// A record joined with its owner's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRow {
  #[serde(flatten)]
  pub record:        AttendanceRecord,
  pub employee_name: String,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
  pub user_id:  Uuid,
  pub date:     NaiveDate,
  pub check_in: DateTime<Utc>,
}

/// Where an identity stands for the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TodayStatus {
  Absent,
  CheckedIn { at: DateTime<Utc> },
  Completed { check_in: DateTime<Utc>, check_out: DateTime<Utc> },
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Who may mark attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingPolicy {
  /// Everyone marks their own attendance; admins may also mark others.
  /// Each mark is written to the activity log.
  #[default]
  SelfService,
  /// Only admins mark attendance, for anyone including themselves.
  AdminMarks,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct AttendanceEngine<'a, S> {
  hris: &'a Hris<S>,
}

impl<'a, S: HrStore> AttendanceEngine<'a, S> {
  pub(crate) fn new(hris: &'a Hris<S>) -> Self { Self { hris } }

  /// Open today's record for `target`.
  pub async fn check_in(&self, actor: &Identity, target: Uuid) -> Result<AttendanceRecord> {
    self.authorize(actor, target, "checking in").await?;
    if target != actor.id {
      self
        .hris
        .call("get_profile", self.hris.store.get_profile(target))
        .await?
        .ok_or(Error::NotFound { entity: "profile", id: target })?;
    }

    let now = self.hris.clock.now();
    let date = now.date_naive();
    let insert = self.hris.store.insert_attendance(NewAttendance {
      user_id: target,
      date,
      check_in: now,
    });

    let record = match self.hris.call("insert_attendance", insert).await {
      Ok(record) => record,
      Err(Error::Conflict(_)) => {
        warn!(actor = %actor.id, %target, %date, "duplicate check-in refused");
        return Err(Error::AlreadyCheckedIn { user_id: target, date });
      }
      Err(e) => return Err(e),
    };

    info!(actor = %actor.id, %target, %date, "checked in");
    self.log(actor, target, "Checked in").await;
    Ok(record)
  }

  /// Close today's open record for `target`.
  pub async fn check_out(&self, actor: &Identity, target: Uuid) -> Result<AttendanceRecord> {
    self.authorize(actor, target, "checking out").await?;

    let now = self.hris.clock.now();
    let date = now.date_naive();
    let existing = self
      .hris
      .call("get_attendance", self.hris.store.get_attendance(target, date))
      .await?
      .ok_or(Error::NotCheckedIn { user_id: target, date })?;

    if existing.check_out.is_some() {
      return Err(Error::AlreadyCheckedOut { user_id: target, date });
    }
    if existing.check_in.is_some_and(|check_in| now < check_in) {
      return Err(Error::Validation("Check-out time cannot precede check-in".into()));
    }

    // The update is conditional on `check_out IS NULL`; losing a race to
    // another writer leaves nothing to close.
    let record = self
      .hris
      .call("close_attendance", self.hris.store.close_attendance(target, date, now))
      .await?
      .ok_or(Error::AlreadyCheckedOut { user_id: target, date })?;

    info!(actor = %actor.id, %target, %date, "checked out");
    self.log(actor, target, "Checked out").await;
    Ok(record)
  }

  /// Attendance history visible to `actor`: every identity's records for an
  /// admin, only their own otherwise.
  pub async fn list_attendance(&self, actor: &Identity) -> Result<Vec<AttendanceRow>> {
    let admin = self.hris.role_of(actor).await?.is_admin();
    let query = AttendanceQuery {
      user_id: (!admin).then_some(actor.id),
      date:    None,
      limit:   Some(HISTORY_LIMIT),
    };
    self.hris.call("list_attendance", self.hris.store.list_attendance(&query)).await
  }

  /// The caller's own standing for today.
  pub async fn today_status(&self, actor: &Identity) -> Result<TodayStatus> {
    let today = self.hris.clock.today();
    let record = self
      .hris
      .call("get_attendance", self.hris.store.get_attendance(actor.id, today))
      .await?;
    Ok(record.map_or(TodayStatus::Absent, |r| r.status()))
  }

  async fn authorize(&self, actor: &Identity, target: Uuid, action: &'static str) -> Result<()> {
    let needs_admin = match self.hris.policy {
      MarkingPolicy::AdminMarks => true,
      MarkingPolicy::SelfService => actor.id != target,
    };
    if needs_admin {
      self.hris.require_admin(actor, action).await?;
    }
    Ok(())
  }

  async fn log(&self, actor: &Identity, target: Uuid, verb: &str) {
    if self.hris.policy != MarkingPolicy::SelfService {
      return;
    }
    let description = if actor.id == target {
      format!("{verb} for today")
    } else {
      format!("{verb} employee {target} for today")
    };
    self.hris.log_activity(actor.id, ActivityAction::Attendance, description).await;
  }
}
