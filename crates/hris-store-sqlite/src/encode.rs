//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond precision
//! and a `Z` suffix, so that lexical order equals chronological order. Dates
//! are `YYYY-MM-DD`. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use hris_core::{
  activity::{ActivityAction, ActivityEntry, ActivityRow},
  attendance::{AttendanceRecord, AttendanceRow},
  identity::{EmployeeEntry, Profile, Role},
  leave::{LeaveRequest, LeaveRow, LeaveStatus, LeaveType},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn decode_leave_type(s: &str) -> Result<LeaveType> {
  match s {
    "sick" => Ok(LeaveType::Sick),
    "vacation" => Ok(LeaveType::Vacation),
    "personal" => Ok(LeaveType::Personal),
    "other" => Ok(LeaveType::Other),
    other => Err(Error::Decode { column: "leaves.type", value: other.to_owned() }),
  }
}

pub fn decode_leave_status(s: &str) -> Result<LeaveStatus> {
  match s {
    "pending" => Ok(LeaveStatus::Pending),
    "approved" => Ok(LeaveStatus::Approved),
    "rejected" => Ok(LeaveStatus::Rejected),
    other => Err(Error::Decode { column: "leaves.status", value: other.to_owned() }),
  }
}

pub fn decode_action(s: &str) -> Result<ActivityAction> {
  match s {
    "attendance" => Ok(ActivityAction::Attendance),
    "leave" => Ok(ActivityAction::Leave),
    "profile" => Ok(ActivityAction::Profile),
    other => Err(Error::Decode { column: "activity_logs.action", value: other.to_owned() }),
  }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

pub const PROFILE_COLUMNS: &str = "p.id, p.name, p.email, p.position, p.department, p.hire_date";

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub id:         String,
  pub name:       String,
  pub email:      String,
  pub position:   Option<String>,
  pub department: Option<String>,
  pub hire_date:  Option<String>,
}

impl RawProfile {
  /// Read [`PROFILE_COLUMNS`] starting at column 0.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      position:   row.get(3)?,
      department: row.get(4)?,
      hire_date:  row.get(5)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      email:      self.email,
      position:   self.position,
      department: self.department,
      hire_date:  self.hire_date.as_deref().map(decode_date).transpose()?,
    })
  }
}

/// A profile row plus whether an admin role row exists for it.
pub struct RawEmployee {
  pub profile:  RawProfile,
  pub is_admin: bool,
}

impl RawEmployee {
  pub fn into_entry(self) -> Result<EmployeeEntry> {
    Ok(EmployeeEntry {
      profile: self.profile.into_profile()?,
      role:    if self.is_admin { Role::Admin } else { Role::Member },
    })
  }
}

// ─── Attendance ──────────────────────────────────────────────────────────────

pub const ATTENDANCE_COLUMNS: &str = "a.id, a.user_id, a.date, a.check_in, a.check_out";

pub struct RawAttendance {
  pub id:        String,
  pub user_id:   String,
  pub date:      String,
  pub check_in:  Option<String>,
  pub check_out: Option<String>,
}

impl RawAttendance {
  /// Read [`ATTENDANCE_COLUMNS`] starting at column 0.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      user_id:   row.get(1)?,
      date:      row.get(2)?,
      check_in:  row.get(3)?,
      check_out: row.get(4)?,
    })
  }

  pub fn into_record(self) -> Result<AttendanceRecord> {
    Ok(AttendanceRecord {
      id:        decode_uuid(&self.id)?,
      user_id:   decode_uuid(&self.user_id)?,
      date:      decode_date(&self.date)?,
      check_in:  self.check_in.as_deref().map(decode_dt).transpose()?,
      check_out: self.check_out.as_deref().map(decode_dt).transpose()?,
    })
  }
}

// ─── Leave ───────────────────────────────────────────────────────────────────

pub const LEAVE_COLUMNS: &str = "l.id, l.user_id, l.type, l.start_date, l.end_date, l.reason, \
                                 l.status, l.reviewed_by, l.reviewed_at, l.review_notes, \
                                 l.created_at";

pub struct RawLeave {
  pub id:           String,
  pub user_id:      String,
  pub leave_type:   String,
  pub start_date:   String,
  pub end_date:     String,
  pub reason:       String,
  pub status:       String,
  pub reviewed_by:  Option<String>,
  pub reviewed_at:  Option<String>,
  pub review_notes: Option<String>,
  pub created_at:   String,
}

impl RawLeave {
  /// Read [`LEAVE_COLUMNS`] starting at column 0.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      user_id:      row.get(1)?,
      leave_type:   row.get(2)?,
      start_date:   row.get(3)?,
      end_date:     row.get(4)?,
      reason:       row.get(5)?,
      status:       row.get(6)?,
      reviewed_by:  row.get(7)?,
      reviewed_at:  row.get(8)?,
      review_notes: row.get(9)?,
      created_at:   row.get(10)?,
    })
  }

  pub fn into_request(self) -> Result<LeaveRequest> {
    Ok(LeaveRequest {
      id:           decode_uuid(&self.id)?,
      user_id:      decode_uuid(&self.user_id)?,
      leave_type:   decode_leave_type(&self.leave_type)?,
      start_date:   decode_date(&self.start_date)?,
      end_date:     decode_date(&self.end_date)?,
      reason:       self.reason,
      status:       decode_leave_status(&self.status)?,
      reviewed_by:  self.reviewed_by.as_deref().map(decode_uuid).transpose()?,
      reviewed_at:  self.reviewed_at.as_deref().map(decode_dt).transpose()?,
      review_notes: self.review_notes,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

// ─── Activity ────────────────────────────────────────────────────────────────

pub const ACTIVITY_COLUMNS: &str = "g.id, g.user_id, g.action, g.description, g.created_at";

pub struct RawActivity {
  pub id:          String,
  pub user_id:     String,
  pub action:      String,
  pub description: String,
  pub created_at:  String,
}

impl RawActivity {
  /// Read [`ACTIVITY_COLUMNS`] starting at column 0.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      user_id:     row.get(1)?,
      action:      row.get(2)?,
      description: row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_entry(self) -> Result<ActivityEntry> {
    Ok(ActivityEntry {
      id:          decode_uuid(&self.id)?,
      user_id:     decode_uuid(&self.user_id)?,
      action:      decode_action(&self.action)?,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

// ─── Joined rows ─────────────────────────────────────────────────────────────

/// A row of some kind `R` followed by the owner's display name.
pub struct Named<R> {
  pub raw:  R,
  pub name: String,
}

impl Named<RawAttendance> {
  pub fn into_row(self) -> Result<AttendanceRow> {
    Ok(AttendanceRow { record: self.raw.into_record()?, employee_name: self.name })
  }
}

impl Named<RawLeave> {
  pub fn into_row(self) -> Result<LeaveRow> {
    Ok(LeaveRow { request: self.raw.into_request()?, employee_name: self.name })
  }
}

impl Named<RawActivity> {
  pub fn into_row(self) -> Result<ActivityRow> {
    Ok(ActivityRow { entry: self.raw.into_entry()?, actor_name: self.name })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let whole = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
    let later = whole + chrono::Duration::milliseconds(250);
    assert!(encode_dt(whole) < encode_dt(later));
    assert_eq!(encode_dt(whole), "2024-06-03T09:00:00.000000Z");
    assert_eq!(decode_dt(&encode_dt(later)).unwrap(), later);
  }

  #[test]
  fn unknown_status_is_a_decode_error() {
    assert!(matches!(decode_leave_status("cancelled"), Err(Error::Decode { .. })));
  }
}
