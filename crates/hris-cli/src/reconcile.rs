//! Folding mutation results back into the lists the TUI already holds, so a
//! successful action shows up without a full reload.

use chrono::NaiveDate;
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use hris_core::{
  attendance::{AttendanceRecord, AttendanceRow},
  identity::{EmployeeEntry, Profile},
  leave::{LeaveApplication, LeaveRequest, LeaveRow, LeaveType},
};

/// Replace the row for `record`, or put it at the top when it is new.
pub fn upsert_attendance(
  rows: &mut Vec<AttendanceRow>,
  record: AttendanceRecord,
  employee_name: impl FnOnce() -> String,
) {
  match rows.iter_mut().find(|row| row.record.id == record.id) {
    Some(row) => row.record = record,
    None => rows.insert(0, AttendanceRow { record, employee_name: employee_name() }),
  }
}

/// Replace the request with the same id. Returns whether it was found.
pub fn replace_leave(rows: &mut [LeaveRow], request: LeaveRequest) -> bool {
  match rows.iter_mut().find(|row| row.request.id == request.id) {
    Some(row) => {
      row.request = request;
      true
    }
    None => false,
  }
}

pub fn replace_profile(entries: &mut [EmployeeEntry], profile: &Profile) {
  if let Some(entry) = entries.iter_mut().find(|e| e.profile.id == profile.id) {
    entry.profile = profile.clone();
  }
}

/// Employees whose name, email, position or department fuzzy-match `filter`.
pub fn filter_employees<'e>(entries: &'e [EmployeeEntry], filter: &str) -> Vec<&'e EmployeeEntry> {
  if filter.is_empty() {
    return entries.iter().collect();
  }
  let matcher = SkimMatcherV2::default();
  entries
    .iter()
    .filter(|e| {
      let p = &e.profile;
      [Some(&p.name), Some(&p.email), p.position.as_ref(), p.department.as_ref()]
        .into_iter()
        .flatten()
        .any(|field| matcher.fuzzy_match(field, filter).is_some())
    })
    .collect()
}

/// Parse `<type> <start> <end> <reason…>` typed into the leave prompt, e.g.
/// `vacation 2024-06-01 2024-06-05 Family trip`.
pub fn parse_leave(input: &str) -> Result<LeaveApplication, String> {
  let mut parts = input.split_whitespace();
  let (Some(kind), Some(start), Some(end)) = (parts.next(), parts.next(), parts.next()) else {
    return Err("Expected: <type> <start YYYY-MM-DD> <end YYYY-MM-DD> <reason>".into());
  };

  let leave_type: LeaveType = kind.parse().map_err(|e: hris_core::Error| e.user_message())?;
  let date = |s: &str| {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("Not a date: {s}"))
  };
  let application = LeaveApplication {
    leave_type,
    start_date: date(start)?,
    end_date: date(end)?,
    reason: parts.collect::<Vec<_>>().join(" "),
  };
  application.check().map_err(|e| e.user_message())?;
  Ok(application)
}
