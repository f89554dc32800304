//! Integration tests for `SqliteStore` against an in-memory database.

mod engines;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use hris_core::{
  activity::{ActivityAction, NewActivity},
  attendance::NewAttendance,
  identity::{Identity, NewIdentity, ProfileUpdate, Role},
  leave::{LeaveApplication, LeaveStatus, LeaveType, NewLeave},
  store::{AttendanceQuery, HrStore, LeaveQuery, LeaveReview, StoreFault},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, d).unwrap() }

fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, d, h, m, 0).unwrap() }

async fn employee(s: &SqliteStore, email: &str, name: &str) -> Identity {
  s.create_identity(NewIdentity {
    email:         email.into(),
    password_hash: "$argon2id$stub".into(),
    name:          name.into(),
    position:      Some("Engineer".into()),
    department:    Some("Platform".into()),
    hire_date:     day(1),
  })
  .await
  .unwrap()
}

fn leave(user_id: Uuid, created_at: DateTime<Utc>) -> NewLeave {
  NewLeave {
    user_id,
    application: LeaveApplication {
      leave_type: LeaveType::Vacation,
      start_date: day(10),
      end_date:   day(14),
      reason:     "beach".into(),
    },
    created_at,
  }
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn credentials_lookup_ignores_email_case() {
  let s = store().await;
  let ada = employee(&s, "ada@example.com", "Ada").await;

  let creds = s.find_credentials("ADA@example.com").await.unwrap().unwrap();
  assert_eq!(creds.identity, ada);
  assert_eq!(creds.password_hash, "$argon2id$stub");

  assert!(s.find_credentials("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let s = store().await;
  employee(&s, "ada@example.com", "Ada").await;

  let err = s
    .create_identity(NewIdentity {
      email:         "Ada@Example.com".into(),
      password_hash: "x".into(),
      name:          "Imposter".into(),
      position:      None,
      department:    None,
      hire_date:     day(1),
    })
    .await
    .unwrap_err();
  assert!(err.is_conflict());

  // The failed sign-up left no orphaned profile behind.
  assert_eq!(s.count_profiles().await.unwrap(), 1);
}

// ─── Roles ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn role_is_member_until_granted() {
  let s = store().await;
  let ada = employee(&s, "ada@example.com", "Ada").await;
  assert_eq!(s.role_of(ada.id).await.unwrap(), Role::Member);

  s.set_role(ada.id, Role::Admin).await.unwrap();
  s.set_role(ada.id, Role::Admin).await.unwrap();
  assert_eq!(s.role_of(ada.id).await.unwrap(), Role::Admin);

  s.set_role(ada.id, Role::Member).await.unwrap();
  assert_eq!(s.role_of(ada.id).await.unwrap(), Role::Member);
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn profiles_are_listed_by_name_with_roles() {
  let s = store().await;
  let zed = employee(&s, "zed@example.com", "zed").await;
  employee(&s, "ada@example.com", "Ada").await;
  s.set_role(zed.id, Role::Admin).await.unwrap();

  let all = s.list_profiles().await.unwrap();
  let names: Vec<_> = all.iter().map(|e| e.profile.name.as_str()).collect();
  assert_eq!(names, ["Ada", "zed"]);
  assert_eq!(all[0].role, Role::Member);
  assert_eq!(all[1].role, Role::Admin);
  assert_eq!(all[0].profile.hire_date, Some(day(1)));
}

#[tokio::test]
async fn profile_update_touches_only_supplied_fields() {
  let s = store().await;
  let ada = employee(&s, "ada@example.com", "Ada").await;

  let updated = s
    .update_profile(ada.id, ProfileUpdate {
      name:       None,
      position:   Some(String::new()),
      department: Some("Research".into()),
    })
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.name, "Ada");
  assert_eq!(updated.position, None);
  assert_eq!(updated.department.as_deref(), Some("Research"));
  assert_eq!(s.get_profile(ada.id).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn profile_update_of_unknown_id_is_none() {
  let s = store().await;
  let update = ProfileUpdate { name: Some("Ghost".into()), ..Default::default() };
  assert!(s.update_profile(Uuid::new_v4(), update).await.unwrap().is_none());
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_record_for_same_day_is_a_conflict() {
  let s = store().await;
  let ada = employee(&s, "ada@example.com", "Ada").await;

  let input = NewAttendance { user_id: ada.id, date: day(3), check_in: at(3, 9, 0) };
  s.insert_attendance(input.clone()).await.unwrap();
  let err = s.insert_attendance(input).await.unwrap_err();
  assert!(err.is_conflict());
  assert_eq!(s.count_attendance(day(3)).await.unwrap(), 1);
}

#[tokio::test]
async fn close_attendance_only_closes_open_records() {
  let s = store().await;
  let ada = employee(&s, "ada@example.com", "Ada").await;
  s.insert_attendance(NewAttendance { user_id: ada.id, date: day(3), check_in: at(3, 8, 55) })
    .await
    .unwrap();

  let closed = s.close_attendance(ada.id, day(3), at(3, 17, 5)).await.unwrap().unwrap();
  assert_eq!(closed.check_out, Some(at(3, 17, 5)));

  // Already closed: the first check-out stands.
  assert!(s.close_attendance(ada.id, day(3), at(3, 18, 0)).await.unwrap().is_none());
  let stored = s.get_attendance(ada.id, day(3)).await.unwrap().unwrap();
  assert_eq!(stored.check_out, Some(at(3, 17, 5)));

  // Nothing to close on a day without a record.
  assert!(s.close_attendance(ada.id, day(4), at(4, 17, 0)).await.unwrap().is_none());
}

#[tokio::test]
async fn attendance_is_listed_newest_day_first() {
  let s = store().await;
  let ada = employee(&s, "ada@example.com", "Ada").await;
  let bob = employee(&s, "bob@example.com", "Bob").await;

  for (who, d) in [(ada.id, 3), (bob.id, 3), (ada.id, 4), (bob.id, 2)] {
    s.insert_attendance(NewAttendance { user_id: who, date: day(d), check_in: at(d, 9, 0) })
      .await
      .unwrap();
  }

  let all = s.list_attendance(&AttendanceQuery::default()).await.unwrap();
  let seen: Vec<_> = all.iter().map(|r| (r.employee_name.as_str(), r.record.date)).collect();
  assert_eq!(seen, [("Ada", day(4)), ("Ada", day(3)), ("Bob", day(3)), ("Bob", day(2))]);

  let mine = s
    .list_attendance(&AttendanceQuery { user_id: Some(bob.id), ..Default::default() })
    .await
    .unwrap();
  assert!(mine.iter().all(|r| r.record.user_id == bob.id));
  assert_eq!(mine.len(), 2);

  let capped = s
    .list_attendance(&AttendanceQuery { limit: Some(1), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(capped.len(), 1);

  let one_day = s
    .list_attendance(&AttendanceQuery { date: Some(day(3)), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(one_day.len(), 2);
}

// ─── Leave ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn review_applies_only_to_pending_requests() {
  let s = store().await;
  let ada = employee(&s, "ada@example.com", "Ada").await;
  let boss = employee(&s, "boss@example.com", "Boss").await;

  let request = s.insert_leave(leave(ada.id, at(1, 10, 0))).await.unwrap();
  assert_eq!(request.status, LeaveStatus::Pending);
  assert_eq!(s.count_leaves(Some(LeaveStatus::Pending)).await.unwrap(), 1);

  let review = LeaveReview {
    status:      LeaveStatus::Approved,
    reviewed_by: boss.id,
    reviewed_at: at(2, 9, 0),
    notes:       Some("enjoy".into()),
  };
  let approved = s.review_leave(request.id, review.clone()).await.unwrap().unwrap();
  assert_eq!(approved.status, LeaveStatus::Approved);
  assert_eq!(approved.reviewed_by, Some(boss.id));
  assert_eq!(approved.reviewed_at, Some(at(2, 9, 0)));
  assert_eq!(approved.review_notes.as_deref(), Some("enjoy"));

  let reject = LeaveReview { status: LeaveStatus::Rejected, ..review };
  assert!(s.review_leave(request.id, reject).await.unwrap().is_none());
  assert_eq!(s.get_leave(request.id).await.unwrap().unwrap().status, LeaveStatus::Approved);
  assert_eq!(s.count_leaves(Some(LeaveStatus::Pending)).await.unwrap(), 0);
  assert_eq!(s.count_leaves(None).await.unwrap(), 1);
}

#[tokio::test]
async fn leaves_are_listed_newest_first_and_filtered() {
  let s = store().await;
  let ada = employee(&s, "ada@example.com", "Ada").await;
  let bob = employee(&s, "bob@example.com", "Bob").await;

  let first = s.insert_leave(leave(ada.id, at(1, 10, 0))).await.unwrap();
  let second = s.insert_leave(leave(bob.id, at(1, 11, 0))).await.unwrap();

  let all = s.list_leaves(&LeaveQuery::default()).await.unwrap();
  let ids: Vec<_> = all.iter().map(|r| r.request.id).collect();
  assert_eq!(ids, [second.id, first.id]);
  assert_eq!(all[0].employee_name, "Bob");

  let adas = s
    .list_leaves(&LeaveQuery { user_id: Some(ada.id), status: None })
    .await
    .unwrap();
  assert_eq!(adas.len(), 1);
  assert_eq!(adas[0].request.reason, "beach");

  let approved = s
    .list_leaves(&LeaveQuery { user_id: None, status: Some(LeaveStatus::Approved) })
    .await
    .unwrap();
  assert!(approved.is_empty());
}

// ─── Activity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn recent_activity_is_newest_first_and_capped() {
  let s = store().await;
  let ada = employee(&s, "ada@example.com", "Ada").await;

  for minute in 0..12 {
    s.append_activity(NewActivity {
      user_id:     ada.id,
      action:      ActivityAction::Attendance,
      description: format!("entry {minute}"),
      created_at:  at(3, 9, minute),
    })
    .await
    .unwrap();
  }

  let recent = s.recent_activity(10).await.unwrap();
  assert_eq!(recent.len(), 10);
  assert_eq!(recent[0].entry.description, "entry 11");
  assert_eq!(recent[0].actor_name, "Ada");
  assert_eq!(recent[9].entry.description, "entry 2");
}
