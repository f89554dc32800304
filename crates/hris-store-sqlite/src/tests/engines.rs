//! End-to-end engine behaviour over a real SQLite store.

use std::{sync::Arc, time::Duration};

use chrono::{TimeDelta, TimeZone, Utc};
use hris_core::{
  Error, ErrorKind, Hris, HrisConfig,
  activity::ActivityAction,
  attendance::{MarkingPolicy, TodayStatus},
  clock::ManualClock,
  identity::{Identity, ProfileUpdate, Role},
  leave::{LeaveApplication, LeaveStatus, LeaveType},
  role::RoleResolver,
  store::HrStore,
};
use uuid::Uuid;

use super::{at, day, employee};
use crate::SqliteStore;

struct Fixture {
  hris:  Hris<SqliteStore>,
  clock: Arc<ManualClock>,
  admin: Identity,
  ada:   Identity,
  bob:   Identity,
}

impl Fixture {
  async fn new(config: HrisConfig) -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let admin = employee(&store, "boss@example.com", "Boss").await;
    let ada = employee(&store, "ada@example.com", "Ada Lovelace").await;
    let bob = employee(&store, "bob@example.com", "Bob").await;
    store.set_role(admin.id, Role::Admin).await.unwrap();

    let clock = Arc::new(ManualClock::new(at(3, 9, 0)));
    let hris = Hris::new(Arc::new(store), &config).with_clock(clock.clone());
    Self { hris, clock, admin, ada, bob }
  }

  async fn default() -> Self { Self::new(HrisConfig::default()).await }

  async fn activity(&self) -> Vec<(ActivityAction, String)> {
    self
      .hris
      .store()
      .recent_activity(50)
      .await
      .unwrap()
      .into_iter()
      .map(|row| (row.entry.action, row.entry.description))
      .collect()
  }
}

fn vacation() -> LeaveApplication {
  LeaveApplication {
    leave_type: LeaveType::Vacation,
    start_date: day(1),
    end_date:   day(5),
    reason:     "  family trip ".into(),
  }
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_check_in_on_the_same_day_is_refused() {
  let f = Fixture::default().await;
  let attendance = f.hris.attendance();

  let record = attendance.check_in(&f.ada, f.ada.id).await.unwrap();
  assert_eq!(record.date, day(3));
  assert_eq!(record.check_in, Some(at(3, 9, 0)));
  assert_eq!(record.check_out, None);

  f.clock.advance(TimeDelta::minutes(5));
  let err = attendance.check_in(&f.ada, f.ada.id).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyCheckedIn { user_id, .. } if user_id == f.ada.id));
  assert_eq!(err.kind(), ErrorKind::Duplicate);

  assert_eq!(f.hris.store().count_attendance(day(3)).await.unwrap(), 1);
  assert_eq!(
    attendance.today_status(&f.ada).await.unwrap(),
    TodayStatus::CheckedIn { at: at(3, 9, 0) },
  );
}

#[tokio::test]
async fn admin_marks_a_full_day_for_an_employee() {
  let f = Fixture::default().await;
  let attendance = f.hris.attendance();

  f.clock.set(at(3, 8, 55));
  attendance.check_in(&f.admin, f.bob.id).await.unwrap();
  f.clock.set(at(3, 17, 5));
  let record = attendance.check_out(&f.admin, f.bob.id).await.unwrap();

  assert_eq!(record.user_id, f.bob.id);
  assert_eq!(record.check_in, Some(at(3, 8, 55)));
  assert_eq!(record.check_out, Some(at(3, 17, 5)));
  assert_eq!(format!("{:.2}", record.hours_worked().unwrap()), "8.17");

  let err = attendance.check_out(&f.admin, f.bob.id).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyCheckedOut { .. }));

  let log = f.activity().await;
  assert!(log.contains(&(
    ActivityAction::Attendance,
    format!("Checked in employee {} for today", f.bob.id),
  )));
}

#[tokio::test]
async fn check_out_without_check_in_is_refused() {
  let f = Fixture::default().await;
  let err = f.hris.attendance().check_out(&f.ada, f.ada.id).await.unwrap_err();
  assert!(matches!(err, Error::NotCheckedIn { .. }));
  assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn check_out_before_check_in_is_refused() {
  let f = Fixture::default().await;
  let attendance = f.hris.attendance();
  attendance.check_in(&f.ada, f.ada.id).await.unwrap();

  f.clock.set(at(3, 8, 0));
  let err = attendance.check_out(&f.ada, f.ada.id).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)), "{err:?}");
  assert_eq!(err.kind(), ErrorKind::Validation);

  let open = f.hris.store().get_attendance(f.ada.id, day(3)).await.unwrap().unwrap();
  assert_eq!(open.check_out, None);
}

#[tokio::test]
async fn history_keeps_the_newest_thirty_days() {
  let f = Fixture::default().await;
  let attendance = f.hris.attendance();

  f.clock.set(at(1, 9, 0));
  for _ in 0..32 {
    attendance.check_in(&f.ada, f.ada.id).await.unwrap();
    f.clock.advance(TimeDelta::days(1));
  }
  let newest = (at(1, 9, 0) + TimeDelta::days(31)).date_naive();

  for actor in [&f.admin, &f.ada] {
    let history = attendance.list_attendance(actor).await.unwrap();
    assert_eq!(history.len(), 30);
    assert_eq!(history[0].record.date, newest);
    assert!(history.windows(2).all(|w| w[0].record.date > w[1].record.date));
    assert_eq!(history[29].record.date, day(3));
  }
}

#[tokio::test]
async fn members_cannot_mark_each_other() {
  let f = Fixture::default().await;
  let err = f.hris.attendance().check_in(&f.ada, f.bob.id).await.unwrap_err();
  assert!(matches!(err, Error::AdminRequired { .. }));
  assert_eq!(f.hris.store().count_attendance(day(3)).await.unwrap(), 0);
}

#[tokio::test]
async fn marking_an_unknown_employee_is_not_found() {
  let f = Fixture::default().await;
  let err = f.hris.attendance().check_in(&f.admin, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: "profile", .. }));
}

#[tokio::test]
async fn a_new_utc_day_allows_a_new_check_in() {
  let f = Fixture::default().await;
  let attendance = f.hris.attendance();

  f.clock.set(Utc.with_ymd_and_hms(2024, 6, 3, 23, 30, 0).unwrap());
  attendance.check_in(&f.ada, f.ada.id).await.unwrap();
  f.clock.advance(TimeDelta::hours(1));
  let next = attendance.check_in(&f.ada, f.ada.id).await.unwrap();
  assert_eq!(next.date, day(4));

  // Yesterday's open record cannot be closed from today.
  f.hris.attendance().check_out(&f.ada, f.ada.id).await.unwrap();
  let open = f.hris.store().get_attendance(f.ada.id, day(3)).await.unwrap().unwrap();
  assert_eq!(open.check_out, None);
}

#[tokio::test]
async fn history_is_scoped_by_role() {
  let f = Fixture::default().await;
  let attendance = f.hris.attendance();
  attendance.check_in(&f.ada, f.ada.id).await.unwrap();
  attendance.check_in(&f.bob, f.bob.id).await.unwrap();

  let mine = attendance.list_attendance(&f.ada).await.unwrap();
  assert_eq!(mine.len(), 1);
  assert_eq!(mine[0].record.user_id, f.ada.id);
  assert_eq!(mine[0].employee_name, "Ada Lovelace");

  let everyone = attendance.list_attendance(&f.admin).await.unwrap();
  assert_eq!(everyone.len(), 2);
}

#[tokio::test]
async fn admin_only_policy_restricts_marking_and_skips_the_log() {
  let config = HrisConfig { attendance_policy: MarkingPolicy::AdminMarks, ..Default::default() };
  let f = Fixture::new(config).await;
  let attendance = f.hris.attendance();

  let err = attendance.check_in(&f.ada, f.ada.id).await.unwrap_err();
  assert!(matches!(err, Error::AdminRequired { .. }));

  attendance.check_in(&f.admin, f.ada.id).await.unwrap();
  attendance.check_in(&f.admin, f.admin.id).await.unwrap();
  assert_eq!(f.hris.store().count_attendance(day(3)).await.unwrap(), 2);
  assert!(f.activity().await.is_empty());
}

// ─── Leave ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn approved_leave_cannot_be_rejected_afterwards() {
  let f = Fixture::default().await;
  let leaves = f.hris.leaves();

  let request = leaves.submit(&f.ada, vacation()).await.unwrap();
  assert_eq!(request.status, LeaveStatus::Pending);
  assert_eq!(request.reason, "family trip");
  assert_eq!(request.days(), 5);

  let err = leaves.approve(&f.ada, request.id, None).await.unwrap_err();
  assert!(matches!(err, Error::AdminRequired { .. }));

  f.clock.advance(TimeDelta::hours(2));
  let approved = leaves
    .approve(&f.admin, request.id, Some("  have fun ".into()))
    .await
    .unwrap();
  assert_eq!(approved.status, LeaveStatus::Approved);
  assert_eq!(approved.reviewed_by, Some(f.admin.id));
  assert_eq!(approved.reviewed_at, Some(at(3, 11, 0)));
  assert_eq!(approved.review_notes.as_deref(), Some("have fun"));

  let err = leaves.reject(&f.admin, request.id, None).await.unwrap_err();
  assert!(matches!(
    err,
    Error::InvalidTransition { from: LeaveStatus::Approved, id } if id == request.id
  ));
  let stored = f.hris.store().get_leave(request.id).await.unwrap().unwrap();
  assert_eq!(stored.status, LeaveStatus::Approved);
}

#[tokio::test]
async fn reviewing_an_unknown_request_is_not_found() {
  let f = Fixture::default().await;
  let err = f.hris.leaves().reject(&f.admin, Uuid::new_v4(), None).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn inverted_dates_never_reach_the_store() {
  let f = Fixture::default().await;
  let app = LeaveApplication { start_date: day(9), end_date: day(2), ..vacation() };
  let err = f.hris.leaves().submit(&f.ada, app).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert_eq!(f.hris.store().count_leaves(None).await.unwrap(), 0);
}

#[tokio::test]
async fn leave_list_is_scoped_by_role() {
  let f = Fixture::default().await;
  let leaves = f.hris.leaves();
  leaves.submit(&f.ada, vacation()).await.unwrap();
  leaves.submit(&f.bob, vacation()).await.unwrap();

  let bobs = leaves.list(&f.bob).await.unwrap();
  assert_eq!(bobs.len(), 1);
  assert_eq!(bobs[0].employee_name, "Bob");
  assert_eq!(leaves.list(&f.admin).await.unwrap().len(), 2);
}

// ─── Roles ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cached_role_holds_until_invalidated() {
  let f = Fixture::default().await;
  let roles = f.hris.roles();
  assert_eq!(roles.resolve(f.ada.id).await.unwrap(), Role::Member);

  f.hris.store().set_role(f.ada.id, Role::Admin).await.unwrap();
  assert_eq!(roles.resolve(f.ada.id).await.unwrap(), Role::Member);

  roles.invalidate(f.ada.id);
  assert!(roles.is_admin(f.ada.id).await.unwrap());
}

#[tokio::test]
async fn expired_roles_are_swept_on_the_next_lookup() {
  let f = Fixture::default().await;
  let ttl = Some(Duration::from_millis(50));
  let roles = RoleResolver::new(Arc::clone(f.hris.store()), ttl, Duration::from_secs(5));
  roles.resolve(f.ada.id).await.unwrap();
  roles.resolve(f.bob.id).await.unwrap();
  assert_eq!(roles.cached_len(), 2);

  tokio::time::sleep(Duration::from_millis(80)).await;
  roles.resolve(f.ada.id).await.unwrap();
  assert_eq!(roles.cached_len(), 1);
}

#[tokio::test]
async fn zero_ttl_reads_the_store_every_time() {
  let config = HrisConfig { role_cache_ttl_secs: 0, ..Default::default() };
  let f = Fixture::new(config).await;
  let roles = f.hris.roles();
  assert_eq!(roles.resolve(f.admin.id).await.unwrap(), Role::Admin);

  f.hris.store().set_role(f.admin.id, Role::Member).await.unwrap();
  assert_eq!(roles.resolve(f.admin.id).await.unwrap(), Role::Member);
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn employee_search_is_case_insensitive() {
  let f = Fixture::default().await;
  let directory = f.hris.directory();

  let hits = directory.list_employees(Some("LOVELACE")).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].profile.id, f.ada.id);

  let platform = directory.list_employees(Some("platform")).await.unwrap();
  assert_eq!(platform.len(), 3);
  assert_eq!(directory.list_employees(Some("   ")).await.unwrap().len(), 3);
  assert!(directory.list_employees(Some("marketing")).await.unwrap().is_empty());
}

#[tokio::test]
async fn profiles_are_edited_by_owner_or_admin() {
  let f = Fixture::default().await;
  let directory = f.hris.directory();

  let update = || ProfileUpdate { department: Some("Research".into()), ..Default::default() };
  let err = directory.update_profile(&f.bob, f.ada.id, update()).await.unwrap_err();
  assert!(matches!(err, Error::NotOwner { .. }));

  let mine = directory.update_profile(&f.ada, f.ada.id, update()).await.unwrap();
  assert_eq!(mine.department.as_deref(), Some("Research"));

  let renamed = ProfileUpdate { name: Some("Robert".into()), ..Default::default() };
  let theirs = directory.update_profile(&f.admin, f.bob.id, renamed).await.unwrap();
  assert_eq!(theirs.name, "Robert");

  let err = directory
    .update_profile(&f.ada, f.ada.id, ProfileUpdate::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let log = f.activity().await;
  assert!(log.contains(&(ActivityAction::Profile, "Updated profile of Robert".into())));
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_counts_today_and_shows_the_feed() {
  let f = Fixture::default().await;
  f.hris.attendance().check_in(&f.ada, f.ada.id).await.unwrap();
  let request = f.hris.leaves().submit(&f.bob, vacation()).await.unwrap();
  f.hris.leaves().submit(&f.ada, vacation()).await.unwrap();
  f.hris.leaves().approve(&f.admin, request.id, None).await.unwrap();

  let dashboard = f.hris.dashboard().summary().await.unwrap();
  assert_eq!(dashboard.stats.total_employees, 3);
  assert_eq!(dashboard.stats.pending_leaves, 1);
  assert_eq!(dashboard.stats.today_attendance, 1);

  let feed: Vec<_> = dashboard.recent_activity.iter().map(|r| r.actor_name.as_str()).collect();
  assert_eq!(feed.len(), 4);
  assert!(feed.contains(&"Boss"));
}
