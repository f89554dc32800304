//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use hris_core::{Hris, HrisConfig, identity::Role};
use hris_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, api_router};

struct TestApp {
  router: Router,
  hris:   Arc<Hris<SqliteStore>>,
}

impl TestApp {
  async fn new() -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let hris = Arc::new(Hris::new(Arc::new(store), &HrisConfig::default()));
    let router = api_router(AppState::new(Arc::clone(&hris)));
    Self { router, hris }
  }

  async fn send(
    &self,
    method: &str,
    uri:    &str,
    auth:   Option<(&str, &str)>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((email, password)) = auth {
      let token = B64.encode(format!("{email}:{password}"));
      builder = builder.header(header::AUTHORIZATION, format!("Basic {token}"));
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };

    let resp = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
  }

  /// Register through the API and return the new identity's id.
  async fn sign_up(&self, email: &str, name: &str) -> Uuid {
    let body = json!({
      "email": email,
      "password": "hunter22",
      "name": name,
      "position": "Engineer",
      "department": "Platform",
    });
    let (status, value) = self.send("POST", "/auth/sign-up", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value["id"].as_str().unwrap().parse().unwrap()
  }
}

const PW: &str = "hunter22";

// ─── Session ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_up_validates_and_rejects_duplicates() {
  let app = TestApp::new().await;
  app.sign_up("ada@example.com", "Ada").await;

  let incomplete = json!({
    "email": "bob@example.com",
    "password": "hunter22",
    "name": "Bob",
    "position": "",
    "department": "Platform",
  });
  let (status, body) = app.send("POST", "/auth/sign-up", None, Some(incomplete)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "validation");
  assert_eq!(body["error"], "Position is required");

  let again = json!({
    "email": "ADA@example.com",
    "password": "hunter22",
    "name": "Ada Again",
    "position": "Engineer",
    "department": "Platform",
  });
  let (status, body) = app.send("POST", "/auth/sign-up", None, Some(again)).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["kind"], "duplicate");
}

#[tokio::test]
async fn requests_without_valid_credentials_are_unauthorized() {
  let app = TestApp::new().await;
  app.sign_up("ada@example.com", "Ada").await;

  let (status, body) = app.send("GET", "/me", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["kind"], "auth");

  let (status, _) = app.send("GET", "/me", Some(("ada@example.com", "wrong-pw")), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, me) = app.send("GET", "/me", Some(("ada@example.com", PW)), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["role"], "member");
  assert_eq!(me["profile"]["name"], "Ada");
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_check_in_is_a_conflict() {
  let app = TestApp::new().await;
  app.sign_up("ada@example.com", "Ada").await;
  let ada = Some(("ada@example.com", PW));

  let (status, record) = app.send("POST", "/attendance/check-in", ada, Some(json!({}))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(record["check_out"].is_null());

  let (status, body) = app.send("POST", "/attendance/check-in", ada, Some(json!({}))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["kind"], "duplicate");
  assert_eq!(body["error"], "You have already checked in today");

  let (status, today) = app.send("GET", "/attendance/today", ada, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(today["state"], "checked_in");
}

#[tokio::test]
async fn members_cannot_mark_others() {
  let app = TestApp::new().await;
  app.sign_up("ada@example.com", "Ada").await;
  let bob = app.sign_up("bob@example.com", "Bob").await;

  let (status, body) = app
    .send(
      "POST",
      "/attendance/check-in",
      Some(("ada@example.com", PW)),
      Some(json!({ "user_id": bob })),
    )
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["kind"], "authorization");
}

#[tokio::test]
async fn marking_without_a_body_marks_the_caller() {
  let app = TestApp::new().await;
  let ada_id = app.sign_up("ada@example.com", "Ada").await;
  let ada = Some(("ada@example.com", PW));

  let (status, record) = app.send("POST", "/attendance/check-in", ada, None).await;
  assert_eq!(status, StatusCode::CREATED, "{record}");
  assert_eq!(record["user_id"], ada_id.to_string());

  let (status, record) = app.send("POST", "/attendance/check-out", ada, None).await;
  assert_eq!(status, StatusCode::OK, "{record}");
  assert!(!record["check_out"].is_null());
}

#[tokio::test]
async fn malformed_mark_body_is_a_validation_error() {
  let app = TestApp::new().await;
  app.sign_up("ada@example.com", "Ada").await;

  let (status, body) = app
    .send(
      "POST",
      "/attendance/check-in",
      Some(("ada@example.com", PW)),
      Some(json!({ "user_id": "not-a-uuid" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "validation");
}

// ─── Leave ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn leave_review_is_admin_only_and_final() {
  let app = TestApp::new().await;
  app.sign_up("ada@example.com", "Ada").await;
  let boss = app.sign_up("boss@example.com", "Boss").await;
  app.hris.assign_role(boss, Role::Admin).await.unwrap();
  let ada = Some(("ada@example.com", PW));
  let admin = Some(("boss@example.com", PW));

  let application = json!({
    "type": "vacation",
    "start_date": "2024-06-01",
    "end_date": "2024-06-05",
    "reason": "Family trip",
  });
  let (status, request) = app.send("POST", "/leaves", ada, Some(application)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(request["status"], "pending");
  let approve = format!("/leaves/{}/approve", request["id"].as_str().unwrap());
  let reject = format!("/leaves/{}/reject", request["id"].as_str().unwrap());

  let (status, _) = app.send("POST", &approve, ada, Some(json!({}))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, approved) = app.send("POST", &approve, admin, Some(json!({ "notes": "ok" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(approved["status"], "approved");
  assert_eq!(approved["reviewed_by"], boss.to_string());
  assert!(!approved["reviewed_at"].is_null());

  let (status, body) = app.send("POST", &reject, admin, Some(json!({}))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["kind"], "validation");

  let (_, listed) = app.send("GET", "/leaves", admin, None).await;
  assert_eq!(listed[0]["employee_name"], "Ada");
}

#[tokio::test]
async fn inverted_leave_range_is_a_bad_request() {
  let app = TestApp::new().await;
  app.sign_up("ada@example.com", "Ada").await;

  let application = json!({
    "type": "sick",
    "start_date": "2024-06-05",
    "end_date": "2024-06-01",
    "reason": "flu",
  });
  let (status, body) =
    app.send("POST", "/leaves", Some(("ada@example.com", PW)), Some(application)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "End date cannot be before start date");
}

#[tokio::test]
async fn unknown_leave_type_is_a_validation_error() {
  let app = TestApp::new().await;
  app.sign_up("ada@example.com", "Ada").await;

  let application = json!({
    "type": "sabbatical",
    "start_date": "2024-06-01",
    "end_date": "2024-06-05",
    "reason": "Time off",
  });
  let (status, body) =
    app.send("POST", "/leaves", Some(("ada@example.com", PW)), Some(application)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "validation");
  assert!(body["error"].as_str().unwrap().contains("sabbatical"), "{body}");
}

#[tokio::test]
async fn review_needs_no_body_but_a_well_formed_id() {
  let app = TestApp::new().await;
  app.sign_up("ada@example.com", "Ada").await;
  let boss = app.sign_up("boss@example.com", "Boss").await;
  app.hris.assign_role(boss, Role::Admin).await.unwrap();
  let admin = Some(("boss@example.com", PW));

  let application = json!({
    "type": "sick",
    "start_date": "2024-06-01",
    "end_date": "2024-06-01",
    "reason": "flu",
  });
  let (_, request) =
    app.send("POST", "/leaves", Some(("ada@example.com", PW)), Some(application)).await;
  let reject = format!("/leaves/{}/reject", request["id"].as_str().unwrap());

  let (status, rejected) = app.send("POST", &reject, admin, None).await;
  assert_eq!(status, StatusCode::OK, "{rejected}");
  assert_eq!(rejected["status"], "rejected");
  assert!(rejected["review_notes"].is_null());

  let (status, body) = app.send("POST", "/leaves/42/approve", admin, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "validation");
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn directory_search_and_profile_edits() {
  let app = TestApp::new().await;
  let ada = app.sign_up("ada@example.com", "Ada Lovelace").await;
  app.sign_up("bob@example.com", "Bob").await;
  let auth = Some(("bob@example.com", PW));

  let (status, hits) = app.send("GET", "/employees?search=lovelace", auth, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(hits.as_array().unwrap().len(), 1);
  assert_eq!(hits[0]["role"], "member");

  let uri = format!("/employees/{ada}");
  let (status, _) = app.send("PATCH", &uri, auth, Some(json!({ "name": "Ada L." }))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = app.send("GET", &format!("/employees/{}", Uuid::new_v4()), auth, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["kind"], "not_found");

  let (status, body) = app.send("GET", "/employees/not-a-uuid", auth, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "validation");

  let (status, dashboard) = app.send("GET", "/dashboard", auth, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(dashboard["stats"]["total_employees"], 2);
}
