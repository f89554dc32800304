//! Async HTTP client wrapping the HRIS JSON API, and the [`AuthProvider`]
//! that signs a terminal session in through it.

use std::{sync::RwLock, time::Duration};

use hris_core::{
  Error, ErrorKind,
  attendance::{AttendanceRecord, AttendanceRow, TodayStatus},
  dashboard::Dashboard,
  identity::{Account, EmployeeEntry, Identity, Profile, ProfileUpdate},
  leave::{Decision, LeaveApplication, LeaveRequest, LeaveRow},
  session::{AuthProvider, Credentials, Registration},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
  /// The server answered with an error body.
  #[error("{status}: {message}")]
  Api { status: StatusCode, kind: ErrorKind, message: String },

  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
}

/// Shape of the JSON error body the API returns.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
  kind:  ErrorKind,
}

impl ClientError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Api { kind, .. } => *kind,
      Self::Http(_) => ErrorKind::Remote,
    }
  }

  /// Text for the status bar. API errors already carry one.
  pub fn user_message(&self) -> String {
    match self {
      Self::Api { message, .. } => message.clone(),
      Self::Http(e) if e.is_timeout() => {
        "The server took too long to respond, please try again".into()
      }
      Self::Http(e) if e.is_connect() => "Could not reach the server".into(),
      Self::Http(_) => "Something went wrong, please try again".into(),
    }
  }
}

impl From<ClientError> for Error {
  fn from(err: ClientError) -> Self {
    match err {
      ClientError::Api { kind: ErrorKind::Auth, .. } => Error::InvalidCredentials,
      ClientError::Api { kind: ErrorKind::Validation, message, .. } => Error::Validation(message),
      ClientError::Api { kind: ErrorKind::Duplicate, message, .. } => Error::Conflict(message),
      // The response names no entity or id; the kind is what callers branch on.
      ClientError::Api { kind: ErrorKind::NotFound, .. } => {
        Error::NotFound { entity: "record", id: Uuid::nil() }
      }
      ClientError::Api { kind: ErrorKind::Authorization, .. } => {
        Error::AdminRequired { action: "this request" }
      }
      ClientError::Http(e) if e.is_timeout() => {
        Error::Timeout { op: "http request", after: REQUEST_TIMEOUT }
      }
      other => Error::Store(Box::new(other)),
    }
  }
}

/// Category for an error response whose body could not be read.
fn kind_for_status(status: StatusCode) -> ErrorKind {
  match status {
    StatusCode::UNAUTHORIZED => ErrorKind::Auth,
    StatusCode::FORBIDDEN => ErrorKind::Authorization,
    StatusCode::NOT_FOUND => ErrorKind::NotFound,
    StatusCode::CONFLICT => ErrorKind::Duplicate,
    StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
    _ => ErrorKind::Remote,
  }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for the HRIS JSON API.
///
/// Requests carry the credentials of the last successful sign-in.
pub struct ApiClient {
  client:      Client,
  base_url:    String,
  credentials: RwLock<Option<Credentials>>,
}

#[derive(Serialize)]
struct MarkBody {
  #[serde(skip_serializing_if = "Option::is_none")]
  user_id: Option<Uuid>,
}

impl ApiClient {
  pub fn new(base_url: &str) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()
      .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_owned(),
      credentials: RwLock::new(None),
    })
  }

  fn url(&self, path: &str) -> String { format!("{}{path}", self.base_url) }

  pub fn set_credentials(&self, credentials: Option<Credentials>) {
    if let Ok(mut slot) = self.credentials.write() {
      *slot = credentials;
    }
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match self.credentials.read().ok().and_then(|c| c.clone()) {
      Some(c) => req.basic_auth(c.email, Some(c.password)),
      None => req,
    }
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    Self::decode(self.auth(req).send().await?).await
  }

  async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    debug!(%status, url = %resp.url(), "response");
    if status.is_success() {
      return Ok(resp.json().await?);
    }

    let (kind, message) = match resp.json::<ErrorBody>().await {
      Ok(body) => (body.kind, body.error),
      Err(_) => (kind_for_status(status), status.to_string()),
    };
    Err(ClientError::Api { status, kind, message })
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// `POST /auth/sign-up`
  pub async fn sign_up(&self, registration: &Registration) -> Result<Identity> {
    let req = self.client.post(self.url("/auth/sign-up")).json(registration);
    Self::decode(req.send().await?).await
  }

  /// `GET /me` with explicit credentials rather than the stored ones.
  pub async fn me_as(&self, credentials: &Credentials) -> Result<Account> {
    let req = self
      .client
      .get(self.url("/me"))
      .basic_auth(&credentials.email, Some(&credentials.password));
    Self::decode(req.send().await?).await
  }

  /// `GET /me`
  pub async fn me(&self) -> Result<Account> { self.send(self.client.get(self.url("/me"))).await }

  /// `GET /dashboard`
  pub async fn dashboard(&self) -> Result<Dashboard> {
    self.send(self.client.get(self.url("/dashboard"))).await
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  /// `GET /attendance`
  pub async fn attendance(&self) -> Result<Vec<AttendanceRow>> {
    self.send(self.client.get(self.url("/attendance"))).await
  }

  /// `GET /attendance/today`
  pub async fn today(&self) -> Result<TodayStatus> {
    self.send(self.client.get(self.url("/attendance/today"))).await
  }

  /// `POST /attendance/check-in`; `target` marks someone else.
  pub async fn check_in(&self, target: Option<Uuid>) -> Result<AttendanceRecord> {
    let req = self.client.post(self.url("/attendance/check-in")).json(&MarkBody { user_id: target });
    self.send(req).await
  }

  /// `POST /attendance/check-out`
  pub async fn check_out(&self, target: Option<Uuid>) -> Result<AttendanceRecord> {
    let req =
      self.client.post(self.url("/attendance/check-out")).json(&MarkBody { user_id: target });
    self.send(req).await
  }

  // ── Leave ─────────────────────────────────────────────────────────────────

  /// `GET /leaves`
  pub async fn leaves(&self) -> Result<Vec<LeaveRow>> {
    self.send(self.client.get(self.url("/leaves"))).await
  }

  /// `POST /leaves`
  pub async fn submit_leave(&self, application: &LeaveApplication) -> Result<LeaveRequest> {
    self.send(self.client.post(self.url("/leaves")).json(application)).await
  }

  /// `POST /leaves/{id}/approve` or `/reject`
  pub async fn review_leave(
    &self,
    id: Uuid,
    decision: Decision,
    notes: Option<String>,
  ) -> Result<LeaveRequest> {
    let verb = match decision {
      Decision::Approve => "approve",
      Decision::Reject => "reject",
    };
    let req = self
      .client
      .post(self.url(&format!("/leaves/{id}/{verb}")))
      .json(&json!({ "notes": notes }));
    self.send(req).await
  }

  // ── Directory ─────────────────────────────────────────────────────────────

  /// `GET /employees[?search=<text>]`
  pub async fn employees(&self, search: Option<&str>) -> Result<Vec<EmployeeEntry>> {
    let mut req = self.client.get(self.url("/employees"));
    if let Some(search) = search {
      req = req.query(&[("search", search)]);
    }
    self.send(req).await
  }

  /// `GET /employees/{id}`
  pub async fn employee(&self, id: Uuid) -> Result<Profile> {
    self.send(self.client.get(self.url(&format!("/employees/{id}")))).await
  }

  /// `PATCH /employees/{id}`
  pub async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile> {
    self.send(self.client.patch(self.url(&format!("/employees/{id}"))).json(update)).await
  }
}

// ─── Auth provider ────────────────────────────────────────────────────────────

/// Signs in by asking the server who the credentials belong to, then keeps
/// them on the client for later requests.
pub struct HttpAuth<'a> {
  client: &'a ApiClient,
}

impl<'a> HttpAuth<'a> {
  pub fn new(client: &'a ApiClient) -> Self { Self { client } }
}

impl AuthProvider for HttpAuth<'_> {
  async fn sign_in(&self, credentials: &Credentials) -> hris_core::Result<Identity> {
    let account = self.client.me_as(credentials).await?;
    self.client.set_credentials(Some(credentials.clone()));
    Ok(account.identity)
  }

  async fn sign_up(&self, registration: &Registration) -> hris_core::Result<Identity> {
    self.client.sign_up(registration).await.map_err(|e| match e.kind() {
      ErrorKind::Duplicate => Error::EmailTaken(registration.email.clone()),
      _ => e.into(),
    })
  }

  async fn sign_out(&self, _identity: &Identity) -> hris_core::Result<()> {
    self.client.set_credentials(None);
    Ok(())
  }
}
