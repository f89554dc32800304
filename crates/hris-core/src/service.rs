//! [`Hris`] — the shared context behind every engine.
//!
//! Holds the store, the role resolver, the clock and the per-call timeout.
//! Engines are short-lived views borrowed from it:
//!
//! ```rust,ignore
//! let hris = Hris::new(Arc::new(store), &HrisConfig::default());
//! let record = hris.attendance().check_in(&actor, actor.id).await?;
//! ```

use std::{future::Future, sync::Arc, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  activity::{ActivityAction, NewActivity},
  attendance::{AttendanceEngine, MarkingPolicy},
  clock::{Clock, SystemClock},
  dashboard::DashboardView,
  directory::DirectoryView,
  identity::{Identity, NewIdentity, Role, StoredCredentials},
  leave::LeaveWorkflow,
  remote,
  role::RoleResolver,
  store::HrStore,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Tunables for the engines.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HrisConfig {
  pub attendance_policy:   MarkingPolicy,
  /// `0` disables role caching.
  pub role_cache_ttl_secs: u64,
  pub call_timeout_secs:   u64,
}

impl Default for HrisConfig {
  fn default() -> Self {
    Self {
      attendance_policy:   MarkingPolicy::default(),
      role_cache_ttl_secs: 300,
      call_timeout_secs:   10,
    }
  }
}

// ─── Context ─────────────────────────────────────────────────────────────────

pub struct Hris<S> {
  pub(crate) store:        Arc<S>,
  pub(crate) roles:        RoleResolver<S>,
  pub(crate) clock:        Arc<dyn Clock>,
  pub(crate) call_timeout: Duration,
  pub(crate) policy:       MarkingPolicy,
}

impl<S: HrStore> Hris<S> {
  pub fn new(store: Arc<S>, config: &HrisConfig) -> Self {
    let call_timeout = Duration::from_secs(config.call_timeout_secs);
    let ttl = Duration::from_secs(config.role_cache_ttl_secs);
    Self {
      roles: RoleResolver::new(Arc::clone(&store), Some(ttl), call_timeout),
      store,
      clock: Arc::new(SystemClock),
      call_timeout,
      policy: config.attendance_policy,
    }
  }

  /// Replace the wall clock.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn roles(&self) -> &RoleResolver<S> { &self.roles }

  pub fn clock(&self) -> &dyn Clock { self.clock.as_ref() }

  pub fn policy(&self) -> MarkingPolicy { self.policy }

  // ── Engines ───────────────────────────────────────────────────────────

  pub fn attendance(&self) -> AttendanceEngine<'_, S> { AttendanceEngine::new(self) }

  pub fn leaves(&self) -> LeaveWorkflow<'_, S> { LeaveWorkflow::new(self) }

  pub fn directory(&self) -> DirectoryView<'_, S> { DirectoryView::new(self) }

  pub fn dashboard(&self) -> DashboardView<'_, S> { DashboardView::new(self) }

  // ── Identities and roles ──────────────────────────────────────────────

  /// Credentials registered for `email`, for an [`AuthProvider`] to verify.
  ///
  /// [`AuthProvider`]: crate::session::AuthProvider
  pub async fn find_credentials(&self, email: &str) -> Result<Option<StoredCredentials>> {
    self.call("find_credentials", self.store.find_credentials(email)).await
  }

  /// Create an identity with its profile.
  pub async fn register(&self, input: NewIdentity) -> Result<Identity> {
    let email = input.email.clone();
    match self.call("create_identity", self.store.create_identity(input)).await {
      Ok(identity) => {
        info!(user_id = %identity.id, "identity registered");
        Ok(identity)
      }
      Err(Error::Conflict(_)) => Err(Error::EmailTaken(email)),
      Err(e) => Err(e),
    }
  }

  /// Grant or revoke the admin role and drop the cached role so the change
  /// is seen on the next check.
  pub async fn assign_role(&self, user_id: Uuid, role: Role) -> Result<()> {
    self.call("set_role", self.store.set_role(user_id, role)).await?;
    self.roles.invalidate(user_id);
    info!(%user_id, role = role.as_str(), "role assigned");
    Ok(())
  }

  // ── Shared helpers ────────────────────────────────────────────────────

  /// Run a store call under the configured timeout.
  pub(crate) async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T>
  where
    F: Future<Output = Result<T, S::Error>>,
  {
    remote::call(op, self.call_timeout, fut).await
  }

  pub(crate) async fn role_of(&self, actor: &Identity) -> Result<Role> {
    self.roles.resolve(actor.id).await
  }

  pub(crate) async fn require_admin(&self, actor: &Identity, action: &'static str) -> Result<()> {
    if self.role_of(actor).await?.is_admin() {
      Ok(())
    } else {
      warn!(actor = %actor.id, action, "refused: admin role required");
      Err(Error::AdminRequired { action })
    }
  }

  /// Append to the activity log. The mutation being logged has already taken
  /// effect, so a failure here is reported but not propagated.
  pub(crate) async fn log_activity(
    &self,
    user_id: Uuid,
    action: ActivityAction,
    description: impl Into<String>,
  ) {
    let entry = NewActivity {
      user_id,
      action,
      description: description.into(),
      created_at: self.clock.now(),
    };
    if let Err(e) = self.call("append_activity", self.store.append_activity(entry)).await {
      warn!(%user_id, action = action.as_str(), error = %e, "failed to append activity");
    }
  }
}
