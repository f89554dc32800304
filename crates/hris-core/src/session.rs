//! Session context — the current identity and the provider that issues it.
//!
//! The [`AuthProvider`] trait is implemented on the server side by the
//! password-hash verifier in `hris-api` and on the client side by the HTTP
//! client in `hris-cli`. [`SessionContext`] wraps either one, validates input
//! before any remote call, and publishes the signed-in identity through a
//! [`tokio::sync::watch`] channel so interested parties can react to changes.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;
use validator::Validate;

use crate::{Error, Result, identity::Identity};

// ─── Input types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
  #[validate(email(message = "Invalid email address"))]
  pub email:    String,
  #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
  pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Registration {
  #[validate(email(message = "Invalid email address"))]
  pub email:      String,
  #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
  pub password:   String,
  #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
  pub name:       String,
  #[validate(length(min = 2, message = "Position is required"))]
  pub position:   String,
  #[validate(length(min = 2, message = "Department is required"))]
  pub department: String,
}

impl Credentials {
  /// Normalize the email and validate. Run on both sides of the wire.
  pub fn prepare(self) -> Result<Self> {
    let credentials = Self { email: self.email.trim().to_lowercase(), password: self.password };
    credentials.validate()?;
    Ok(credentials)
  }
}

impl Registration {
  /// [`normalized`](Self::normalized), then validated.
  pub fn prepare(self) -> Result<Self> {
    let registration = self.normalized();
    registration.validate()?;
    Ok(registration)
  }

  /// Trim every field and lowercase the email.
  pub fn normalized(self) -> Self {
    Self {
      email:      self.email.trim().to_lowercase(),
      password:   self.password,
      name:       self.name.trim().to_owned(),
      position:   self.position.trim().to_owned(),
      department: self.department.trim().to_owned(),
    }
  }
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// The identity provider behind a session.
pub trait AuthProvider: Send + Sync {
  /// Verify `credentials` and return the identity they belong to.
  fn sign_in<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = Result<Identity>> + Send + 'a;

  /// Create a new identity with its profile. Does not sign it in.
  fn sign_up<'a>(
    &'a self,
    registration: &'a Registration,
  ) -> impl Future<Output = Result<Identity>> + Send + 'a;

  /// Forget any provider-side state held for `identity`.
  fn sign_out<'a>(
    &'a self,
    identity: &'a Identity,
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}

// ─── Context ─────────────────────────────────────────────────────────────────

type SignOutHook = Box<dyn Fn(&Identity) + Send + Sync>;

/// Holds the signed-in identity for one client.
pub struct SessionContext<A> {
  provider:    A,
  current:     watch::Sender<Option<Identity>>,
  on_sign_out: Vec<SignOutHook>,
}

impl<A: AuthProvider> SessionContext<A> {
  pub fn new(provider: A) -> Self {
    let (current, _) = watch::channel(None);
    Self { provider, current, on_sign_out: Vec::new() }
  }

  pub fn provider(&self) -> &A { &self.provider }

  /// Register a callback run with the outgoing identity on sign-out, e.g. to
  /// invalidate a role cache entry.
  pub fn on_sign_out(&mut self, hook: impl Fn(&Identity) + Send + Sync + 'static) {
    self.on_sign_out.push(Box::new(hook));
  }

  /// Watch the current identity.
  pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> { self.current.subscribe() }

  pub fn current(&self) -> Option<Identity> { self.current.borrow().clone() }

  /// The current identity, or [`Error::NotSignedIn`].
  pub fn require(&self) -> Result<Identity> { self.current().ok_or(Error::NotSignedIn) }

  pub async fn sign_in(&self, credentials: Credentials) -> Result<Identity> {
    let credentials = credentials.prepare()?;

    let identity = self.provider.sign_in(&credentials).await?;
    info!(user_id = %identity.id, "signed in");
    self.current.send_replace(Some(identity.clone()));
    Ok(identity)
  }

  pub async fn sign_up(&self, registration: Registration) -> Result<Identity> {
    let registration = registration.prepare()?;

    let identity = self.provider.sign_up(&registration).await?;
    info!(user_id = %identity.id, "signed up");
    Ok(identity)
  }

  /// Clear the session. A no-op when nobody is signed in.
  pub async fn sign_out(&self) -> Result<()> {
    let Some(identity) = self.current() else {
      return Ok(());
    };
    self.provider.sign_out(&identity).await?;
    for hook in &self.on_sign_out {
      hook(&identity);
    }
    self.current.send_replace(None);
    info!(user_id = %identity.id, "signed out");
    Ok(())
  }
}
