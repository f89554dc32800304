//! Password authentication: the server-side [`AuthProvider`] and the HTTP
//! Basic-auth extractor built on it.

use std::sync::{Arc, LazyLock};

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use hris_core::{
  Error, Hris, Result,
  identity::{Identity, NewIdentity},
  session::{AuthProvider, Credentials, Registration},
  store::HrStore,
};
use rand_core::OsRng;
use tracing::debug;

use crate::{AppState, error::ApiError};

// ─── Hashing ─────────────────────────────────────────────────────────────────

/// Produce the argon2 PHC string stored for `password`.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Store(format!("argon2 error: {e}").into()))
}

/// Verified against when the email is unknown, so both sign-in failures pay
/// for one argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
  LazyLock::new(|| hash_password("no account has this password").ok());

fn verify_password(password: &str, phc: &str) -> Result<()> {
  let parsed = PasswordHash::new(phc).map_err(|_| Error::InvalidCredentials)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| Error::InvalidCredentials)
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// Verifies email and password against the hashes kept in the store.
pub struct StoreAuth<S> {
  hris: Arc<Hris<S>>,
}

impl<S: HrStore> StoreAuth<S> {
  pub fn new(hris: Arc<Hris<S>>) -> Self { Self { hris } }
}

impl<S: HrStore> AuthProvider for StoreAuth<S> {
  async fn sign_in(&self, credentials: &Credentials) -> Result<Identity> {
    let Some(stored) = self.hris.find_credentials(&credentials.email).await? else {
      debug!("sign-in for unknown email");
      if let Some(phc) = DUMMY_HASH.as_deref() {
        let _ = verify_password(&credentials.password, phc);
      }
      return Err(Error::InvalidCredentials);
    };
    verify_password(&credentials.password, &stored.password_hash)?;
    Ok(stored.identity)
  }

  async fn sign_up(&self, registration: &Registration) -> Result<Identity> {
    let password_hash = hash_password(&registration.password)?;
    self
      .hris
      .register(NewIdentity {
        email: registration.email.clone(),
        password_hash,
        name: registration.name.clone(),
        position: Some(registration.position.clone()),
        department: Some(registration.department.clone()),
        hire_date: self.hris.clock().today(),
      })
      .await
  }

  /// Requests are authenticated one by one, so the only state to drop is the
  /// cached role.
  async fn sign_out(&self, identity: &Identity) -> Result<()> {
    self.hris.roles().invalidate(identity.id);
    Ok(())
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The identity a request authenticated as.
pub struct Authenticated(pub Identity);

/// Decode `Authorization: Basic base64(email:password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Result<Credentials> {
  let encoded = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(Error::NotSignedIn)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::InvalidCredentials)?;
  let pair = std::str::from_utf8(&decoded).map_err(|_| Error::InvalidCredentials)?;
  let (email, password) = pair.split_once(':').ok_or(Error::InvalidCredentials)?;

  Ok(Credentials { email: email.trim().to_lowercase(), password: password.to_owned() })
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: HrStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let credentials = basic_credentials(&parts.headers)?;
    let identity = state.auth.sign_in(&credentials).await?;
    Ok(Authenticated(identity))
  }
}
