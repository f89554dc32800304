//! Identities, roles and employee profiles.
//!
//! An [`Identity`] is created by the auth provider at sign-up and never
//! changes afterwards. Everything a person can edit about themselves lives in
//! their [`Profile`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ─── Identity ────────────────────────────────────────────────────────────────

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id:    Uuid,
  pub email: String,
}

/// An identity together with the password hash the store keeps for it.
///
/// Only the auth provider sees this type; it is never serialised.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
  pub identity:      Identity,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Everything the store needs to create an identity and its profile at once.
#[derive(Debug, Clone)]
pub struct NewIdentity {
  pub email:         String,
  pub password_hash: String,
  pub name:          String,
  pub position:      Option<String>,
  pub department:    Option<String>,
  pub hire_date:     NaiveDate,
}

// ─── Role ────────────────────────────────────────────────────────────────────

/// Authorization level of an identity.
///
/// Stored as the presence (admin) or absence (member) of a role assignment
/// row; modelled here as an explicit variant.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Member,
  Admin,
}

impl Role {
  pub fn is_admin(self) -> bool { matches!(self, Self::Admin) }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Member => "member",
      Self::Admin => "admin",
    }
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// The directory entry for one identity (one-to-one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub id:         Uuid,
  pub name:       String,
  pub email:      String,
  pub position:   Option<String>,
  pub department: Option<String>,
  pub hire_date:  Option<NaiveDate>,
}

/// A profile as listed in the employee directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeEntry {
  #[serde(flatten)]
  pub profile: Profile,
  pub role:    Role,
}

impl EmployeeEntry {
  /// Case-insensitive substring match over name, email, department and
  /// position. `needle` must already be lowercase.
  pub fn matches(&self, needle: &str) -> bool {
    let p = &self.profile;
    p.name.to_lowercase().contains(needle)
      || p.email.to_lowercase().contains(needle)
      || p
        .department
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(needle))
      || p
        .position
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(needle))
  }
}

/// Who the signed-in identity is, as returned by the sign-in check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub identity: Identity,
  pub profile:  Profile,
  pub role:     Role,
}

/// The editable subset of a profile. Email and hire date are immutable
/// through this path.
///
/// `None` leaves a field untouched. A blank position or department clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
  #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
  pub name:       Option<String>,
  pub position:   Option<String>,
  pub department: Option<String>,
}

impl ProfileUpdate {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.position.is_none() && self.department.is_none()
  }

  /// Trim every supplied field.
  pub fn normalized(self) -> Self {
    Self {
      name:       self.name.map(|s| s.trim().to_owned()),
      position:   self.position.map(|s| s.trim().to_owned()),
      department: self.department.map(|s| s.trim().to_owned()),
    }
  }
}
