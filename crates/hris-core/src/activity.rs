//! Activity log — an append-only feed of notable actions, kept for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many entries the dashboard feed shows.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
  Attendance,
  Leave,
  Profile,
}

impl ActivityAction {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Attendance => "attendance",
      Self::Leave => "leave",
      Self::Profile => "profile",
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub action:      ActivityAction,
  pub description: String,
  pub created_at:  DateTime<Utc>,
}

/// An entry joined with the display name of the identity that acted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRow {
  #[serde(flatten)]
  pub entry:      ActivityEntry,
  pub actor_name: String,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
  pub user_id:     Uuid,
  pub action:      ActivityAction,
  pub description: String,
  pub created_at:  DateTime<Utc>,
}
