//! [`SqliteStore`] — the SQLite implementation of [`HrStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use hris_core::{
  activity::{ActivityEntry, ActivityRow, NewActivity},
  attendance::{AttendanceRecord, AttendanceRow, NewAttendance},
  identity::{
    EmployeeEntry, Identity, NewIdentity, Profile, ProfileUpdate, Role, StoredCredentials,
  },
  leave::{LeaveRequest, LeaveRow, LeaveStatus, NewLeave},
  store::{AttendanceQuery, HrStore, LeaveQuery, LeaveReview},
};

use crate::{
  Error, Result,
  encode::{
    ACTIVITY_COLUMNS, ATTENDANCE_COLUMNS, LEAVE_COLUMNS, Named, PROFILE_COLUMNS, RawActivity,
    RawAttendance, RawEmployee, RawLeave, RawProfile, decode_uuid, encode_date, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An HRIS data store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Resolve an email to its identity, for operator commands.
  pub async fn find_identity(&self, email: &str) -> Result<Option<Identity>> {
    Ok(self.find_credentials(email).await?.map(|c| c.identity))
  }

  async fn fetch_attendance(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
    let user_str = encode_uuid(user_id);
    let date_str = encode_date(date);

    let raw: Option<RawAttendance> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance a WHERE a.user_id = ?1 AND a.date = ?2"),
              rusqlite::params![user_str, date_str],
              RawAttendance::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAttendance::into_record).transpose()
  }

  async fn fetch_leave(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawLeave> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {LEAVE_COLUMNS} FROM leaves l WHERE l.id = ?1"),
              rusqlite::params![id_str],
              RawLeave::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLeave::into_request).transpose()
  }
}

// ─── HrStore impl ────────────────────────────────────────────────────────────

impl HrStore for SqliteStore {
  type Error = Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn create_identity(&self, input: NewIdentity) -> Result<Identity> {
    let identity = Identity { id: Uuid::new_v4(), email: input.email };

    let id_str     = encode_uuid(identity.id);
    let email      = identity.email.clone();
    let now_str    = encode_dt(Utc::now());
    let hire_str   = encode_date(input.hire_date);
    let hash       = input.password_hash;
    let name       = input.name;
    let position   = input.position;
    let department = input.department;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO identities (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email, hash, now_str],
        )?;
        tx.execute(
          "INSERT INTO profiles (id, name, email, position, department, hire_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, email, position, department, hire_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(identity)
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<StoredCredentials>> {
    let email = email.to_owned();

    let raw: Option<(String, String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, email, password_hash FROM identities WHERE email = ?1",
              rusqlite::params![email],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(id, email, password_hash)| {
        Ok(StoredCredentials {
          identity: Identity { id: decode_uuid(&id)?, email },
          password_hash,
        })
      })
      .transpose()
  }

  // ── Roles ─────────────────────────────────────────────────────────────────

  async fn role_of(&self, user_id: Uuid) -> Result<Role> {
    let id_str = encode_uuid(user_id);

    let admin: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM user_roles WHERE user_id = ?1 AND role = 'admin'",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(if admin { Role::Admin } else { Role::Member })
  }

  async fn set_role(&self, user_id: Uuid, role: Role) -> Result<()> {
    let id_str = encode_uuid(user_id);

    self
      .conn
      .call(move |conn| {
        match role {
          Role::Admin => conn.execute(
            "INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, 'admin')",
            rusqlite::params![id_str],
          )?,
          Role::Member => conn.execute(
            "DELETE FROM user_roles WHERE user_id = ?1 AND role = 'admin'",
            rusqlite::params![id_str],
          )?,
        };
        Ok(())
      })
      .await?;

    debug!(%user_id, role = role.as_str(), "role assignment written");
    Ok(())
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLUMNS} FROM profiles p WHERE p.id = ?1"),
              rusqlite::params![id_str],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn list_profiles(&self) -> Result<Vec<EmployeeEntry>> {
    let raws: Vec<RawEmployee> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROFILE_COLUMNS},
             EXISTS (SELECT 1 FROM user_roles r WHERE r.user_id = p.id AND r.role = 'admin')
           FROM profiles p
           ORDER BY p.name COLLATE NOCASE, p.rowid"
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawEmployee { profile: RawProfile::from_row(row)?, is_admin: row.get(6)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployee::into_entry).collect()
  }

  async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<Option<Profile>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        // NULL keeps the column; an empty string clears an optional one.
        let changed = conn.execute(
          "UPDATE profiles SET
             name       = COALESCE(?2, name),
             position   = CASE WHEN ?3 IS NULL THEN position
                               WHEN ?3 = ''    THEN NULL ELSE ?3 END,
             department = CASE WHEN ?4 IS NULL THEN department
                               WHEN ?4 = ''    THEN NULL ELSE ?4 END
           WHERE id = ?1",
          rusqlite::params![id_str, update.name, update.position, update.department],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(conn.query_row(
          &format!("SELECT {PROFILE_COLUMNS} FROM profiles p WHERE p.id = ?1"),
          rusqlite::params![id_str],
          RawProfile::from_row,
        )?))
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn count_profiles(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM profiles", [], |r| r.get(0))?))
      .await?;
    Ok(n as u64)
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn insert_attendance(&self, input: NewAttendance) -> Result<AttendanceRecord> {
    let record = AttendanceRecord {
      id:        Uuid::new_v4(),
      user_id:   input.user_id,
      date:      input.date,
      check_in:  Some(input.check_in),
      check_out: None,
    };

    let id_str   = encode_uuid(record.id);
    let user_str = encode_uuid(record.user_id);
    let date_str = encode_date(record.date);
    let in_str   = encode_dt(input.check_in);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO attendance (id, user_id, date, check_in) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, user_str, date_str, in_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn close_attendance(
    &self,
    user_id: Uuid,
    date:    NaiveDate,
    at:      DateTime<Utc>,
  ) -> Result<Option<AttendanceRecord>> {
    let user_str = encode_uuid(user_id);
    let date_str = encode_date(date);
    let at_str   = encode_dt(at);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE attendance SET check_out = ?3
           WHERE user_id = ?1 AND date = ?2 AND check_out IS NULL",
          rusqlite::params![user_str, date_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.fetch_attendance(user_id, date).await
  }

  async fn get_attendance(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
    self.fetch_attendance(user_id, date).await
  }

  async fn list_attendance(&self, query: &AttendanceQuery) -> Result<Vec<AttendanceRow>> {
    let user_str  = query.user_id.map(encode_uuid);
    let date_str  = query.date.map(encode_date);
    // SQLite treats a negative LIMIT as unbounded.
    let limit_val = query.limit.map_or(-1, |n| n as i64);

    let raws: Vec<Named<RawAttendance>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ATTENDANCE_COLUMNS}, COALESCE(p.name, '')
           FROM attendance a
           LEFT JOIN profiles p ON p.id = a.user_id
           WHERE (?1 IS NULL OR a.user_id = ?1)
             AND (?2 IS NULL OR a.date = ?2)
           ORDER BY a.date DESC, a.rowid
           LIMIT ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, date_str, limit_val], |row| {
            Ok(Named { raw: RawAttendance::from_row(row)?, name: row.get(5)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(Named::<RawAttendance>::into_row).collect()
  }

  async fn count_attendance(&self, date: NaiveDate) -> Result<u64> {
    let date_str = encode_date(date);
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM attendance WHERE date = ?1",
          rusqlite::params![date_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  // ── Leave ─────────────────────────────────────────────────────────────────

  async fn insert_leave(&self, input: NewLeave) -> Result<LeaveRequest> {
    let app = input.application;
    let request = LeaveRequest {
      id:           Uuid::new_v4(),
      user_id:      input.user_id,
      leave_type:   app.leave_type,
      start_date:   app.start_date,
      end_date:     app.end_date,
      reason:       app.reason,
      status:       LeaveStatus::Pending,
      reviewed_by:  None,
      reviewed_at:  None,
      review_notes: None,
      created_at:   input.created_at,
    };

    let id_str    = encode_uuid(request.id);
    let user_str  = encode_uuid(request.user_id);
    let type_str  = request.leave_type.as_str();
    let start_str = encode_date(request.start_date);
    let end_str   = encode_date(request.end_date);
    let reason    = request.reason.clone();
    let at_str    = encode_dt(request.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO leaves (id, user_id, type, start_date, end_date, reason, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7)",
          rusqlite::params![id_str, user_str, type_str, start_str, end_str, reason, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(request)
  }

  async fn get_leave(&self, id: Uuid) -> Result<Option<LeaveRequest>> { self.fetch_leave(id).await }

  async fn review_leave(&self, id: Uuid, review: LeaveReview) -> Result<Option<LeaveRequest>> {
    let id_str     = encode_uuid(id);
    let status_str = review.status.as_str();
    let by_str     = encode_uuid(review.reviewed_by);
    let at_str     = encode_dt(review.reviewed_at);
    let notes      = review.notes;

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE leaves
           SET status = ?2, reviewed_by = ?3, reviewed_at = ?4, review_notes = ?5
           WHERE id = ?1 AND status = 'pending'",
          rusqlite::params![id_str, status_str, by_str, at_str, notes],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.fetch_leave(id).await
  }

  async fn list_leaves(&self, query: &LeaveQuery) -> Result<Vec<LeaveRow>> {
    let user_str   = query.user_id.map(encode_uuid);
    let status_str = query.status.map(LeaveStatus::as_str);

    let raws: Vec<Named<RawLeave>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LEAVE_COLUMNS}, COALESCE(p.name, '')
           FROM leaves l
           LEFT JOIN profiles p ON p.id = l.user_id
           WHERE (?1 IS NULL OR l.user_id = ?1)
             AND (?2 IS NULL OR l.status = ?2)
           ORDER BY l.created_at DESC, l.rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, status_str], |row| {
            Ok(Named { raw: RawLeave::from_row(row)?, name: row.get(11)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(Named::<RawLeave>::into_row).collect()
  }

  async fn count_leaves(&self, status: Option<LeaveStatus>) -> Result<u64> {
    let status_str = status.map(LeaveStatus::as_str);
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM leaves WHERE (?1 IS NULL OR status = ?1)",
          rusqlite::params![status_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  // ── Activity log ──────────────────────────────────────────────────────────

  async fn append_activity(&self, input: NewActivity) -> Result<ActivityEntry> {
    let entry = ActivityEntry {
      id:          Uuid::new_v4(),
      user_id:     input.user_id,
      action:      input.action,
      description: input.description,
      created_at:  input.created_at,
    };

    let id_str      = encode_uuid(entry.id);
    let user_str    = encode_uuid(entry.user_id);
    let action_str  = entry.action.as_str();
    let description = entry.description.clone();
    let at_str      = encode_dt(entry.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO activity_logs (id, user_id, action, description, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, user_str, action_str, description, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityRow>> {
    let limit_val = limit as i64;

    let raws: Vec<Named<RawActivity>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ACTIVITY_COLUMNS}, COALESCE(p.name, 'Unknown')
           FROM activity_logs g
           LEFT JOIN profiles p ON p.id = g.user_id
           ORDER BY g.created_at DESC, g.rowid DESC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| {
            Ok(Named { raw: RawActivity::from_row(row)?, name: row.get(5)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(Named::<RawActivity>::into_row).collect()
  }
}
