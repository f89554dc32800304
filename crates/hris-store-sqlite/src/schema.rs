//! SQL schema for the HRIS SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for later migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS identities (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- One row per identity, created alongside it.
CREATE TABLE IF NOT EXISTS profiles (
    id         TEXT PRIMARY KEY REFERENCES identities(id),
    name       TEXT NOT NULL,
    email      TEXT NOT NULL,
    position   TEXT,
    department TEXT,
    hire_date  TEXT              -- YYYY-MM-DD
);

-- Presence of an 'admin' row grants the admin role; absence means member.
CREATE TABLE IF NOT EXISTS user_roles (
    user_id TEXT NOT NULL REFERENCES identities(id),
    role    TEXT NOT NULL,
    UNIQUE (user_id, role)
);

-- Never deleted. The only update sets check_out on an open record.
CREATE TABLE IF NOT EXISTS attendance (
    id        TEXT PRIMARY KEY,
    user_id   TEXT NOT NULL REFERENCES profiles(id),
    date      TEXT NOT NULL,     -- UTC calendar day, YYYY-MM-DD
    check_in  TEXT,
    check_out TEXT,
    UNIQUE (user_id, date),
    CHECK  (check_out IS NULL OR check_in IS NOT NULL)
);

-- Never deleted. The only update stamps a review onto a pending request.
CREATE TABLE IF NOT EXISTS leaves (
    id           TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES profiles(id),
    type         TEXT NOT NULL,  -- 'sick' | 'vacation' | 'personal' | 'other'
    start_date   TEXT NOT NULL,
    end_date     TEXT NOT NULL,
    reason       TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'pending',
    reviewed_by  TEXT REFERENCES profiles(id),
    reviewed_at  TEXT,
    review_notes TEXT,
    created_at   TEXT NOT NULL,
    CHECK (start_date <= end_date),
    CHECK (status IN ('pending', 'approved', 'rejected'))
);

CREATE TABLE IF NOT EXISTS activity_logs (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES profiles(id),
    action      TEXT NOT NULL,   -- 'attendance' | 'leave' | 'profile'
    description TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS attendance_date_idx   ON attendance(date);
CREATE INDEX IF NOT EXISTS leaves_user_idx       ON leaves(user_id);
CREATE INDEX IF NOT EXISTS leaves_status_idx     ON leaves(status);
CREATE INDEX IF NOT EXISTS activity_created_idx  ON activity_logs(created_at);

PRAGMA user_version = 1;
";
