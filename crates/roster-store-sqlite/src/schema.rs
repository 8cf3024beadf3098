//! SQL schema for the roster SQLite store.
//!
//! Gated on `PRAGMA user_version`. There is no migration path: a database
//! written by an incompatible schema version is dropped and recreated.

/// Version stamped into `PRAGMA user_version` after [`SCHEMA`] runs.
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS records (
    id             TEXT PRIMARY KEY,
    first_name     TEXT NOT NULL,
    last_name      TEXT NOT NULL,
    email          TEXT NOT NULL,
    phone          TEXT NOT NULL DEFAULT '',
    date_of_birth  TEXT NOT NULL DEFAULT '',   -- display string, e.g. 'Jan 05, 1990'
    picture_url    TEXT NOT NULL DEFAULT '',
    gender         TEXT NOT NULL DEFAULT '',
    country        TEXT NOT NULL DEFAULT '',
    city           TEXT NOT NULL DEFAULT '',
    street         TEXT NOT NULL DEFAULT '',
    is_manual      INTEGER NOT NULL,           -- 0 = remote import, 1 = manual
    lookup_key     TEXT NOT NULL UNIQUE,       -- 'RECORDTAG:' || id
    created_at     INTEGER NOT NULL,           -- epoch milliseconds
    updated_at     INTEGER NOT NULL,           -- epoch milliseconds
    CHECK (lookup_key = 'RECORDTAG:' || id)
);

CREATE INDEX IF NOT EXISTS records_created_idx  ON records(created_at);
CREATE INDEX IF NOT EXISTS records_manual_idx   ON records(is_manual);
CREATE INDEX IF NOT EXISTS records_name_idx     ON records(first_name, last_name);
";

/// Tear-down run before [`SCHEMA`] when the stored version is incompatible.
pub const DROP_ALL: &str = "
DROP TABLE IF EXISTS records;
PRAGMA user_version = 0;
";
