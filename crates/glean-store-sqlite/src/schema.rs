//! SQL schema for the glean SQLite store.
//!
//! Executed once at connection startup. There is no migration logic: a
//! change to the snapshot format bumps the blob key (see
//! [`crate::store::REGISTRY_KEY`]) and the old blob is simply left behind.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per named snapshot blob. Written in full on every mutation.
CREATE TABLE IF NOT EXISTS blobs (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,   -- JSON array of table definitions
    updated_at TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
