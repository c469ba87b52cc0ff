//! [`SqliteStore`] — the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use glean_core::{store::RegistryStore, table::TableDefinition};

use crate::{Error, Result, schema::SCHEMA};

/// The fixed key the registry snapshot is stored under. Format changes bump
/// this name instead of migrating (`v2` → `v3` happened when the origin tag
/// was added).
pub const REGISTRY_KEY: &str = "dwh_tables_v3";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A glean registry store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
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

  /// Open an in-memory store — useful for testing.
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

  async fn read_blob(&self) -> Result<Option<String>> {
    let raw: Option<String> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM blobs WHERE key = ?1",
              rusqlite::params![REGISTRY_KEY],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = Error;

  async fn load(&self) -> Result<Option<Vec<TableDefinition>>> {
    let raw = match self.read_blob().await? {
      Some(raw) => raw,
      None => return Ok(None),
    };

    // A corrupt blob is recovered locally: warn and report "no snapshot" so
    // the caller falls back to the built-in seed list.
    match serde_json::from_str(&raw) {
      Ok(tables) => Ok(Some(tables)),
      Err(e) => {
        tracing::warn!(key = REGISTRY_KEY, error = %e, "stored registry blob is unreadable, falling back to seed");
        Ok(None)
      }
    }
  }

  async fn save(&self, tables: &[TableDefinition]) -> Result<()> {
    let value = serde_json::to_string(tables)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO blobs (key, value, updated_at)
           VALUES (?1, ?2, datetime('now'))
           ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
          rusqlite::params![REGISTRY_KEY, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Overwrite the snapshot blob with arbitrary text — corruption injection
  /// for tests.
  pub(crate) async fn write_raw_blob(&self, raw: &str) -> Result<()> {
    let raw = raw.to_string();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO blobs (key, value, updated_at)
           VALUES (?1, ?2, datetime('now'))
           ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
          rusqlite::params![REGISTRY_KEY, raw],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
