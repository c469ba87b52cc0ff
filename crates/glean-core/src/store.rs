//! The `RegistryStore` trait — the persistence seam for the schema registry.
//!
//! The registry is persisted as a whole snapshot: read once at process start,
//! written in full after every mutation. Backends (e.g. `glean-store-sqlite`)
//! implement this; higher layers depend on the abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::table::TableDefinition;

/// Abstraction over a registry-snapshot store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the persisted snapshot.
  ///
  /// Returns `Ok(None)` when no snapshot exists — including when a stored
  /// blob is present but unreadable, which implementations recover locally
  /// (the caller falls back to the built-in seed list; the failure is never
  /// surfaced to the user).
  fn load(
    &self,
  ) -> impl Future<Output = Result<Option<Vec<TableDefinition>>, Self::Error>> + Send + '_;

  /// Persist the full snapshot, replacing whatever was stored before.
  fn save<'a>(
    &'a self,
    tables: &'a [TableDefinition],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
