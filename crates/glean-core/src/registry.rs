//! The schema registry — the ordered collection of table definitions.
//!
//! Entries keep their insertion order for display; the prompt serialization
//! groups them by database in first-seen order. The registry itself is pure
//! in-memory state; callers persist the full snapshot through a
//! [`crate::store::RegistryStore`] after every mutation.

use uuid::Uuid;

use crate::{
  Result,
  table::{NewTable, TableDefinition, TableOrigin},
};

/// Insertion-order-preserving collection of [`TableDefinition`]s.
///
/// Ids are unique for the registry's lifetime: they are always assigned here
/// via `Uuid::new_v4`, never accepted from callers.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
  tables: Vec<TableDefinition>,
}

impl SchemaRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Rebuild a registry from a persisted snapshot, order preserved.
  pub fn from_snapshot(tables: Vec<TableDefinition>) -> Self {
    Self { tables }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Validate and append a new table, returning its freshly-assigned id.
  pub fn add(&mut self, input: NewTable) -> Result<Uuid> {
    input.validate()?;
    let id = Uuid::new_v4();
    self.tables.push(input.into_definition(id));
    Ok(id)
  }

  /// Replace every field except `id` on the entry matching `id`.
  ///
  /// An unknown id is silently ignored, matching the original behavior; the
  /// returned bool reports whether anything matched so callers can choose to
  /// surface it.
  pub fn update(&mut self, id: Uuid, input: NewTable) -> Result<bool> {
    input.validate()?;
    match self.tables.iter_mut().find(|t| t.id == id) {
      Some(entry) => {
        *entry = input.into_definition(id);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Delete the entry if present; removing an absent id is a no-op.
  pub fn remove(&mut self, id: Uuid) -> bool {
    let before = self.tables.len();
    self.tables.retain(|t| t.id != id);
    self.tables.len() != before
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn get(&self, id: Uuid) -> Option<&TableDefinition> {
    self.tables.iter().find(|t| t.id == id)
  }

  pub fn tables(&self) -> &[TableDefinition] {
    &self.tables
  }

  /// Owned copy of the current contents — the persistence snapshot.
  pub fn snapshot(&self) -> Vec<TableDefinition> {
    self.tables.clone()
  }

  pub fn len(&self) -> usize {
    self.tables.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tables.is_empty()
  }

  /// Number of distinct databases across all entries.
  pub fn database_count(&self) -> usize {
    let mut seen: Vec<&str> = Vec::new();
    for t in &self.tables {
      if !seen.contains(&t.database.as_str()) {
        seen.push(&t.database);
      }
    }
    seen.len()
  }

  // ── Serialization ─────────────────────────────────────────────────────────

  /// Render all entries as the schema block of the prompt context.
  ///
  /// Entries are grouped under `DATABASE:` headers in first-seen order, each
  /// table's schema text reindented as a nested block. The output is a pure
  /// function of the current contents and ordering.
  pub fn serialize(&self) -> String {
    let mut databases: Vec<&str> = Vec::new();
    for t in &self.tables {
      if !databases.contains(&t.database.as_str()) {
        databases.push(&t.database);
      }
    }

    let blocks: Vec<String> = databases
      .iter()
      .map(|db| {
        let tables: Vec<String> = self
          .tables
          .iter()
          .filter(|t| t.database == *db)
          .map(format_table)
          .collect();
        format!("DATABASE: {db}\n{}", tables.join("\n\n"))
      })
      .collect();

    blocks.join("\n\n")
  }
}

fn format_table(table: &TableDefinition) -> String {
  let header = match &table.origin {
    TableOrigin::Manual => format!("  TABLE: {}", table.name),
    TableOrigin::Imported { .. } => format!("  TABLE: {} (imported)", table.name),
  };
  let body = table
    .schema_text
    .lines()
    .map(|l| format!("    {l}"))
    .collect::<Vec<_>>()
    .join("\n");
  format!("{header}\n{body}")
}
