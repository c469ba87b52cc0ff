//! Table definitions — the entries of the simulated warehouse schema.
//!
//! A table definition is pure description: a display name, the database it
//! is grouped under, and a free-form column listing. The schema text is never
//! parsed, only concatenated into the prompt context.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Origin ──────────────────────────────────────────────────────────────────

/// How a table definition entered the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableOrigin {
  /// Typed in by the user directly.
  #[default]
  Manual,
  /// Inferred from an uploaded file.
  Imported {
    /// Name of the originating file, if known.
    file_name: Option<String>,
  },
}

// ─── TableDefinition ─────────────────────────────────────────────────────────

/// A single schema entry. The `id` is assigned at creation and immutable;
/// every other field is replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
  pub id:          Uuid,
  /// Display name of the table.
  pub name:        String,
  /// Logical grouping; used for display and prompt-section headers only,
  /// never enforced unique.
  pub database:    String,
  /// Free-form multi-line column description, opaque to the system.
  pub schema_text: String,
  #[serde(default)]
  pub origin:      TableOrigin,
}

// ─── NewTable ────────────────────────────────────────────────────────────────

/// Input to [`crate::registry::SchemaRegistry::add`] and `update`.
/// The `id` is always assigned by the registry; it is not accepted from
/// callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTable {
  pub name:        String,
  pub database:    String,
  pub schema_text: String,
  #[serde(default)]
  pub origin:      TableOrigin,
}

impl NewTable {
  /// Convenience constructor for a manually-authored table.
  pub fn new(
    name: impl Into<String>,
    database: impl Into<String>,
    schema_text: impl Into<String>,
  ) -> Self {
    Self {
      name:        name.into(),
      database:    database.into(),
      schema_text: schema_text.into(),
      origin:      TableOrigin::Manual,
    }
  }

  /// Infer a table definition from an uploaded file.
  ///
  /// The table name is taken from the file stem, the database is the fixed
  /// `"Imported"` group, and the schema lines come from a CSV-style header
  /// row — each column listed as `- <name> (STRING)`. Anything richer (type
  /// sniffing, sampling) is left to the user to edit afterwards.
  pub fn from_import(file_name: &str, contents: &str) -> Result<Self> {
    let stem = file_name
      .rsplit('/')
      .next()
      .unwrap_or(file_name)
      .split('.')
      .next()
      .unwrap_or(file_name)
      .trim();

    let header = contents.lines().next().unwrap_or("").trim();
    let columns: Vec<&str> = header
      .split(',')
      .map(str::trim)
      .filter(|c| !c.is_empty())
      .collect();

    if stem.is_empty() || columns.is_empty() {
      return Err(Error::InvalidTable);
    }

    let schema_text = columns
      .iter()
      .map(|c| format!("- {c} (STRING)"))
      .collect::<Vec<_>>()
      .join("\n");

    Ok(Self {
      name: stem.to_string(),
      database: "Imported".to_string(),
      schema_text,
      origin: TableOrigin::Imported { file_name: Some(file_name.to_string()) },
    })
  }

  /// Reject blank required fields. Whitespace-only counts as blank.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty()
      || self.database.trim().is_empty()
      || self.schema_text.trim().is_empty()
    {
      return Err(Error::InvalidTable);
    }
    Ok(())
  }

  pub(crate) fn into_definition(self, id: Uuid) -> TableDefinition {
    TableDefinition {
      id,
      name: self.name,
      database: self.database,
      schema_text: self.schema_text,
      origin: self.origin,
    }
  }
}

// ─── Seed ────────────────────────────────────────────────────────────────────

/// The built-in example tables, used whenever no persisted snapshot exists
/// (or the stored blob cannot be read).
pub fn seed_tables() -> Vec<TableDefinition> {
  let mk = |name: &str, database: &str, schema_text: &str| TableDefinition {
    id:          Uuid::new_v4(),
    name:        name.to_string(),
    database:    database.to_string(),
    schema_text: schema_text.to_string(),
    origin:      TableOrigin::Manual,
  };

  vec![
    mk(
      "Sales",
      "Core_DWH",
      "- id (INT)\n- product_name (STRING)\n- category (STRING)\n- amount (FLOAT)\n- quantity (INT)\n- timestamp (DATE)\n- region (STRING)",
    ),
    mk(
      "Inventory",
      "Core_DWH",
      "- product_id (INT)\n- product_name (STRING)\n- stock_available (INT)\n- warehouse_location (STRING)\n- min_threshold (INT)",
    ),
    mk(
      "UsageLogs",
      "Monitoring",
      "- user_id (INT)\n- module_name (STRING)\n- duration_seconds (INT)\n- status (STRING: success, fail)\n- timestamp (DATE)",
    ),
  ]
}
