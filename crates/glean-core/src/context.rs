//! Prompt-context assembly.
//!
//! The context is the serialized schema block plus a fixed block of
//! situational facts. It is recomputed from the registry on every request —
//! schemas are small and edited rarely, so there is no cache to invalidate.

use chrono::NaiveDate;

use crate::registry::SchemaRegistry;

/// Situational facts appended after the schema block.
#[derive(Debug, Clone)]
pub struct ContextFacts {
  pub current_date: NaiveDate,
  pub currency:     String,
  /// Canned environment notes (headline KPIs, alerts).
  pub notes:        Vec<String>,
}

impl Default for ContextFacts {
  fn default() -> Self {
    Self {
      current_date: chrono::Utc::now().date_naive(),
      currency:     "USD".to_string(),
      notes:        vec![
        "Top selling product is \"Cloud Engine X\".".to_string(),
        "Stock alert: \"Edge Router v2\" is below threshold (5 units left).".to_string(),
        "Overall usage trend is up 12% from last month.".to_string(),
      ],
    }
  }
}

/// Build the full context string sent with every question.
/// Pure function of the registry's current snapshot and the facts.
pub fn build_context(registry: &SchemaRegistry, facts: &ContextFacts) -> String {
  let mut out = String::new();
  out.push_str("ENVIRONMENT SCHEMA:\n");
  out.push_str(&registry.serialize());
  out.push_str("\n\nCONTEXT:\n");
  out.push_str(&format!("Today's date is {}.\n", facts.current_date));
  out.push_str(&format!("Primary Currency: {}.\n", facts.currency));
  for note in &facts.notes {
    out.push_str(note);
    out.push('\n');
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::table::seed_tables;

  fn facts() -> ContextFacts {
    ContextFacts {
      current_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
      ..ContextFacts::default()
    }
  }

  #[test]
  fn context_contains_schema_and_facts() {
    let registry = SchemaRegistry::from_snapshot(seed_tables());
    let ctx = build_context(&registry, &facts());

    assert!(ctx.starts_with("ENVIRONMENT SCHEMA:\n"));
    assert!(ctx.contains("DATABASE: Core_DWH"));
    assert!(ctx.contains("CONTEXT:\nToday's date is 2024-05-20."));
    assert!(ctx.contains("Primary Currency: USD."));
    assert!(ctx.contains("Cloud Engine X"));
  }

  #[test]
  fn context_is_pure() {
    let registry = SchemaRegistry::from_snapshot(seed_tables());
    let f = facts();
    assert_eq!(build_context(&registry, &f), build_context(&registry, &f));
  }

  #[test]
  fn context_reflects_registry_changes() {
    let mut registry = SchemaRegistry::from_snapshot(seed_tables());
    let f = facts();
    let before = build_context(&registry, &f);
    let id = registry.tables()[0].id;
    registry.remove(id);
    let after = build_context(&registry, &f);
    assert_ne!(before, after);
    assert!(!after.contains("TABLE: Sales"));
  }
}
