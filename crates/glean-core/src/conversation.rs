//! The conversation state machine.
//!
//! A single long-lived conversation: one active question/answer pair, a
//! loading flag, an error slot, and an append-only newest-first history. All
//! mutations funnel through the operations here; there are no ad-hoc field
//! writes. At most one request is in flight at a time — [`Conversation::begin`]
//! rejects a second submission while loading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, insight::InsightResult};

// ─── History ─────────────────────────────────────────────────────────────────

/// One past question/answer pair, retained for replay. Never edited after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
  pub id:        Uuid,
  pub query:     String,
  pub result:    InsightResult,
  pub timestamp: DateTime<Utc>,
}

// ─── Phase ───────────────────────────────────────────────────────────────────

/// The observable phase of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  Idle,
  Loading,
  Answered,
  Failed,
}

// ─── Conversation ────────────────────────────────────────────────────────────

/// Process-wide conversation state. Not persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
  pub active_query:   Option<String>,
  pub current_result: Option<InsightResult>,
  pub loading:        bool,
  pub error:          Option<String>,
  /// Newest first.
  pub history:        Vec<HistoryItem>,
}

impl Conversation {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn phase(&self) -> Phase {
    if self.loading {
      Phase::Loading
    } else if self.error.is_some() {
      Phase::Failed
    } else if self.current_result.is_some() {
      Phase::Answered
    } else {
      Phase::Idle
    }
  }

  /// Start a new request.
  ///
  /// Blank questions are rejected with [`Error::EmptyQuery`] before anything
  /// changes. A submission while another request is in flight is rejected
  /// with [`Error::QueryInFlight`] — the single-flight design. The previous
  /// `current_result` stays visible until resolution. The question is stored
  /// exactly as submitted; trimming is only for the blank check.
  pub fn begin(&mut self, question: &str) -> Result<()> {
    if question.trim().is_empty() {
      return Err(Error::EmptyQuery);
    }
    if self.loading {
      return Err(Error::QueryInFlight);
    }
    self.active_query = Some(question.to_string());
    self.loading = true;
    self.error = None;
    Ok(())
  }

  /// Record a successful answer for the in-flight question and prepend it to
  /// the history.
  pub fn resolve(&mut self, result: InsightResult) {
    let query = self.active_query.clone().unwrap_or_default();
    self.history.insert(0, HistoryItem {
      id: Uuid::new_v4(),
      query,
      result: result.clone(),
      timestamp: Utc::now(),
    });
    self.current_result = Some(result);
    self.loading = false;
    self.error = None;
  }

  /// Record a failed request. The stale previous answer, if any, remains
  /// visible; history is untouched.
  pub fn fail(&mut self, message: impl Into<String>) {
    self.error = Some(message.into());
    self.loading = false;
  }

  /// Start a fresh conversation view. History is kept.
  pub fn reset(&mut self) {
    self.active_query = None;
    self.current_result = None;
    self.error = None;
    self.loading = false;
  }

  /// Replay a past entry as the active view.
  ///
  /// Ignored while a request is in flight (selecting history mid-request is
  /// undefined in the contract; dropping it keeps the single-flight invariant).
  /// Returns whether the selection was applied.
  pub fn select_history(&mut self, id: Uuid) -> bool {
    if self.loading {
      return false;
    }
    match self.history.iter().find(|h| h.id == id) {
      Some(item) => {
        self.active_query = Some(item.query.clone());
        self.current_result = Some(item.result.clone());
        self.error = None;
        true
      }
      None => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::insight::ChartType;

  fn answer(text: &str) -> InsightResult {
    InsightResult {
      answer:      text.to_string(),
      chart_type:  ChartType::None,
      data:        None,
      metadata:    None,
      tables_used: None,
    }
  }

  #[test]
  fn starts_idle() {
    let c = Conversation::new();
    assert_eq!(c.phase(), Phase::Idle);
    assert!(c.history.is_empty());
  }

  #[test]
  fn blank_submission_changes_nothing() {
    let mut c = Conversation::new();
    for q in ["", "   ", "\n\t"] {
      assert!(matches!(c.begin(q), Err(Error::EmptyQuery)));
      assert_eq!(c.phase(), Phase::Idle);
      assert!(c.active_query.is_none());
      assert!(c.error.is_none());
      assert!(c.history.is_empty());
    }
  }

  #[test]
  fn begin_sets_loading_and_clears_error() {
    let mut c = Conversation::new();
    c.begin("total sales?").unwrap();
    c.fail("backend down");
    assert_eq!(c.phase(), Phase::Failed);

    c.begin("total sales?").unwrap();
    assert_eq!(c.phase(), Phase::Loading);
    assert!(c.error.is_none());
    assert_eq!(c.active_query.as_deref(), Some("total sales?"));
  }

  #[test]
  fn padded_question_is_recorded_as_submitted() {
    let mut c = Conversation::new();
    c.begin("  total sales? ").unwrap();
    assert_eq!(c.active_query.as_deref(), Some("  total sales? "));

    c.resolve(answer("a1"));
    assert_eq!(c.history[0].query, "  total sales? ");
  }

  #[test]
  fn second_submission_while_loading_is_rejected() {
    let mut c = Conversation::new();
    c.begin("first").unwrap();
    assert!(matches!(c.begin("second"), Err(Error::QueryInFlight)));
    assert_eq!(c.active_query.as_deref(), Some("first"));
  }

  #[test]
  fn resolve_prepends_history() {
    let mut c = Conversation::new();
    c.begin("q1").unwrap();
    c.resolve(answer("a1"));
    c.begin("q2").unwrap();
    c.resolve(answer("a2"));

    assert_eq!(c.phase(), Phase::Answered);
    assert_eq!(c.history.len(), 2);
    assert_eq!(c.history[0].query, "q2");
    assert_eq!(c.history[1].query, "q1");
    assert_eq!(c.current_result.as_ref().unwrap().answer, "a2");
    assert!(!c.loading);
  }

  #[test]
  fn fail_keeps_previous_answer_and_history() {
    let mut c = Conversation::new();
    c.begin("q1").unwrap();
    c.resolve(answer("a1"));
    c.begin("q2").unwrap();
    c.fail("service unavailable");

    assert_eq!(c.phase(), Phase::Failed);
    assert_eq!(c.error.as_deref(), Some("service unavailable"));
    assert!(!c.loading);
    assert_eq!(c.history.len(), 1);
    // Stale previous answer remains visible.
    assert_eq!(c.current_result.as_ref().unwrap().answer, "a1");
  }

  #[test]
  fn reset_keeps_history() {
    let mut c = Conversation::new();
    c.begin("q1").unwrap();
    c.resolve(answer("a1"));
    c.reset();

    assert_eq!(c.phase(), Phase::Idle);
    assert!(c.active_query.is_none());
    assert!(c.current_result.is_none());
    assert_eq!(c.history.len(), 1);
  }

  #[test]
  fn select_history_replays_entry() {
    let mut c = Conversation::new();
    c.begin("q1").unwrap();
    c.resolve(answer("a1"));
    c.begin("q2").unwrap();
    c.resolve(answer("a2"));

    let first = c.history[1].id;
    assert!(c.select_history(first));
    assert_eq!(c.active_query.as_deref(), Some("q1"));
    assert_eq!(c.current_result.as_ref().unwrap().answer, "a1");
    assert!(c.error.is_none());
  }

  #[test]
  fn select_history_is_ignored_while_loading() {
    let mut c = Conversation::new();
    c.begin("q1").unwrap();
    c.resolve(answer("a1"));
    let id = c.history[0].id;

    c.begin("q2").unwrap();
    assert!(!c.select_history(id));
    assert_eq!(c.active_query.as_deref(), Some("q2"));
    assert!(c.loading);
  }

  #[test]
  fn select_unknown_history_id_is_a_noop() {
    let mut c = Conversation::new();
    assert!(!c.select_history(Uuid::new_v4()));
    assert_eq!(c.phase(), Phase::Idle);
  }
}
