//! The query orchestrator and the generation-backend seam.
//!
//! The backend is a black box that takes an instruction block, the user's
//! question, and a structured-output contract, and returns a raw text payload.
//! No retries, no timeout enforcement, no caching — every call is a fresh
//! round trip. The orchestrator owns the instruction text, the contract, and
//! the strict decode of the reply.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, insight::InsightResult};

// ─── Request ─────────────────────────────────────────────────────────────────

/// Everything a backend needs for one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
  /// System-role instruction block with the schema context embedded verbatim.
  pub instruction:     String,
  /// The user's question, passed as the primary content.
  pub question:        String,
  /// Structured-output contract the reply must conform to.
  pub response_schema: serde_json::Value,
}

// ─── Backend trait ───────────────────────────────────────────────────────────

/// Abstraction over the external generation collaborator.
///
/// Implementations return the raw text payload; parsing and validation happen
/// in [`Orchestrator::analyze`]. All methods return `Send` futures so the
/// trait can be used from multi-threaded async runtimes.
pub trait InsightBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Execute one generation call and return the raw text reply.
  fn generate(
    &self,
    request: GenerationRequest,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;
}

impl<B: InsightBackend> InsightBackend for &B {
  type Error = B::Error;

  fn generate(
    &self,
    request: GenerationRequest,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_ {
    (**self).generate(request)
  }
}

impl<B: InsightBackend> InsightBackend for std::sync::Arc<B> {
  type Error = B::Error;

  fn generate(
    &self,
    request: GenerationRequest,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_ {
    (**self).generate(request)
  }
}

// ─── Instruction block & contract ────────────────────────────────────────────

/// The fixed instruction block, with the prompt context embedded verbatim.
pub fn instruction_block(context: &str) -> String {
  format!(
    "You are an expert Data Warehouse Analyst and AI Assistant.\n\
     Your task is to interpret natural language queries and provide data \
     insights based on the provided DWH schema and context.\n\
     \n\
     SCHEMA AND CONTEXT:\n\
     {context}\n\
     \n\
     RULES:\n\
     1. Analyze the query carefully.\n\
     2. Provide a conversational but professional 'answer'.\n\
     3. If the query implies a list or time series, generate realistic 'data' \
     points for visualization.\n\
     4. Choose an appropriate 'chartType' (BAR, LINE, PIE, AREA, SCATTER, or \
     NONE if text only).\n\
     5. Always return your response in JSON format according to the schema \
     provided.\n\
     6. If the data is not in the context, simulate reasonable results based \
     on the provided scenario.\n\
     7. If the user asks about tables you don't have, explain that they might \
     need to be added to the data source."
  )
}

/// The structured-output contract mirroring [`InsightResult`].
///
/// `answer` and `chartType` are mandatory; `data` and `metadata` optional,
/// with `data` items requiring both `label` and `value`.
pub fn response_contract() -> serde_json::Value {
  serde_json::json!({
    "type": "OBJECT",
    "properties": {
      "answer": { "type": "STRING" },
      "chartType": {
        "type": "STRING",
        "description": "One of: BAR, LINE, PIE, AREA, SCATTER, NONE"
      },
      "data": {
        "type": "ARRAY",
        "items": {
          "type": "OBJECT",
          "properties": {
            "label": { "type": "STRING" },
            "value": { "type": "NUMBER" }
          },
          "required": ["label", "value"]
        }
      },
      "metadata": {
        "type": "OBJECT",
        "properties": {
          "total": { "type": "NUMBER" },
          "delta": { "type": "STRING" },
          "trend": { "type": "STRING", "description": "up, down, or neutral" }
        }
      }
    },
    "required": ["answer", "chartType"]
  })
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// Drives one question through the backend under the fixed contract.
#[derive(Debug, Clone)]
pub struct Orchestrator<B> {
  backend: B,
}

impl<B: InsightBackend> Orchestrator<B> {
  pub fn new(backend: B) -> Self {
    Self { backend }
  }

  /// Answer `question` against `context`.
  ///
  /// Blank questions fail with [`Error::EmptyQuery`] without invoking the
  /// backend. Backend failures surface verbatim as [`Error::Transport`];
  /// unparsable replies as [`Error::MalformedResponse`], never retried and
  /// never silently defaulted.
  pub async fn analyze(&self, question: &str, context: &str) -> Result<InsightResult> {
    if question.trim().is_empty() {
      return Err(Error::EmptyQuery);
    }

    let request = GenerationRequest {
      instruction:     instruction_block(context),
      question:        question.trim().to_string(),
      response_schema: response_contract(),
    };

    let raw = self
      .backend
      .generate(request)
      .await
      .map_err(|e| Error::Transport(e.to_string()))?;

    InsightResult::decode(&raw)
  }
}
