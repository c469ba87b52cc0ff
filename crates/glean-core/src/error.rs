//! Error types for `glean-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A blank or whitespace-only question. Rejected before any external call.
  #[error("question is empty")]
  EmptyQuery,

  /// A question was submitted while another one was still in flight.
  #[error("a question is already in flight")]
  QueryInFlight,

  /// A table definition with a blank name, database, or schema text.
  #[error("table name, database, and schema text must be non-empty")]
  InvalidTable,

  /// The generation call did not complete. The message is surfaced verbatim.
  #[error("generation request failed: {0}")]
  Transport(String),

  /// The generation payload was not a JSON object matching the contract.
  /// The detail is for diagnostics only; user-facing text stays generic.
  #[error("invalid response format")]
  MalformedResponse(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
