//! Error type for `glean-gemini`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("generation service returned {status}: {body}")]
  Api { status: u16, body: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
