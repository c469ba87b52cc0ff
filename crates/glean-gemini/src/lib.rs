//! Gemini `generateContent` client — the generation collaborator.
//!
//! One non-streaming call per question, with the structured-output contract
//! passed as `responseSchema` so the service is constrained to JSON matching
//! [`glean_core::insight::InsightResult`]. No retries, no backoff, no caching
//! around the call — failures surface to the orchestrator as-is.

pub mod error;

pub use error::{Error, Result};

use serde::{Deserialize, Serialize};

use glean_core::generate::{GenerationRequest, InsightBackend};

// ─── Configuration ───────────────────────────────────────────────────────────

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
  pub api_key:  String,
  pub model:    String,
  pub base_url: String,
}

impl GeminiConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:  api_key.into(),
      model:    DEFAULT_MODEL.to_string(),
      base_url: DEFAULT_BASE_URL.to_string(),
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  system_instruction: Content,
  contents:           Vec<Content>,
  generation_config:  GenerationConfig,
}

#[derive(Serialize)]
struct Content {
  #[serde(skip_serializing_if = "Option::is_none")]
  role:  Option<&'static str>,
  parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
  text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  response_mime_type: &'static str,
  response_schema:    serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
  #[serde(default)]
  text: String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the Gemini `generateContent` endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiClient {
  client: reqwest::Client,
  config: GeminiConfig,
}

impl GeminiClient {
  pub fn new(config: GeminiConfig) -> Result<Self> {
    let client = reqwest::Client::builder().build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/models/{}:generateContent?key={}",
      self.config.base_url.trim_end_matches('/'),
      self.config.model,
      self.config.api_key,
    )
  }

  async fn generate_content(&self, request: GenerationRequest) -> Result<String> {
    let body = GenerateContentRequest {
      system_instruction: Content {
        role:  None,
        parts: vec![Part { text: request.instruction }],
      },
      contents:           vec![Content {
        role:  Some("user"),
        parts: vec![Part { text: request.question }],
      }],
      generation_config:  GenerationConfig {
        response_mime_type: "application/json",
        response_schema:    request.response_schema,
      },
    };

    tracing::debug!(model = %self.config.model, "sending generateContent request");

    let response = self.client.post(self.url()).json(&body).send().await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::Api { status: status.as_u16(), body });
    }

    let parsed: GenerateContentResponse = response.json().await?;

    // An empty or missing payload is handed to the decoder as "{}", which
    // then fails the required-field expectations upstream.
    let text = parsed
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content.parts.into_iter().next())
      .map(|p| p.text)
      .filter(|t| !t.is_empty())
      .unwrap_or_else(|| "{}".to_string());

    Ok(text)
  }
}

impl InsightBackend for GeminiClient {
  type Error = Error;

  async fn generate(&self, request: GenerationRequest) -> Result<String> {
    self.generate_content(request).await
  }
}
