//! Async HTTP client wrapping the glean JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use glean_core::{
  conversation::HistoryItem,
  insight::InsightResult,
  table::{NewTable, TableDefinition},
};

/// Connection settings for the glean API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Shape of `POST /ask` responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskReply {
  pub result:     InsightResult,
  pub history_id: Uuid,
}

/// Async HTTP client for the glean JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Pull the `{"error": "..."}` message out of a failed response.
  async fn failure(path: &str, resp: reqwest::Response) -> anyhow::Error {
    let status = resp.status();
    let message = resp
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|v| v["error"].as_str().map(str::to_string))
      .unwrap_or_default();
    if message.is_empty() {
      anyhow!("{path} → {status}")
    } else {
      anyhow!("{path} → {status}: {message}")
    }
  }

  // ── Questions ─────────────────────────────────────────────────────────────

  /// `POST /ask`
  pub async fn ask(&self, question: &str) -> Result<AskReply> {
    let resp = self
      .client
      .post(self.url("/ask"))
      .json(&serde_json::json!({ "question": question }))
      .send()
      .await
      .context("POST /ask failed")?;

    if !resp.status().is_success() {
      return Err(Self::failure("POST /ask", resp).await);
    }
    resp.json().await.context("deserialising answer")
  }

  /// `GET /history`
  pub async fn history(&self) -> Result<Vec<HistoryItem>> {
    let resp = self
      .client
      .get(self.url("/history"))
      .send()
      .await
      .context("GET /history failed")?;

    if !resp.status().is_success() {
      return Err(Self::failure("GET /history", resp).await);
    }
    resp.json().await.context("deserialising history")
  }

  // ── Tables ────────────────────────────────────────────────────────────────

  /// `GET /tables`
  pub async fn list_tables(&self) -> Result<Vec<TableDefinition>> {
    let resp = self
      .client
      .get(self.url("/tables"))
      .send()
      .await
      .context("GET /tables failed")?;

    if !resp.status().is_success() {
      return Err(Self::failure("GET /tables", resp).await);
    }
    resp.json().await.context("deserialising tables")
  }

  /// `POST /tables`
  pub async fn add_table(&self, table: &NewTable) -> Result<TableDefinition> {
    let resp = self
      .client
      .post(self.url("/tables"))
      .json(table)
      .send()
      .await
      .context("POST /tables failed")?;

    if !resp.status().is_success() {
      return Err(Self::failure("POST /tables", resp).await);
    }
    resp.json().await.context("deserialising created table")
  }

  /// `DELETE /tables/:id`
  pub async fn remove_table(&self, id: Uuid) -> Result<()> {
    let resp = self
      .client
      .delete(self.url(&format!("/tables/{id}")))
      .send()
      .await
      .context("DELETE /tables failed")?;

    if !resp.status().is_success() {
      return Err(Self::failure("DELETE /tables", resp).await);
    }
    Ok(())
  }

  /// `POST /tables/import`
  pub async fn import_table(
    &self,
    file_name: &str,
    contents: &str,
  ) -> Result<TableDefinition> {
    let resp = self
      .client
      .post(self.url("/tables/import"))
      .json(&serde_json::json!({ "fileName": file_name, "contents": contents }))
      .send()
      .await
      .context("POST /tables/import failed")?;

    if !resp.status().is_success() {
      return Err(Self::failure("POST /tables/import", resp).await);
    }
    resp.json().await.context("deserialising imported table")
  }

  /// `GET /tables/context`
  pub async fn context(&self) -> Result<String> {
    let resp = self
      .client
      .get(self.url("/tables/context"))
      .send()
      .await
      .context("GET /tables/context failed")?;

    if !resp.status().is_success() {
      return Err(Self::failure("GET /tables/context", resp).await);
    }
    resp.text().await.context("reading context text")
  }

  // ── Export ────────────────────────────────────────────────────────────────

  /// `GET /export/csv`
  pub async fn export_csv(&self) -> Result<String> {
    let resp = self
      .client
      .get(self.url("/export/csv"))
      .send()
      .await
      .context("GET /export/csv failed")?;

    if !resp.status().is_success() {
      return Err(Self::failure("GET /export/csv", resp).await);
    }
    resp.text().await.context("reading CSV body")
  }
}
