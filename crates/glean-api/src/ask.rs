//! The `/ask` handler — one question through the orchestrator.
//!
//! Exactly one request may be in flight at a time: `begin` flips the loading
//! flag under the conversation lock, so a second submission gets 409 while
//! the first is outstanding. The lock is *not* held across the generation
//! call — readers can still view history and tables while a request runs.
//!
//! Once `begin` succeeds the rest of the sequence runs on a spawned task: a
//! client that disconnects mid-request drops the handler future, but the
//! task still reaches `resolve` or `fail`, so the conversation can never be
//! stranded in the loading state.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use glean_core::{
  Error as CoreError, context::build_context, generate::InsightBackend,
  insight::InsightResult, store::RegistryStore,
};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskBody {
  pub question: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
  pub result:     InsightResult,
  /// Id of the history entry this answer was recorded under.
  pub history_id: Uuid,
}

/// `POST /ask` — body: `{"question":"..."}`
pub async fn handler<S, B>(
  State(state): State<AppState<S, B>>,
  Json(body): Json<AskBody>,
) -> Result<Json<AskResponse>, ApiError>
where
  S: RegistryStore + 'static,
  B: InsightBackend + 'static,
{
  {
    let mut convo = state.conversation.lock().await;
    convo.begin(&body.question).map_err(|e| match e {
      CoreError::EmptyQuery => ApiError::BadRequest(e.to_string()),
      CoreError::QueryInFlight => ApiError::Conflict(e.to_string()),
      other => ApiError::BadRequest(other.to_string()),
    })?;
  }

  match tokio::spawn(run(state.clone(), body.question)).await {
    Ok(outcome) => outcome,
    // The task panicked before it could resolve or fail; unwedge the
    // conversation so the next submission is accepted.
    Err(e) => {
      tracing::error!(error = %e, "analysis task failed");
      let message = "analysis task failed".to_string();
      state.conversation.lock().await.fail(message.as_str());
      Err(ApiError::Upstream(message))
    }
  }
}

/// Drive one accepted question to resolution. Runs detached from the request
/// future; always ends in `resolve` or `fail`.
async fn run<S, B>(
  state: AppState<S, B>,
  question: String,
) -> Result<Json<AskResponse>, ApiError>
where
  S: RegistryStore,
  B: InsightBackend,
{
  // Context is recomputed from the registry snapshot on every request.
  let context = {
    let registry = state.registry.read().await;
    build_context(&registry, &state.facts)
  };

  let outcome = state.orchestrator.analyze(&question, &context).await;

  let mut convo = state.conversation.lock().await;
  match outcome {
    Ok(result) => {
      convo.resolve(result.clone());
      let history_id = convo.history[0].id;
      Ok(Json(AskResponse { result, history_id }))
    }
    Err(CoreError::MalformedResponse(detail)) => {
      // Generic message to the user; the detail goes to the log.
      tracing::warn!(%detail, "generation payload failed to decode");
      let message = "invalid response format".to_string();
      convo.fail(message.as_str());
      Err(ApiError::Upstream(message))
    }
    Err(CoreError::Transport(message)) => {
      convo.fail(message.as_str());
      Err(ApiError::Upstream(message))
    }
    Err(other) => {
      let message = other.to_string();
      convo.fail(message.as_str());
      Err(ApiError::Upstream(message))
    }
  }
}
