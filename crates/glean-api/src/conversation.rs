//! Handlers over the conversation state machine.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/conversation` | Current view (phase, active query, result, error) |
//! | `POST` | `/conversation/new` | Clears the view; history is kept |
//! | `POST` | `/conversation/select` | Body: `{"id": "..."}`; replays a past entry |
//! | `GET`  | `/history` | Newest-first list of past question/answer pairs |

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use glean_core::{
  conversation::{Conversation, HistoryItem, Phase},
  generate::InsightBackend,
  insight::InsightResult,
  store::RegistryStore,
};

use crate::{AppState, error::ApiError};

/// Snapshot of what a client should render right now.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
  pub phase:          Phase,
  pub active_query:   Option<String>,
  pub current_result: Option<InsightResult>,
  pub loading:        bool,
  pub error:          Option<String>,
}

impl ConversationView {
  fn of(convo: &Conversation) -> Self {
    Self {
      phase:          convo.phase(),
      active_query:   convo.active_query.clone(),
      current_result: convo.current_result.clone(),
      loading:        convo.loading,
      error:          convo.error.clone(),
    }
  }
}

/// `GET /conversation`
pub async fn view<S, B>(State(state): State<AppState<S, B>>) -> Json<ConversationView>
where
  S: RegistryStore,
  B: InsightBackend,
{
  let convo = state.conversation.lock().await;
  Json(ConversationView::of(&convo))
}

/// `POST /conversation/new` — fresh view, history retained.
pub async fn new_conversation<S, B>(State(state): State<AppState<S, B>>) -> StatusCode
where
  S: RegistryStore,
  B: InsightBackend,
{
  let mut convo = state.conversation.lock().await;
  convo.reset();
  StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct SelectBody {
  pub id: Uuid,
}

/// `POST /conversation/select` — replay a past entry as the active view.
pub async fn select<S, B>(
  State(state): State<AppState<S, B>>,
  Json(body): Json<SelectBody>,
) -> Result<Json<ConversationView>, ApiError>
where
  S: RegistryStore,
  B: InsightBackend,
{
  let mut convo = state.conversation.lock().await;
  if convo.loading {
    return Err(ApiError::Conflict(
      "a request is in flight; selection ignored".to_string(),
    ));
  }
  if !convo.select_history(body.id) {
    return Err(ApiError::NotFound(format!("history entry {} not found", body.id)));
  }
  Ok(Json(ConversationView::of(&convo)))
}

/// `GET /history` — newest first.
pub async fn history<S, B>(State(state): State<AppState<S, B>>) -> Json<Vec<HistoryItem>>
where
  S: RegistryStore,
  B: InsightBackend,
{
  let convo = state.conversation.lock().await;
  Json(convo.history.clone())
}
