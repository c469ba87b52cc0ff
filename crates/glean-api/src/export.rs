//! CSV export of the currently displayed chart data.

use axum::{
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};

use glean_core::{export::to_csv, generate::InsightBackend, store::RegistryStore};

use crate::{AppState, error::ApiError};

/// `GET /export/csv` — the chart data behind the current answer, as an
/// attachment. 404 when there is no renderable chart to export.
pub async fn csv<S, B>(
  State(state): State<AppState<S, B>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore,
  B: InsightBackend,
{
  let convo = state.conversation.lock().await;
  let result = convo
    .current_result
    .as_ref()
    .filter(|r| r.has_renderable_chart())
    .ok_or_else(|| ApiError::NotFound("no chart data to export".to_string()))?;

  let body = to_csv(result.data.as_deref().unwrap_or(&[]));
  Ok((
    StatusCode::OK,
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
      (
        header::CONTENT_DISPOSITION,
        "attachment; filename=\"insight.csv\"",
      ),
    ],
    body,
  ))
}
