//! Handlers for the schema-registry endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/tables` | Ordered list of table definitions |
//! | `POST`   | `/tables` | Body: [`NewTable`]; returns 201 + stored definition |
//! | `PUT`    | `/tables/:id` | Replaces all fields except `id`; 404 if unknown |
//! | `DELETE` | `/tables/:id` | 404 if unknown |
//! | `POST`   | `/tables/import` | Body: `{"fileName": "...", "contents": "..."}` |
//! | `GET`    | `/tables/context` | The full prompt context as plain text |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use glean_core::{
  Error as CoreError,
  context::build_context,
  generate::InsightBackend,
  store::RegistryStore,
  table::{NewTable, TableDefinition},
};

use crate::{AppState, error::ApiError};

fn invalid(e: CoreError) -> ApiError {
  ApiError::BadRequest(e.to_string())
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /tables`
pub async fn list<S, B>(
  State(state): State<AppState<S, B>>,
) -> Json<Vec<TableDefinition>>
where
  S: RegistryStore,
  B: InsightBackend,
{
  Json(state.registry.read().await.snapshot())
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /tables`
pub async fn create<S, B>(
  State(state): State<AppState<S, B>>,
  Json(body): Json<NewTable>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore,
  B: InsightBackend,
{
  let id = {
    let mut registry = state.registry.write().await;
    registry.add(body).map_err(invalid)?
  };
  state.persist_registry().await?;

  let table = state
    .registry
    .read()
    .await
    .get(id)
    .cloned()
    .ok_or_else(|| ApiError::NotFound(format!("table {id} not found")))?;
  Ok((StatusCode::CREATED, Json(table)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /tables/:id`
pub async fn update<S, B>(
  State(state): State<AppState<S, B>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewTable>,
) -> Result<Json<TableDefinition>, ApiError>
where
  S: RegistryStore,
  B: InsightBackend,
{
  let matched = {
    let mut registry = state.registry.write().await;
    registry.update(id, body).map_err(invalid)?
  };
  // The registry silently ignores unknown ids; the HTTP surface reports them.
  if !matched {
    return Err(ApiError::NotFound(format!("table {id} not found")));
  }
  state.persist_registry().await?;

  let table = state
    .registry
    .read()
    .await
    .get(id)
    .cloned()
    .ok_or_else(|| ApiError::NotFound(format!("table {id} not found")))?;
  Ok(Json(table))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /tables/:id`
pub async fn remove<S, B>(
  State(state): State<AppState<S, B>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RegistryStore,
  B: InsightBackend,
{
  let removed = {
    let mut registry = state.registry.write().await;
    registry.remove(id)
  };
  if !removed {
    return Err(ApiError::NotFound(format!("table {id} not found")));
  }
  state.persist_registry().await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Import ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBody {
  pub file_name: String,
  pub contents:  String,
}

/// `POST /tables/import` — infer a definition from an uploaded file.
pub async fn import<S, B>(
  State(state): State<AppState<S, B>>,
  Json(body): Json<ImportBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore,
  B: InsightBackend,
{
  let table = NewTable::from_import(&body.file_name, &body.contents).map_err(invalid)?;

  let id = {
    let mut registry = state.registry.write().await;
    registry.add(table).map_err(invalid)?
  };
  state.persist_registry().await?;

  let table = state
    .registry
    .read()
    .await
    .get(id)
    .cloned()
    .ok_or_else(|| ApiError::NotFound(format!("table {id} not found")))?;
  Ok((StatusCode::CREATED, Json(table)))
}

// ─── Context ──────────────────────────────────────────────────────────────────

/// `GET /tables/context` — the exact text block sent with every question.
pub async fn context<S, B>(State(state): State<AppState<S, B>>) -> String
where
  S: RegistryStore,
  B: InsightBackend,
{
  let registry = state.registry.read().await;
  build_context(&registry, &state.facts)
}
