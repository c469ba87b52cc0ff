//! JSON REST API for glean.
//!
//! Exposes an axum [`Router`] generic over any
//! [`glean_core::store::RegistryStore`] + [`glean_core::generate::InsightBackend`]
//! pair. TLS and transport concerns are the caller's responsibility.
//!
//! The schema registry sits behind an `RwLock` and the conversation behind a
//! `Mutex`, so context-building never observes a half-updated registry and
//! `current_result` has a single writer. Every registry mutation persists the
//! full snapshot through the store before the handler returns.

pub mod ask;
pub mod conversation;
pub mod error;
pub mod export;
pub mod tables;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tokio::sync::{Mutex, RwLock};

use glean_core::{
  context::ContextFacts,
  conversation::Conversation,
  generate::{InsightBackend, Orchestrator},
  registry::SchemaRegistry,
  store::RegistryStore,
};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, B> {
  pub registry:     Arc<RwLock<SchemaRegistry>>,
  pub conversation: Arc<Mutex<Conversation>>,
  pub store:        Arc<S>,
  pub orchestrator: Arc<Orchestrator<B>>,
  pub facts:        Arc<ContextFacts>,
}

// Manual impl: `derive(Clone)` would demand `S: Clone + B: Clone`.
impl<S, B> Clone for AppState<S, B> {
  fn clone(&self) -> Self {
    Self {
      registry:     self.registry.clone(),
      conversation: self.conversation.clone(),
      store:        self.store.clone(),
      orchestrator: self.orchestrator.clone(),
      facts:        self.facts.clone(),
    }
  }
}

impl<S, B> AppState<S, B>
where
  S: RegistryStore,
  B: InsightBackend,
{
  /// Build state around an already-loaded registry.
  pub fn new(registry: SchemaRegistry, store: S, backend: B, facts: ContextFacts) -> Self {
    Self {
      registry:     Arc::new(RwLock::new(registry)),
      conversation: Arc::new(Mutex::new(Conversation::new())),
      store:        Arc::new(store),
      orchestrator: Arc::new(Orchestrator::new(backend)),
      facts:        Arc::new(facts),
    }
  }

  /// Persist the registry's current snapshot. Called after every mutation.
  pub(crate) async fn persist_registry(&self) -> Result<(), ApiError> {
    let snapshot = self.registry.read().await.snapshot();
    self
      .store
      .save(&snapshot)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn router<S, B>(state: AppState<S, B>) -> Router<()>
where
  S: RegistryStore + 'static,
  B: InsightBackend + 'static,
{
  Router::new()
    // Schema registry
    .route("/tables", get(tables::list::<S, B>).post(tables::create::<S, B>))
    .route(
      "/tables/{id}",
      axum::routing::put(tables::update::<S, B>).delete(tables::remove::<S, B>),
    )
    .route("/tables/import", post(tables::import::<S, B>))
    .route("/tables/context", get(tables::context::<S, B>))
    // Questions
    .route("/ask", post(ask::handler::<S, B>))
    // Conversation
    .route("/conversation", get(conversation::view::<S, B>))
    .route("/conversation/new", post(conversation::new_conversation::<S, B>))
    .route("/conversation/select", post(conversation::select::<S, B>))
    .route("/history", get(conversation::history::<S, B>))
    // Export
    .route("/export/csv", get(export::csv::<S, B>))
    .with_state(state)
}
