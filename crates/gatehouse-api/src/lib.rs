//! JSON REST API for Gatehouse.
//!
//! Exposes an axum [`Router`] over any [`gatehouse_engine::Orchestrator`].
//! TLS, sessions, and credential checking are the caller's responsibility:
//! the fronting auth layer resolves the caller and forwards their identity in
//! the `x-actor-*` headers (see [`auth`]). The `/match` endpoint is
//! deliberately unauthenticated — a kiosk photo authorizes itself by matching.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gatehouse_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod matching;
pub mod visits;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use gatehouse_core::{
  gateway::MatchGateway,
  store::{VisitStore, VisitorDirectory},
};
use gatehouse_engine::Orchestrator;

pub use error::ApiError;

#[cfg(test)]
mod tests;

/// Everything the handlers need. Cloning is cheap — both members are
/// `Arc`-backed.
pub struct AppState<V, D, G> {
  pub orchestrator: Orchestrator<V, D, G>,
  /// Read path for `GET /visits*`; writes always go through the
  /// orchestrator.
  pub visits:       Arc<V>,
}

impl<V, D, G> Clone for AppState<V, D, G> {
  fn clone(&self) -> Self {
    Self {
      orchestrator: self.orchestrator.clone(),
      visits:       Arc::clone(&self.visits),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<V, D, G>(state: AppState<V, D, G>) -> Router<()>
where
  V: VisitStore + 'static,
  D: VisitorDirectory + 'static,
  G: MatchGateway + 'static,
{
  Router::new()
    // Visits
    .route(
      "/visits",
      get(visits::list::<V, D, G>).post(visits::create::<V, D, G>),
    )
    .route("/visits/{id}", get(visits::get_one::<V, D, G>))
    // Lifecycle transitions
    .route("/visits/{id}/approve", post(visits::approve::<V, D, G>))
    .route("/visits/{id}/reject", post(visits::reject::<V, D, G>))
    .route("/visits/{id}/check-in", post(visits::check_in::<V, D, G>))
    .route("/visits/{id}/check-out", post(visits::check_out::<V, D, G>))
    // Biometric path
    .route("/match", post(matching::handler::<V, D, G>))
    .with_state(state)
}
