//! Handlers for `/visits` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/visits` | Optional `?status=pending\|approved\|...` |
//! | `POST` | `/visits` | Visitor-facing submission; creates a `Pending` visit |
//! | `GET`  | `/visits/:id` | 404 if not found |
//! | `POST` | `/visits/:id/approve` | Actor headers required |
//! | `POST` | `/visits/:id/reject` | Actor headers required |
//! | `POST` | `/visits/:id/check-in` | Manual override, Admin-or-above |
//! | `POST` | `/visits/:id/check-out` | Manual override, Admin-or-above |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use gatehouse_core::{
  gateway::MatchGateway,
  store::{VisitStore, VisitorDirectory},
  visit::{NewVisit, Visit, VisitStatus},
};

use crate::{AppState, auth::actor_from_headers, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<VisitStatus>,
}

/// `GET /visits[?status=<status>]`
pub async fn list<V, D, G>(
  State(state): State<AppState<V, D, G>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Visit>>, ApiError>
where
  V: VisitStore + 'static,
  D: VisitorDirectory + 'static,
  G: MatchGateway + 'static,
{
  let visits = state
    .visits
    .list_visits(params.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(visits))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub visitor_id:    Uuid,
  pub host_id:       Uuid,
  #[serde(default)]
  pub department_id: Option<Uuid>,
  pub purpose:       String,
}

/// `POST /visits` — the visitor-facing submission. Always lands in
/// `Pending`; no authentication, matching the physical front-desk form.
pub async fn create<V, D, G>(
  State(state): State<AppState<V, D, G>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  V: VisitStore + 'static,
  D: VisitorDirectory + 'static,
  G: MatchGateway + 'static,
{
  let input = NewVisit::new(
    body.visitor_id,
    body.host_id,
    body.department_id,
    body.purpose,
  )?;
  let visit =
    state.visits.add_visit(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(visit)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /visits/:id`
pub async fn get_one<V, D, G>(
  State(state): State<AppState<V, D, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Visit>, ApiError>
where
  V: VisitStore + 'static,
  D: VisitorDirectory + 'static,
  G: MatchGateway + 'static,
{
  let visit = state
    .visits
    .get_visit(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("visit {id} not found")))?;
  Ok(Json(visit))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

/// `POST /visits/:id/approve`
pub async fn approve<V, D, G>(
  State(state): State<AppState<V, D, G>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<Visit>, ApiError>
where
  V: VisitStore + 'static,
  D: VisitorDirectory + 'static,
  G: MatchGateway + 'static,
{
  let actor = actor_from_headers(&headers)?;
  let visit = state.orchestrator.approve(id, &actor).await?;
  Ok(Json(visit))
}

/// `POST /visits/:id/reject`
pub async fn reject<V, D, G>(
  State(state): State<AppState<V, D, G>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<Visit>, ApiError>
where
  V: VisitStore + 'static,
  D: VisitorDirectory + 'static,
  G: MatchGateway + 'static,
{
  let actor = actor_from_headers(&headers)?;
  let visit = state.orchestrator.reject(id, &actor).await?;
  Ok(Json(visit))
}

/// `POST /visits/:id/check-in` — manual fallback for when the kiosk cannot
/// recognise a legitimate visitor.
pub async fn check_in<V, D, G>(
  State(state): State<AppState<V, D, G>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<Visit>, ApiError>
where
  V: VisitStore + 'static,
  D: VisitorDirectory + 'static,
  G: MatchGateway + 'static,
{
  let actor = actor_from_headers(&headers)?;
  let visit = state.orchestrator.check_in(id, &actor).await?;
  Ok(Json(visit))
}

/// `POST /visits/:id/check-out`
pub async fn check_out<V, D, G>(
  State(state): State<AppState<V, D, G>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<Visit>, ApiError>
where
  V: VisitStore + 'static,
  D: VisitorDirectory + 'static,
  G: MatchGateway + 'static,
{
  let actor = actor_from_headers(&headers)?;
  let visit = state.orchestrator.check_out(id, &actor).await?;
  Ok(Json(visit))
}
