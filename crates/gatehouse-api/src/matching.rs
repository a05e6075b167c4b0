//! Handler for `POST /match` — the kiosk's biometric check-in/out path.

use axum::{Json, extract::State};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use serde::Deserialize;

use gatehouse_core::{
  gateway::MatchGateway,
  store::{VisitStore, VisitorDirectory},
  transition::MatchIntent,
};
use gatehouse_engine::MatchOutcome;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct MatchBody {
  /// Base64-encoded camera frame.
  pub image_b64: String,
  pub intent:    MatchIntent,
}

/// `POST /match` — body: `{"image_b64": "...", "intent": "check_in"}`.
///
/// Unauthenticated by design: a match at or above the acceptance threshold is
/// the authorization. Returns `{visitor, visit, similarity}` on success.
pub async fn handler<V, D, G>(
  State(state): State<AppState<V, D, G>>,
  Json(body): Json<MatchBody>,
) -> Result<Json<MatchOutcome>, ApiError>
where
  V: VisitStore + 'static,
  D: VisitorDirectory + 'static,
  G: MatchGateway + 'static,
{
  let image = BASE64
    .decode(body.image_b64.as_bytes())
    .map_err(|_| ApiError::BadRequest("image_b64 is not valid base64".into()))?;
  if image.is_empty() {
    return Err(ApiError::BadRequest("image must not be empty".into()));
  }

  let outcome = state
    .orchestrator
    .process_match(Bytes::from(image), body.intent)
    .await?;
  Ok(Json(outcome))
}
