//! HTTP client adapter for the biometric match gateway.
//!
//! Speaks a small JSON protocol: `POST /register` to enrol a subject's
//! reference image, `POST /recognize` to ask which enrolled subject an image
//! shows. Images travel base64-encoded. The request timeout is baked into the
//! client so no call can hang past it.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_core::gateway::{GatewayError, MatchGateway, Recognition};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct RegisterRequest {
  subject_id: Uuid,
  image_b64:  String,
}

#[derive(Debug, Serialize)]
struct RecognizeRequest {
  image_b64: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
  matched:    bool,
  #[serde(default)]
  subject_id: Option<Uuid>,
  #[serde(default)]
  similarity: Option<f32>,
}

impl From<RecognizeResponse> for Recognition {
  fn from(r: RecognizeResponse) -> Self {
    Self {
      matched:    r.matched,
      subject_id: r.subject_id,
      similarity: r.similarity,
    }
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client implementing [`MatchGateway`].
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpMatchGateway {
  client:   Client,
  base_url: String,
}

impl HttpMatchGateway {
  pub fn new(
    base_url: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self, GatewayError> {
    let client = Client::builder().timeout(timeout).build().map_err(|e| {
      GatewayError::Protocol(format!("failed to build HTTP client: {e}"))
    })?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_owned(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.base_url)
  }
}

impl MatchGateway for HttpMatchGateway {
  async fn register(
    &self,
    subject_id: Uuid,
    image: Bytes,
  ) -> Result<(), GatewayError> {
    let body =
      RegisterRequest { subject_id, image_b64: BASE64.encode(&image) };
    let resp = self
      .client
      .post(self.url("/register"))
      .json(&body)
      .send()
      .await
      .map_err(request_error)?;

    check_status(resp.status())?;
    tracing::debug!(%subject_id, "subject registered with match gateway");
    Ok(())
  }

  async fn recognize(&self, image: Bytes) -> Result<Recognition, GatewayError> {
    let body = RecognizeRequest { image_b64: BASE64.encode(&image) };
    let resp = self
      .client
      .post(self.url("/recognize"))
      .json(&body)
      .send()
      .await
      .map_err(request_error)?;

    check_status(resp.status())?;
    let parsed: RecognizeResponse = resp.json().await.map_err(|e| {
      GatewayError::Protocol(format!("malformed recognize response: {e}"))
    })?;
    Ok(parsed.into())
  }
}

fn request_error(e: reqwest::Error) -> GatewayError {
  if e.is_timeout() {
    GatewayError::Timeout
  } else {
    GatewayError::Unavailable(e.to_string())
  }
}

fn check_status(status: reqwest::StatusCode) -> Result<(), GatewayError> {
  if status.is_success() {
    Ok(())
  } else if status.is_server_error() {
    Err(GatewayError::Unavailable(format!("gateway returned {status}")))
  } else {
    Err(GatewayError::Protocol(format!("gateway returned {status}")))
  }
}
