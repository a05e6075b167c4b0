//! Contract with the biometric match gateway.
//!
//! The matching algorithm itself is out of scope; this module pins down only
//! the shape of the conversation: enrol an identity, or ask which enrolled
//! identity an image shows and with what similarity. Whether a similarity is
//! good enough is decided by the caller against
//! [`crate::ACCEPTANCE_THRESHOLD`], never by the gateway.

use std::future::Future;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors a gateway adapter may report. All of them classify as
/// `ServiceUnavailable` except `Protocol`, which indicates a broken adapter
/// or an incompatible gateway version.
#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("biometric gateway unavailable: {0}")]
  Unavailable(String),

  #[error("biometric gateway timed out")]
  Timeout,

  #[error("biometric gateway protocol error: {0}")]
  Protocol(String),
}

/// What the gateway reported for one image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Recognition {
  pub matched:    bool,
  /// The enrolled identity, present iff `matched`.
  pub subject_id: Option<Uuid>,
  /// Similarity on a 0–1 scale, present iff `matched`.
  pub similarity: Option<f32>,
}

/// Abstraction over the biometric match service.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait MatchGateway: Send + Sync {
  /// Enrol `subject_id` with a reference image so later [`recognize`] calls
  /// can report it.
  ///
  /// [`recognize`]: MatchGateway::recognize
  fn register(
    &self,
    subject_id: Uuid,
    image: Bytes,
  ) -> impl Future<Output = Result<(), GatewayError>> + Send + '_;

  /// Ask which enrolled identity `image` shows, if any.
  fn recognize(
    &self,
    image: Bytes,
  ) -> impl Future<Output = Result<Recognition, GatewayError>> + Send + '_;
}
