//! Error type for `gatehouse-engine`.
//!
//! Every rejected operation carries a stable, specific reason so the calling
//! UI can branch on cause; the coarse [`ErrorClass`] is what transport layers
//! map to status codes.

use thiserror::Error;
use uuid::Uuid;

use gatehouse_core::{
  ErrorClass,
  gateway::GatewayError,
  transition::VisitAction,
  visit::VisitStatus,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("visit {0} not found")]
  VisitNotFound(Uuid),

  #[error("visitor {0} not found")]
  VisitorNotFound(Uuid),

  #[error("you do not have permission to {action} this visit")]
  PermissionDenied { action: VisitAction },

  /// Transition precondition violations, including races lost at the
  /// conditioned write ("visit already processed").
  #[error(transparent)]
  Domain(#[from] gatehouse_core::Error),

  #[error("no registered identity matched the image")]
  NoMatch,

  #[error("match similarity {similarity:.2} is below the acceptance threshold")]
  BelowThreshold { similarity: f32 },

  #[error("no {required} visit found for this visitor")]
  NoEligibleVisit { required: VisitStatus },

  #[error(transparent)]
  Gateway(#[from] GatewayError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn class(&self) -> ErrorClass {
    match self {
      Self::VisitNotFound(_)
      | Self::VisitorNotFound(_)
      | Self::NoMatch
      | Self::BelowThreshold { .. }
      | Self::NoEligibleVisit { .. } => ErrorClass::NotFound,
      Self::PermissionDenied { .. } => ErrorClass::Forbidden,
      Self::Domain(e) => e.class(),
      Self::Gateway(_) => ErrorClass::ServiceUnavailable,
      Self::Store(_) => ErrorClass::Internal,
    }
  }

  /// Wrap a backend error from one of the injected stores.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
