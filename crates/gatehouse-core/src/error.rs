//! Error types for `gatehouse-core`.

use thiserror::Error;

use crate::{transition::VisitAction, visit::VisitStatus};

/// Coarse classification of a failure, shared across crates.
///
/// Transport layers map each class to their own status vocabulary (the HTTP
/// API maps them to 401/403/404/409/400/503/500). The class never loses the
/// specific reason — that stays in the error's `Display` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  /// No actor identity was presented at all.
  Unauthenticated,
  /// The actor is known but the role/department policy denied the action.
  Forbidden,
  /// Visit, visitor, or biometric match absent.
  NotFound,
  /// A transition precondition did not hold, including races lost at the
  /// conditioned write.
  Conflict,
  /// Malformed id or missing required field.
  InvalidInput,
  /// The biometric gateway is unreachable or timed out.
  ServiceUnavailable,
  /// Unexpected failure (store corruption, programming error).
  Internal,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("purpose of visit must not be empty")]
  EmptyPurpose,

  #[error(
    "visit already processed: cannot {action} a visit in status {current}"
  )]
  WrongStatus {
    action:  VisitAction,
    current: VisitStatus,
  },
}

impl Error {
  pub fn class(&self) -> ErrorClass {
    match self {
      Self::EmptyPurpose => ErrorClass::InvalidInput,
      Self::WrongStatus { .. } => ErrorClass::Conflict,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
