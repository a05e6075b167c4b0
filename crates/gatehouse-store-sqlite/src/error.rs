//! Error type for `gatehouse-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("status decode error: {0}")]
  Status(#[from] strum::ParseError),

  /// Attempted a conditioned transition on a visit that does not exist.
  #[error("visit not found: {0}")]
  VisitNotFound(Uuid),

  #[error("visitor not found: {0}")]
  VisitorNotFound(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
