//! Visitor — the external identity a visit refers to.
//!
//! Profile CRUD lives with an external collaborator; this core only needs
//! enough of the record to resolve biometric matches and refresh the
//! last-visit marker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitor {
  pub visitor_id:    Uuid,
  pub full_name:     String,
  /// Whether an enrolment photo is on file for biometric registration.
  pub has_reference_image: bool,
  /// Refreshed on every successful check-in.
  pub last_visit_at: Option<DateTime<Utc>>,
}
