//! Visit — the central entity tracked through approval and physical presence.
//!
//! A visit's `status` only ever moves forward along the transition graph in
//! [`crate::transition`]; it never regresses and never skips an edge. The only
//! component allowed to mutate it is the transition orchestrator, through the
//! store's conditioned write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle position of a visit. `Rejected` and `CheckedOut` are terminal.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VisitStatus {
  Pending,
  Approved,
  Rejected,
  CheckedIn,
  CheckedOut,
}

impl VisitStatus {
  /// No edge ever leaves a terminal status.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Rejected | Self::CheckedOut)
  }
}

// ─── Decision ────────────────────────────────────────────────────────────────

/// Who approved or rejected the visit, and when. Set exactly once, when the
/// status first leaves `Pending`; never cleared or overwritten afterward.
/// The same record is used for rejections — it names the decider, not only
/// an approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
  pub decided_by: Uuid,
  pub decided_at: DateTime<Utc>,
}

// ─── Visit ───────────────────────────────────────────────────────────────────

/// One visitor's request to see one host.
///
/// `visitor_id`, `host_id`, and `department_id` are references to entities
/// owned elsewhere; this record never manages their lifecycle. All three are
/// immutable after creation, as is `submitted_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
  pub visit_id:       Uuid,
  pub visitor_id:     Uuid,
  pub host_id:        Uuid,
  /// Department the visit is filed under; `None` means unscoped.
  pub department_id:  Option<Uuid>,
  pub purpose:        String,
  pub status:         VisitStatus,
  /// Server-assigned at creation; never changes.
  pub submitted_at:   DateTime<Utc>,
  pub decision:       Option<Decision>,
  pub checked_in_at:  Option<DateTime<Utc>>,
  pub checked_out_at: Option<DateTime<Utc>>,
}

// ─── NewVisit ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::VisitStore::add_visit`]. The store assigns
/// `visit_id` and `submitted_at`; new visits always start in `Pending`.
#[derive(Debug, Clone)]
pub struct NewVisit {
  pub visitor_id:    Uuid,
  pub host_id:       Uuid,
  pub department_id: Option<Uuid>,
  pub purpose:       String,
}

impl NewVisit {
  /// Validates that `purpose` is non-empty (whitespace does not count).
  pub fn new(
    visitor_id: Uuid,
    host_id: Uuid,
    department_id: Option<Uuid>,
    purpose: impl Into<String>,
  ) -> Result<Self> {
    let purpose = purpose.into();
    if purpose.trim().is_empty() {
      return Err(Error::EmptyPurpose);
    }
    Ok(Self { visitor_id, host_id, department_id, purpose })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_visit_rejects_blank_purpose() {
    let err = NewVisit::new(Uuid::new_v4(), Uuid::new_v4(), None, "   ")
      .unwrap_err();
    assert!(matches!(err, Error::EmptyPurpose));
  }

  #[test]
  fn status_round_trips_through_strum() {
    for status in [
      VisitStatus::Pending,
      VisitStatus::Approved,
      VisitStatus::Rejected,
      VisitStatus::CheckedIn,
      VisitStatus::CheckedOut,
    ] {
      let encoded = status.to_string();
      assert_eq!(encoded.parse::<VisitStatus>().unwrap(), status);
    }
  }

  #[test]
  fn terminal_statuses() {
    assert!(VisitStatus::Rejected.is_terminal());
    assert!(VisitStatus::CheckedOut.is_terminal());
    assert!(!VisitStatus::Pending.is_terminal());
    assert!(!VisitStatus::Approved.is_terminal());
    assert!(!VisitStatus::CheckedIn.is_terminal());
  }
}
