//! The visit state machine — the transition table for a single visit.
//!
//! The graph is fixed and small:
//!
//! ```text
//! Pending ──► Approved ──► CheckedIn ──► CheckedOut
//!    │
//!    └──────► Rejected
//! ```
//!
//! Each [`VisitAction`] names exactly one edge. An action whose precondition
//! does not hold fails with [`Error::WrongStatus`] and must perform no
//! mutation — re-applying an edge whose outcome already holds fails too;
//! first call wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::{
  Error, Result,
  visit::{Decision, Visit, VisitStatus},
};

// ─── Actions ─────────────────────────────────────────────────────────────────

/// The four edges of the lifecycle graph.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VisitAction {
  Approve,
  Reject,
  CheckIn,
  CheckOut,
}

impl VisitAction {
  /// The exact status a visit must currently hold for this edge to fire.
  pub fn precondition(self) -> VisitStatus {
    match self {
      Self::Approve | Self::Reject => VisitStatus::Pending,
      Self::CheckIn => VisitStatus::Approved,
      Self::CheckOut => VisitStatus::CheckedIn,
    }
  }

  /// The status this edge moves the visit to.
  pub fn outcome(self) -> VisitStatus {
    match self {
      Self::Approve => VisitStatus::Approved,
      Self::Reject => VisitStatus::Rejected,
      Self::CheckIn => VisitStatus::CheckedIn,
      Self::CheckOut => VisitStatus::CheckedOut,
    }
  }
}

/// Validate that `action` may fire from `current`. Returns the conflict error
/// verbatim suitable for the caller ("visit already processed").
pub fn check(action: VisitAction, current: VisitStatus) -> Result<()> {
  if current == action.precondition() {
    Ok(())
  } else {
    Err(Error::WrongStatus { action, current })
  }
}

// ─── Intents ─────────────────────────────────────────────────────────────────

/// What a kiosk photo is asking for. Authorization for these edges is the
/// biometric match itself, not a human role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchIntent {
  CheckIn,
  CheckOut,
}

impl MatchIntent {
  pub fn action(self) -> VisitAction {
    match self {
      Self::CheckIn => VisitAction::CheckIn,
      Self::CheckOut => VisitAction::CheckOut,
    }
  }
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// The field updates a single edge writes, applied by the store atomically
/// together with the status change. Fields left `None` are untouched — the
/// store never clears a previously set decision or timestamp.
#[derive(Debug, Clone, Copy)]
pub struct VisitPatch {
  pub status:         VisitStatus,
  pub decision:       Option<Decision>,
  pub checked_in_at:  Option<DateTime<Utc>>,
  pub checked_out_at: Option<DateTime<Utc>>,
}

impl VisitPatch {
  /// Patch for `Pending → Approved` or `Pending → Rejected`, recording who
  /// decided.
  pub fn decision(
    action: VisitAction,
    decided_by: Uuid,
    decided_at: DateTime<Utc>,
  ) -> Self {
    Self {
      status:         action.outcome(),
      decision:       Some(Decision { decided_by, decided_at }),
      checked_in_at:  None,
      checked_out_at: None,
    }
  }

  /// Patch for `Approved → CheckedIn`.
  pub fn check_in(at: DateTime<Utc>) -> Self {
    Self {
      status:         VisitStatus::CheckedIn,
      decision:       None,
      checked_in_at:  Some(at),
      checked_out_at: None,
    }
  }

  /// Patch for `CheckedIn → CheckedOut`.
  pub fn check_out(at: DateTime<Utc>) -> Self {
    Self {
      status:         VisitStatus::CheckedOut,
      decision:       None,
      checked_in_at:  None,
      checked_out_at: Some(at),
    }
  }

  /// Apply this patch to an in-memory copy of `visit`. Store backends use
  /// this to build the post-write row; in-memory test stores use it directly.
  pub fn apply(self, visit: &mut Visit) {
    visit.status = self.status;
    if self.decision.is_some() {
      visit.decision = self.decision;
    }
    if self.checked_in_at.is_some() {
      visit.checked_in_at = self.checked_in_at;
    }
    if self.checked_out_at.is_some() {
      visit.checked_out_at = self.checked_out_at;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ALL_STATUSES: [VisitStatus; 5] = [
    VisitStatus::Pending,
    VisitStatus::Approved,
    VisitStatus::Rejected,
    VisitStatus::CheckedIn,
    VisitStatus::CheckedOut,
  ];

  const ALL_ACTIONS: [VisitAction; 4] = [
    VisitAction::Approve,
    VisitAction::Reject,
    VisitAction::CheckIn,
    VisitAction::CheckOut,
  ];

  #[test]
  fn only_the_four_edges_exist() {
    for action in ALL_ACTIONS {
      for status in ALL_STATUSES {
        let allowed = check(action, status).is_ok();
        assert_eq!(allowed, status == action.precondition());
      }
    }
  }

  #[test]
  fn nothing_leaves_a_terminal_status() {
    for status in [VisitStatus::Rejected, VisitStatus::CheckedOut] {
      for action in ALL_ACTIONS {
        assert!(check(action, status).is_err());
      }
    }
  }

  #[test]
  fn reapplying_a_satisfied_edge_fails() {
    // Approving an already-approved visit is a conflict, not a no-op.
    let err = check(VisitAction::Approve, VisitStatus::Approved).unwrap_err();
    assert!(matches!(
      err,
      Error::WrongStatus { action: VisitAction::Approve, current: VisitStatus::Approved }
    ));
  }

  #[test]
  fn skipping_an_edge_fails() {
    assert!(check(VisitAction::CheckIn, VisitStatus::Pending).is_err());
    assert!(check(VisitAction::CheckOut, VisitStatus::Approved).is_err());
  }

  #[test]
  fn intents_map_to_presence_edges() {
    assert_eq!(MatchIntent::CheckIn.action(), VisitAction::CheckIn);
    assert_eq!(MatchIntent::CheckOut.action(), VisitAction::CheckOut);
    assert_eq!(
      MatchIntent::CheckIn.action().precondition(),
      VisitStatus::Approved
    );
    assert_eq!(
      MatchIntent::CheckOut.action().precondition(),
      VisitStatus::CheckedIn
    );
  }
}
