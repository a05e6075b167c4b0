//! The `VisitStore` and `VisitorDirectory` traits.
//!
//! Implemented by storage backends (e.g. `gatehouse-store-sqlite`). The
//! orchestrator and the HTTP layer depend on these abstractions, not on any
//! concrete backend. Connection lifecycle (connect/reconnect/close) belongs
//! to the backend, never to this core.

use std::future::Future;

use bytes::Bytes;
use uuid::Uuid;

use crate::{
  transition::VisitPatch,
  visit::{NewVisit, Visit, VisitStatus},
  visitor::Visitor,
};

// ─── Conditioned-write outcome ───────────────────────────────────────────────

/// Result of a compare-and-set transition attempt on a visit that exists.
///
/// A mismatch is a normal, expected outcome — it is how a lost race or a
/// stale request surfaces — so it is data, not an error. Backend failures
/// (I/O, corruption) remain errors.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
  /// The status matched `expected` at write time; the patch was applied
  /// atomically and this is the refreshed row.
  Applied(Visit),
  /// The status no longer matched; nothing was written.
  StatusMismatch { actual: VisitStatus },
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Abstraction over the visit record store.
///
/// The status-changing write is [`transition`]: a single conditioned update,
/// so that of two racing transitions on the same visit exactly one observes
/// `Applied` and the other `StatusMismatch`.
///
/// [`transition`]: VisitStore::transition
pub trait VisitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new visit in `Pending`. The store assigns `visit_id` and
  /// `submitted_at`.
  fn add_visit(
    &self,
    input: NewVisit,
  ) -> impl Future<Output = Result<Visit, Self::Error>> + Send + '_;

  /// Retrieve a visit by id. Returns `None` if not found.
  fn get_visit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Visit>, Self::Error>> + Send + '_;

  /// List visits, newest first, optionally filtered by status.
  fn list_visits(
    &self,
    status: Option<VisitStatus>,
  ) -> impl Future<Output = Result<Vec<Visit>, Self::Error>> + Send + '_;

  /// The most recently submitted visit for `visitor_id` currently in
  /// `status`, or `None`. Used to pick which visit a biometric match
  /// advances.
  fn latest_visit_in_status(
    &self,
    visitor_id: Uuid,
    status: VisitStatus,
  ) -> impl Future<Output = Result<Option<Visit>, Self::Error>> + Send + '_;

  /// Atomically apply `patch` iff the visit's status still equals `expected`
  /// at write time. A missing visit is a backend error; a status mismatch is
  /// reported in the outcome.
  fn transition(
    &self,
    visit_id: Uuid,
    expected: VisitStatus,
    patch: VisitPatch,
  ) -> impl Future<Output = Result<TransitionOutcome, Self::Error>> + Send + '_;
}

/// Read/refresh access to visitor records owned by the external profile
/// store.
pub trait VisitorDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a visitor by id. Returns `None` if not found.
  fn get_visitor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Visitor>, Self::Error>> + Send + '_;

  /// Bump the visitor's last-visit marker to now.
  fn refresh_last_visit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The visitor's stored enrolment photo, if one is on file.
  fn reference_image(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Bytes>, Self::Error>> + Send + '_;
}
