//! [`Orchestrator`] — approve, reject, manual presence overrides, and the
//! biometric match path.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use gatehouse_core::{
  ACCEPTANCE_THRESHOLD,
  actor::Actor,
  gateway::{GatewayError, MatchGateway},
  policy,
  store::{TransitionOutcome, VisitStore, VisitorDirectory},
  transition::{self, MatchIntent, VisitAction, VisitPatch},
  visit::Visit,
  visitor::Visitor,
};

use crate::{Error, Result};

/// How long `process_match` waits on the gateway before failing with
/// `ServiceUnavailable`. Overridable via [`Orchestrator::with_gateway_timeout`].
const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// What a successful biometric transition reports back to the kiosk.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
  pub visitor:    Visitor,
  pub visit:      Visit,
  pub similarity: f32,
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// The single write path for visit status.
///
/// Cheap to clone — all collaborators are behind `Arc`s.
pub struct Orchestrator<V, D, G> {
  visits:          Arc<V>,
  visitors:        Arc<D>,
  gateway:         Arc<G>,
  gateway_timeout: Duration,
}

impl<V, D, G> Clone for Orchestrator<V, D, G> {
  fn clone(&self) -> Self {
    Self {
      visits:          Arc::clone(&self.visits),
      visitors:        Arc::clone(&self.visitors),
      gateway:         Arc::clone(&self.gateway),
      gateway_timeout: self.gateway_timeout,
    }
  }
}

impl<V, D, G> Orchestrator<V, D, G>
where
  V: VisitStore + 'static,
  D: VisitorDirectory + 'static,
  G: MatchGateway + 'static,
{
  pub fn new(visits: Arc<V>, visitors: Arc<D>, gateway: Arc<G>) -> Self {
    Self {
      visits,
      visitors,
      gateway,
      gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
    }
  }

  pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
    self.gateway_timeout = timeout;
    self
  }

  // ── Decisions ─────────────────────────────────────────────────────────────

  /// `Pending → Approved`. On success, enrols the visitor with the biometric
  /// gateway in a detached task (§ [`spawn_registration`]).
  ///
  /// [`spawn_registration`]: Orchestrator::spawn_registration
  pub async fn approve(&self, visit_id: Uuid, actor: &Actor) -> Result<Visit> {
    let visit = self.decide(VisitAction::Approve, visit_id, actor).await?;
    self.spawn_registration(visit.visitor_id);
    Ok(visit)
  }

  /// `Pending → Rejected`. Same guard as approval; the decision record names
  /// the rejecting actor.
  pub async fn reject(&self, visit_id: Uuid, actor: &Actor) -> Result<Visit> {
    self.decide(VisitAction::Reject, visit_id, actor).await
  }

  async fn decide(
    &self,
    action: VisitAction,
    visit_id: Uuid,
    actor: &Actor,
  ) -> Result<Visit> {
    let visit = self.load(visit_id).await?;

    // Assigned-host override first, then Admin-or-above scoped to the
    // visit's department.
    if !policy::may_decide(actor, &visit) {
      tracing::debug!(
        %visit_id,
        actor_id = %actor.actor_id,
        role = %actor.role,
        %action,
        "decision denied by policy"
      );
      return Err(Error::PermissionDenied { action });
    }

    transition::check(action, visit.status).map_err(Error::Domain)?;

    let patch = VisitPatch::decision(action, actor.actor_id, Utc::now());
    let updated = self.apply(visit_id, action, patch).await?;

    tracing::info!(
      %visit_id,
      actor_id = %actor.actor_id,
      status = %updated.status,
      "visit decision recorded"
    );
    Ok(updated)
  }

  // ── Manual presence overrides ─────────────────────────────────────────────

  /// `Approved → CheckedIn` without a biometric match — an administrative
  /// fallback for when the kiosk cannot recognise a legitimate visitor.
  pub async fn check_in(&self, visit_id: Uuid, actor: &Actor) -> Result<Visit> {
    self.override_presence(VisitAction::CheckIn, visit_id, actor).await
  }

  /// `CheckedIn → CheckedOut`, same rules as [`check_in`].
  ///
  /// [`check_in`]: Orchestrator::check_in
  pub async fn check_out(&self, visit_id: Uuid, actor: &Actor) -> Result<Visit> {
    self.override_presence(VisitAction::CheckOut, visit_id, actor).await
  }

  async fn override_presence(
    &self,
    action: VisitAction,
    visit_id: Uuid,
    actor: &Actor,
  ) -> Result<Visit> {
    let visit = self.load(visit_id).await?;

    if !policy::may_override_presence(actor, &visit) {
      return Err(Error::PermissionDenied { action });
    }

    transition::check(action, visit.status).map_err(Error::Domain)?;

    let updated = self
      .apply(visit_id, action, Self::presence_patch(action))
      .await?;

    if action == VisitAction::CheckIn {
      self.refresh_last_visit(updated.visitor_id).await;
    }

    tracing::info!(
      %visit_id,
      actor_id = %actor.actor_id,
      status = %updated.status,
      "manual presence override applied"
    );
    Ok(updated)
  }

  // ── Biometric path ────────────────────────────────────────────────────────

  /// Advance the matched visitor's eligible visit along the edge `intent`
  /// asks for. No human role is involved: a match at or above
  /// [`ACCEPTANCE_THRESHOLD`] is the authorization.
  ///
  /// Nothing is mutated unless the match is accepted and an eligible visit
  /// exists.
  pub async fn process_match(
    &self,
    image: Bytes,
    intent: MatchIntent,
  ) -> Result<MatchOutcome> {
    let recognition = tokio::time::timeout(
      self.gateway_timeout,
      self.gateway.recognize(image),
    )
    .await
    .map_err(|_| Error::Gateway(GatewayError::Timeout))??;

    let Some(subject_id) = recognition.subject_id.filter(|_| recognition.matched)
    else {
      return Err(Error::NoMatch);
    };
    let similarity = recognition.similarity.unwrap_or(0.0);
    if similarity < ACCEPTANCE_THRESHOLD {
      tracing::debug!(
        %subject_id,
        similarity,
        "match below acceptance threshold; no visit touched"
      );
      return Err(Error::BelowThreshold { similarity });
    }

    let visitor = self
      .visitors
      .get_visitor(subject_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::VisitorNotFound(subject_id))?;

    let action = intent.action();
    let required = action.precondition();
    let visit = self
      .visits
      .latest_visit_in_status(subject_id, required)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NoEligibleVisit { required })?;

    let updated = self
      .apply(visit.visit_id, action, Self::presence_patch(action))
      .await?;

    if action == VisitAction::CheckIn {
      self.refresh_last_visit(updated.visitor_id).await;
    }

    tracing::info!(
      visit_id = %updated.visit_id,
      visitor_id = %subject_id,
      similarity,
      status = %updated.status,
      "biometric transition applied"
    );
    Ok(MatchOutcome { visitor, visit: updated, similarity })
  }

  // ── Shared plumbing ───────────────────────────────────────────────────────

  async fn load(&self, visit_id: Uuid) -> Result<Visit> {
    self
      .visits
      .get_visit(visit_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::VisitNotFound(visit_id))
  }

  /// The conditioned write. A `StatusMismatch` here means we lost a race
  /// after the pre-check; it surfaces as the same conflict a stale request
  /// gets.
  async fn apply(
    &self,
    visit_id: Uuid,
    action: VisitAction,
    patch: VisitPatch,
  ) -> Result<Visit> {
    match self
      .visits
      .transition(visit_id, action.precondition(), patch)
      .await
      .map_err(Error::store)?
    {
      TransitionOutcome::Applied(visit) => Ok(visit),
      TransitionOutcome::StatusMismatch { actual } => {
        tracing::debug!(%visit_id, %action, actual = %actual, "lost transition race");
        Err(Error::Domain(gatehouse_core::Error::WrongStatus {
          action,
          current: actual,
        }))
      }
    }
  }

  fn presence_patch(action: VisitAction) -> VisitPatch {
    match action {
      VisitAction::CheckIn => VisitPatch::check_in(Utc::now()),
      VisitAction::CheckOut => VisitPatch::check_out(Utc::now()),
      // Decisions go through VisitPatch::decision; never reached here.
      VisitAction::Approve | VisitAction::Reject => {
        unreachable!("presence patch requested for a decision action")
      }
    }
  }

  /// Best-effort: a failed marker refresh never fails the transition.
  async fn refresh_last_visit(&self, visitor_id: Uuid) {
    if let Err(e) = self.visitors.refresh_last_visit(visitor_id).await {
      tracing::warn!(%visitor_id, error = %e, "failed to refresh last-visit marker");
    }
  }

  /// Fire-and-forget enrolment of the visitor's reference image after an
  /// approval. Runs detached: it may complete after the approval response has
  /// been sent, its failures are logged and swallowed, and it never rolls
  /// back the approval.
  fn spawn_registration(&self, visitor_id: Uuid) {
    let visitors = Arc::clone(&self.visitors);
    let gateway = Arc::clone(&self.gateway);
    tokio::spawn(async move {
      let image = match visitors.reference_image(visitor_id).await {
        Ok(Some(image)) => image,
        Ok(None) => {
          tracing::warn!(
            %visitor_id,
            "no reference image on file; visitor will not be biometrically recognisable"
          );
          return;
        }
        Err(e) => {
          tracing::warn!(%visitor_id, error = %e, "reference image lookup failed");
          return;
        }
      };
      match gateway.register(visitor_id, image).await {
        Ok(()) => {
          tracing::debug!(%visitor_id, "biometric registration complete");
        }
        Err(e) => {
          tracing::warn!(%visitor_id, error = %e, "biometric registration failed");
        }
      }
    });
  }
}
