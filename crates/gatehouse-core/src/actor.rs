//! Actors — the humans who approve, reject, and override.
//!
//! Only `role` and `department_id` matter to this core; everything else about
//! a host or admin lives with the external profile store.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Linearly ordered permission level. The derived `Ord` follows declaration
/// order, so `Host < Admin < SuperAdmin` — the entire hierarchy lives in this
/// one declaration.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
  Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  Host,
  Admin,
  SuperAdmin,
}

impl Role {
  /// True iff `self` sits at or above `required` in the hierarchy.
  pub fn at_least(self, required: Role) -> bool { self >= required }
}

/// The identity a transport layer resolved for the caller. How it was
/// authenticated (session, token) is not this crate's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub actor_id:      Uuid,
  pub role:          Role,
  /// `None` for actors not tied to any department (typically super-admins).
  pub department_id: Option<Uuid>,
}
