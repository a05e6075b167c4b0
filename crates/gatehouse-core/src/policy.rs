//! Role and department policy — pure functions, no state.
//!
//! Every authorization question in the system reduces to the two functions
//! here plus the assigned-host override. Handlers never re-derive role or
//! department logic themselves.

use uuid::Uuid;

use crate::{
  actor::{Actor, Role},
  visit::Visit,
};

/// Combined role-and-department check.
///
/// Grants iff the actor's role satisfies `required` AND one of:
/// the actor is a super-admin (department scoping never applies to them),
/// the resource carries no department, or the departments match exactly.
pub fn can_access(
  actor: &Actor,
  resource_department: Option<Uuid>,
  required: Role,
) -> bool {
  if !actor.role.at_least(required) {
    return false;
  }
  if actor.role == Role::SuperAdmin {
    return true;
  }
  match resource_department {
    None => true,
    Some(dept) => actor.department_id == Some(dept),
  }
}

/// May this actor approve or reject this visit?
///
/// The assigned host is always authorized for their own visit, independent of
/// department scoping or role level; this identity override is evaluated
/// before the role policy. Everyone else needs Admin-or-above scoped to the
/// visit's department.
pub fn may_decide(actor: &Actor, visit: &Visit) -> bool {
  if actor.actor_id == visit.host_id {
    return true;
  }
  can_access(actor, visit.department_id, Role::Admin)
}

/// May this actor manually override a check-in or check-out?
///
/// No host-identity shortcut here: the physical-presence edges are normally
/// driven by the biometric path, and the manual fallback is an administrative
/// action, Admin-or-above scoped to the visit's department.
pub fn may_override_presence(actor: &Actor, visit: &Visit) -> bool {
  can_access(actor, visit.department_id, Role::Admin)
}
