//! Actor identity extraction.
//!
//! Gatehouse does not authenticate anyone itself. A fronting layer (session
//! middleware, API gateway) verifies the caller and forwards who they are in
//! three headers; this module only parses them. Requests with no identity at
//! all are `401`, requests with a malformed identity are `400`.

use axum::http::HeaderMap;
use uuid::Uuid;

use gatehouse_core::actor::{Actor, Role};

use crate::ApiError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_DEPARTMENT_HEADER: &str = "x-actor-department";

pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
  let actor_id = required(headers, ACTOR_ID_HEADER)?;
  let role = required(headers, ACTOR_ROLE_HEADER)?;

  let actor_id = actor_id.parse::<Uuid>().map_err(|_| {
    ApiError::BadRequest(format!("malformed {ACTOR_ID_HEADER}"))
  })?;
  let role = role.parse::<Role>().map_err(|_| {
    ApiError::BadRequest(format!(
      "malformed {ACTOR_ROLE_HEADER}: expected host, admin, or super_admin"
    ))
  })?;

  let department_id = match headers.get(ACTOR_DEPARTMENT_HEADER) {
    None => None,
    Some(value) => {
      let s = value.to_str().map_err(|_| {
        ApiError::BadRequest(format!("malformed {ACTOR_DEPARTMENT_HEADER}"))
      })?;
      Some(s.parse::<Uuid>().map_err(|_| {
        ApiError::BadRequest(format!("malformed {ACTOR_DEPARTMENT_HEADER}"))
      })?)
    }
  };

  Ok(Actor { actor_id, role, department_id })
}

fn required<'a>(
  headers: &'a HeaderMap,
  name: &str,
) -> Result<&'a str, ApiError> {
  headers
    .get(name)
    .ok_or_else(|| {
      ApiError::Unauthenticated(format!("no actor identity: missing {name}"))
    })?
    .to_str()
    .map_err(|_| ApiError::BadRequest(format!("malformed {name}")))
}
