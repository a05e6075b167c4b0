//! The transition orchestrator — the only mutator of a visit's status.
//!
//! Every lifecycle edge in the system goes through [`Orchestrator`]: it loads
//! the visit, evaluates the role/department policy (or lets a biometric match
//! stand in for it), validates the edge against the state machine, and applies
//! the store's conditioned write so that racing transitions cannot both
//! succeed. The biometric registration side effect after an approval runs
//! detached and is explicitly outside that atomicity boundary.

pub mod error;
mod orchestrator;

pub use error::{Error, Result};
pub use orchestrator::{MatchOutcome, Orchestrator};
