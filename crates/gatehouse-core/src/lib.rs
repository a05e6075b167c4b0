//! Core types and trait definitions for the Gatehouse visit tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod actor;
pub mod error;
pub mod gateway;
pub mod policy;
pub mod store;
pub mod transition;
pub mod visit;
pub mod visitor;

pub use error::{Error, ErrorClass, Result};

/// Minimum similarity at which a biometric match is treated as authoritative
/// for a state transition. Part of the external contract; not configuration.
pub const ACCEPTANCE_THRESHOLD: f32 = 0.9;
