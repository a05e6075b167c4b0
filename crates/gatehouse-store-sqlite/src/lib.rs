//! SQLite backend for the Gatehouse visit store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. The status-changing write is a
//! single conditioned `UPDATE`, which is what makes concurrent transitions
//! lose cleanly instead of corrupting each other.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
