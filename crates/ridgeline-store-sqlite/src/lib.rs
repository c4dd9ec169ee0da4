//! SQLite backend for the Ridgeline spot store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each [`SpotStore`] operation is a
//! single statement or transaction, which is what lets the two feed loops
//! and the correlation engine share the store without in-process locks.
//!
//! [`SpotStore`]: ridgeline_core::store::SpotStore

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
