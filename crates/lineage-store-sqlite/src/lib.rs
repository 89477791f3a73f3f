//! SQLite backend for the lineage family graph.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Nodes of every kind share one
//! table with their properties held as JSON; edges live in a second table
//! keyed by an autoincrementing identity.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteSession, SqliteStore};

#[cfg(test)]
mod tests;
