//! Idlecart Storage Layer
//!
//! One SQLite database per storage partition. The `entries` table is the
//! shared medium the presence protocol runs over: individual gets and sets
//! are atomic, read-modify-write sequences across handles are not, and the
//! last writer wins. The `settings` table holds server-owned configuration.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
