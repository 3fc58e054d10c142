//! Persistence
//!
//! SQLite connection pool, transactions and the schema.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
pub use migrations::{run_migrations, SCHEMA_VERSION};
