//! Core database infrastructure
//!
//! - `DatabaseConn`: SQLite connection wrapper, one per operation
//! - `SchemaManager`: table creation, reset and status checks
//! - `Table` / `SourceName`: the fixed table set and source registry names

mod connection;
mod schema;

pub use connection::DatabaseConn;
pub use schema::{
    reset_schema, SchemaDefinitions, SchemaManager, SchemaStatus, SourceName, Table,
};
