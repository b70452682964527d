//! loam-storage: SQLite persistence for the Loam field engine
//!
//! - Connection: pragma-configured SQLite connections
//! - Migrations: PRAGMA user_version driven schema setup
//! - Queries: one module per table or table family
//! - Manager: the `FieldManager` mediating all field CRUD, with a
//!   two-tier instance cache (type exemplars + hydrated fields by id)

pub mod connection;
pub mod manager;
pub mod migrations;
pub mod queries;

pub use manager::FieldManager;
