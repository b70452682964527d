//! loam-core: Core building blocks for the Loam field engine
//!
//! This crate provides everything below the storage layer:
//! - Types: base field row plus the insert/update/query payloads
//! - Field: the field-type trait, prototype registry, and name resolver
//! - Discovery: manifest scanning across the core dir and enabled plugins
//! - Config: TOML-backed manager configuration
//! - Errors: one thiserror enum per subsystem, plus boundary error codes
//! - Tracing: idempotent logging setup

pub mod config;
pub mod discovery;
pub mod errors;
pub mod field;
pub mod tracing;
pub mod types;

// Re-exports for convenience
pub use config::ManagerConfig;
pub use errors::{ConfigError, FieldError, LoamErrorCode, StorageError};
pub use field::{
    Field, FieldRegistry, FieldType, Resolver, SettingColumn, SettingKind, SettingsMap,
};
pub use types::{FieldChanges, FieldLocation, FieldQuery, FieldRow, NewField, Restriction};
