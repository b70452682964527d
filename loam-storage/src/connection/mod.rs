//! Connection management: open a pragma-configured, migrated database.

pub mod pragmas;

use std::path::Path;

use loam_core::errors::StorageError;
use rusqlite::Connection;

use crate::migrations;

/// Open (or create) the database at `path`, apply pragmas, and run any
/// pending migrations.
pub fn open(path: &Path) -> Result<Connection, StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                message: format!("failed to create {}: {e}", parent.display()),
            })?;
        }
    }

    let conn = Connection::open(path).map_err(StorageError::from_sqlite)?;
    pragmas::apply_pragmas(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database, fully migrated. Used by tests and
/// short-lived tooling.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory().map_err(StorageError::from_sqlite)?;
    pragmas::apply_pragmas(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}
