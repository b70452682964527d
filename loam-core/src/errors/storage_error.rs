//! Storage errors.

use super::error_code::{self, LoamErrorCode};

/// Errors that can occur in the SQLite persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Database busy: {message}")]
    Busy { message: String },

    #[error("Database corrupt: {message}")]
    Corrupt { message: String },

    #[error("Migration to version {version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Invalid SQL identifier `{name}`")]
    InvalidIdentifier { name: String },
}

impl StorageError {
    /// Classify a rusqlite error into the matching variant.
    pub fn from_sqlite(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _) => match code.code {
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    Self::Busy {
                        message: err.to_string(),
                    }
                }
                rusqlite::ErrorCode::DatabaseCorrupt | rusqlite::ErrorCode::NotADatabase => {
                    Self::Corrupt {
                        message: err.to_string(),
                    }
                }
                _ => Self::SqliteError {
                    message: err.to_string(),
                },
            },
            _ => Self::SqliteError {
                message: err.to_string(),
            },
        }
    }
}

impl LoamErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy { .. } => error_code::DB_BUSY,
            Self::Corrupt { .. } => error_code::DB_CORRUPT,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::Io { .. } => error_code::IO_ERROR,
            Self::InvalidIdentifier { .. } => error_code::INVALID_IDENTIFIER,
            Self::SqliteError { .. } => error_code::STORAGE_ERROR,
        }
    }
}
