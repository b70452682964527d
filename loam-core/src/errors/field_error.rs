//! Field manager errors.

use super::error_code::{self, LoamErrorCode};
use super::storage_error::StorageError;

/// Errors that can occur while resolving, hydrating, or persisting fields.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error(
        "Unknown field type `{handle}`. Expected a manifest at {expected}; \
         if the type ships with a plugin, check that the plugin is enabled"
    )]
    UnknownType { handle: String, expected: String },

    #[error("Field {id} of type `{handle}` has no row in tbl_fields_{handle}")]
    MissingSettings { id: i64, handle: String },

    #[error("Field {id} not found")]
    NotFound { id: i64 },

    #[error("Invalid field handle `{handle}`: handles are lower-case [a-z0-9_]")]
    InvalidHandle { handle: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LoamErrorCode for FieldError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownType { .. } => error_code::UNKNOWN_TYPE,
            Self::MissingSettings { .. } => error_code::MISSING_SETTINGS,
            Self::NotFound { .. } => error_code::FIELD_NOT_FOUND,
            Self::InvalidHandle { .. } => error_code::INVALID_HANDLE,
            Self::Storage(err) => err.error_code(),
        }
    }
}
