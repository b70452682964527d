//! LoamErrorCode trait for the embedding boundary.

/// Trait for converting Loam errors to stable boundary error codes.
/// Every error enum implements this so host applications get a
/// structured code string alongside the human-readable message.
pub trait LoamErrorCode {
    /// Returns the boundary error code string (e.g., "STORAGE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted boundary string: `[ERROR_CODE] message`.
    fn code_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants for the embedding boundary.
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const DB_CORRUPT: &str = "DB_CORRUPT";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const IO_ERROR: &str = "IO_ERROR";
pub const INVALID_IDENTIFIER: &str = "INVALID_IDENTIFIER";
pub const FIELD_ERROR: &str = "FIELD_ERROR";
pub const UNKNOWN_TYPE: &str = "UNKNOWN_TYPE";
pub const MISSING_SETTINGS: &str = "MISSING_SETTINGS";
pub const FIELD_NOT_FOUND: &str = "FIELD_NOT_FOUND";
pub const INVALID_HANDLE: &str = "INVALID_HANDLE";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
