//! Error types for every Loam subsystem.

pub mod config_error;
pub mod error_code;
pub mod field_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::LoamErrorCode;
pub use field_error::FieldError;
pub use storage_error::StorageError;
