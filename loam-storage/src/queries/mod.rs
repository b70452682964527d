//! Query modules for each table family.

pub mod associations;
pub mod entry_data;
pub mod fields;
pub mod settings;
