//! Manager configuration.

pub mod manager_config;

pub use manager_config::ManagerConfig;
