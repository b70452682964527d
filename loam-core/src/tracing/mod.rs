//! Tracing setup for embedders.

pub mod setup;

pub use setup::init_tracing;
