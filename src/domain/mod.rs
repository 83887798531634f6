//! Domain layer for spotswap
//!
//! Settings, event shapes and the port traits for the collaborators
//! that act on the fleet.

pub mod error;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use error::{ClassifyError, ConfigError, InstanceDataError, RuntimeApiError};
