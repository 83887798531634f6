//! Infrastructure layer module
//!
//! This module contains the integrations with the outside world:
//! - Configuration management (figment)
//! - Logging infrastructure
//! - Instance type reference dataset loading
//! - Serverless platform runtime API
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod instance_data;
pub mod lambda;
pub mod logging;
