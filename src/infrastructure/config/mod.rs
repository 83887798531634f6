//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Programmatic defaults
//! - Optional YAML file
//! - Command line flags and their environment variables
//! - Validation into a `ConfigModel`

pub mod loader;

pub use loader::ConfigLoader;
