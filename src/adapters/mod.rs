//! Collaborator implementations wired in by the binary.
//!
//! The cloud-facing replacement engine and termination handler live outside
//! this crate; the log-only versions here report what would happen.

pub mod log_only;

pub use log_only::{LoggingReplacementEngine, LoggingTerminationHandler, ReplacementPlan};
