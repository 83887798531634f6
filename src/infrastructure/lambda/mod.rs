//! Serverless platform integration
//!
//! - Invocation mode detection from the process environment
//! - A minimal client for the platform's runtime API
//! - The event loop feeding invocations to the dispatcher

pub mod event_loop;
pub mod mode;
pub mod runtime_api;

pub use event_loop::EventLoop;
pub use mode::InvocationMode;
pub use runtime_api::{Invocation, RuntimeApiClient};
