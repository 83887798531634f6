//! Spotswap - spot instance replacement agent
//!
//! Spotswap runs either inside a serverless platform, where it classifies
//! each delivered event and dispatches a replacement run or a termination
//! action, or directly from a shell, where it performs one replacement run.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): Settings, schedule and event models, errors and ports
//! - **Service Layer** (`services`): Classification, routing, schedule gating and dispatch
//! - **Infrastructure Layer** (`infrastructure`): Configuration, logging, dataset and runtime API
//! - **Adapters** (`adapters`): Log-only collaborator implementations
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use spotswap::{Dispatcher, ConfigLoader};
//!
//! let config = ConfigLoader::load(None, &overrides)?;
//! let dispatcher = Dispatcher::new(config.into(), catalog.into(), engine, terminator);
//! let action = dispatcher.handle_event(payload).await;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{Action, ClassifiedEvent, ConfigModel, InstanceCatalog, RawSettings};
pub use domain::ports::{FleetReplacementEngine, InstanceDataSource, TerminationHandler};
pub use domain::{ClassifyError, ConfigError, InstanceDataError, RuntimeApiError};
pub use infrastructure::config::ConfigLoader;
pub use services::{Dispatcher, EnvelopeClassifier, EventRouter, ScheduleGate};
