//! Service layer: classification, routing, schedule gating and dispatch.

pub mod dispatcher;
pub mod envelope_classifier;
pub mod event_router;
pub mod schedule_gate;

pub use dispatcher::Dispatcher;
pub use envelope_classifier::{EnvelopeClassifier, EnvelopeKind};
pub use event_router::EventRouter;
pub use schedule_gate::{ScheduleGate, ScheduleOverride};
