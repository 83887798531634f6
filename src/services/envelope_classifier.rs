//! Invocation payload classification.
//!
//! Payloads arrive either as a bare event-bus notification or wrapped in a
//! pub/sub delivery envelope whose first record carries the notification as
//! a JSON string. Decoding is an ordered chain of attempts:
//!
//! 1. decode as a pub/sub envelope (any JSON object qualifies, with or
//!    without records);
//! 2. unwrap the first record's message when one is present;
//! 3. decode the working payload as a notification.
//!
//! A structural failure at either decode stops the chain and the payload
//! is dropped.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::error::ClassifyError;
use crate::domain::models::{ClassifiedEvent, Notification, PubSubEnvelope};

/// Which outer shape the notification was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// The payload itself was the notification
    Direct,
    /// The notification came from the first record's message
    PubSub,
}

/// Successful decode of both stages
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// Outer shape the notification was found in
    pub envelope: EnvelopeKind,
    /// The decoded notification
    pub notification: Notification,
}

/// Stateless classifier for raw invocation payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeClassifier;

impl EnvelopeClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Run the decode chain and return the notification it found
    pub fn decode(&self, payload: &[u8]) -> Result<Decoded, ClassifyError> {
        let envelope: PubSubEnvelope =
            decode_object(payload).map_err(ClassifyError::Envelope)?;

        let (kind, working) = match envelope.first_message() {
            Some(message) => (EnvelopeKind::PubSub, message.as_bytes()),
            None => (EnvelopeKind::Direct, payload),
        };

        let notification: Notification =
            decode_object(working).map_err(ClassifyError::Notification)?;

        Ok(Decoded {
            envelope: kind,
            notification,
        })
    }

    /// Classify a payload; decode failures are logged and become `Unrecognized`
    pub fn classify(&self, payload: &[u8]) -> ClassifiedEvent {
        let decoded = match self.decode(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(error = %e, payload_len = payload.len(), "dropping unparseable event");
                return ClassifiedEvent::Unrecognized;
            }
        };

        let Decoded {
            envelope,
            notification,
        } = decoded;

        debug!(
            envelope = ?envelope,
            detail_type = %notification.detail_type,
            region = %notification.region,
            "decoded notification"
        );

        let event = if notification.is_spot_interruption() {
            ClassifiedEvent::Interruption {
                region: notification.region,
                detail: notification.detail,
            }
        } else {
            ClassifiedEvent::Scheduled {
                region: notification.region,
            }
        };

        info!(kind = event.kind(), envelope = ?envelope, "classified event");
        event
    }
}

/// Decode `bytes` as a JSON object into `T`
///
/// Only objects (and `null`, read as an empty object) are accepted, so that
/// arrays and scalars fail structurally instead of filling fields by position.
fn decode_object<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    let object: Option<Map<String, Value>> = serde_json::from_slice(bytes)?;
    serde_json::from_value(Value::Object(object.unwrap_or_default()))
}
