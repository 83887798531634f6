//! Invocation payload shapes and the decisions derived from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::settings::NotificationAction;

/// Detail type the cloud provider uses for spot reclaim warnings
pub const SPOT_INTERRUPTION_DETAIL_TYPE: &str = "EC2 Spot Instance Interruption Warning";

/// Instance state announcing an impending shutdown
pub const SHUTTING_DOWN_STATE: &str = "shutting-down";

/// Pub/sub delivery wrapper: a list of records, each carrying a message string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubSubEnvelope {
    #[serde(rename = "Records", alias = "records", default)]
    pub records: Option<Vec<PubSubRecord>>,
}

impl PubSubEnvelope {
    /// Inner message of the first record, if any record is present
    pub fn first_message(&self) -> Option<&str> {
        self.records
            .as_deref()
            .and_then(<[PubSubRecord]>::first)
            .map(|record| record.sns.message.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubSubRecord {
    #[serde(rename = "EventSource", alias = "eventSource", default)]
    pub event_source: String,

    #[serde(rename = "Sns", alias = "sns", default)]
    pub sns: PubSubMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubSubMessage {
    #[serde(rename = "MessageId", alias = "messageId", default)]
    pub message_id: String,

    #[serde(rename = "Message", alias = "message", default)]
    pub message: String,
}

/// Scheduled or state-change notification from the event bus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "detail-type", alias = "detailType", default)]
    pub detail_type: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub resources: Vec<String>,

    #[serde(default)]
    pub detail: Value,
}

impl Notification {
    pub fn is_spot_interruption(&self) -> bool {
        self.detail_type == SPOT_INTERRUPTION_DETAIL_TYPE
    }
}

/// Instance fields carried in an interruption or state-change detail
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstanceDetail {
    #[serde(rename = "instance-id", default)]
    pub instance_id: Option<String>,

    #[serde(rename = "instance-action", default)]
    pub instance_action: Option<String>,

    #[serde(default)]
    pub state: Option<String>,
}

impl InstanceDetail {
    /// The instance id, but only when the detail announces its termination
    pub fn terminating_instance(&self) -> Option<&str> {
        let id = self.instance_id.as_deref().filter(|id| !id.is_empty())?;
        let terminating = self.instance_action.is_some()
            || self.state.as_deref() == Some(SHUTTING_DOWN_STATE);
        terminating.then_some(id)
    }
}

/// Result of classifying one invocation payload
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedEvent {
    /// A spot reclaim warning for one instance
    Interruption {
        region: String,
        detail: Value,
    },
    /// Anything else the event bus delivers, treated as the timer tick
    Scheduled { region: String },
    /// Neither envelope shape decoded
    Unrecognized,
}

impl ClassifiedEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Interruption { .. } => "interruption",
            Self::Scheduled { .. } => "scheduled",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// What the agent will do for an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    InvokeTermination {
        instance_id: String,
        region: String,
        notification_action: NotificationAction,
    },
    InvokeScheduledRun,
    NoAction,
}

impl Action {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvokeTermination { .. } => "invoke_termination",
            Self::InvokeScheduledRun => "invoke_scheduled_run",
            Self::NoAction => "no_action",
        }
    }
}
