use serde_json::Value;
use tracing::{debug, info};

use crate::domain::models::{Action, ClassifiedEvent, ConfigModel, InstanceDetail};

/// Turns a classified event into the action the agent should take
#[derive(Debug, Clone, Copy, Default)]
pub struct EventRouter;

impl EventRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn route(&self, event: &ClassifiedEvent, config: &ConfigModel) -> Action {
        let action = match event {
            ClassifiedEvent::Interruption { region, detail } => {
                match instance_due_for_termination(detail) {
                    Some(instance_id) => Action::InvokeTermination {
                        instance_id,
                        region: region.clone(),
                        notification_action: config.termination_notification_action,
                    },
                    None => {
                        debug!(region = %region, "interruption detail names no terminating instance");
                        Action::NoAction
                    }
                }
            }
            ClassifiedEvent::Scheduled { .. } => Action::InvokeScheduledRun,
            ClassifiedEvent::Unrecognized => Action::NoAction,
        };

        info!(event = event.kind(), action = ?action, "routed event");
        action
    }
}

/// Instance id from an interruption detail, if it announces a termination
///
/// A detail that does not decode is treated like one that names no instance.
pub fn instance_due_for_termination(detail: &Value) -> Option<String> {
    let detail: InstanceDetail = match serde_json::from_value(detail.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "unreadable interruption detail");
            return None;
        }
    };
    detail.terminating_instance().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{NotificationAction, RawSettings};
    use serde_json::json;

    fn config(action: &str) -> ConfigModel {
        ConfigModel::build(&RawSettings {
            termination_notification_action: action.to_string(),
            ..RawSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_interruption_carries_configured_action_and_event_region() {
        let event = ClassifiedEvent::Interruption {
            region: "eu-central-1".into(),
            detail: json!({"instance-id": "i-0123", "instance-action": "terminate"}),
        };
        let mut cfg = config("detach");
        cfg.main_region = "us-east-1".into();

        assert_eq!(
            EventRouter::new().route(&event, &cfg),
            Action::InvokeTermination {
                instance_id: "i-0123".into(),
                region: "eu-central-1".into(),
                notification_action: NotificationAction::Detach,
            }
        );
    }

    #[test]
    fn test_interruption_without_terminating_instance_is_no_action() {
        let router = EventRouter::new();
        let cfg = config("auto");
        for detail in [
            json!({"instance-id": "i-1", "state": "running"}),
            json!({"instance-action": "terminate"}),
            json!(null),
            json!("garbage"),
            json!({"instance-id": 7}),
        ] {
            let event = ClassifiedEvent::Interruption {
                region: "us-east-1".into(),
                detail,
            };
            assert_eq!(router.route(&event, &cfg), Action::NoAction);
        }
    }

    #[test]
    fn test_scheduled_and_unrecognized() {
        let router = EventRouter::new();
        let cfg = config("auto");
        assert_eq!(
            router.route(&ClassifiedEvent::Scheduled { region: "eu-west-1".into() }, &cfg),
            Action::InvokeScheduledRun
        );
        assert_eq!(
            router.route(&ClassifiedEvent::Unrecognized, &cfg),
            Action::NoAction
        );
    }
}
