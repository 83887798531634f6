//! Invocation core shared by both entry modes.
//!
//! A [`Dispatcher`] is built once per process from the validated settings
//! and the reference dataset, then handles any number of invocations.
//! It holds no mutable state.

use std::sync::Arc;

use tracing::{error, info, instrument};

use super::envelope_classifier::EnvelopeClassifier;
use super::event_router::EventRouter;
use crate::domain::models::tags::format_tag_filters;
use crate::domain::models::{Action, ConfigModel, InstanceCatalog};
use crate::domain::ports::{FleetReplacementEngine, TerminationHandler};

pub struct Dispatcher {
    config: Arc<ConfigModel>,
    catalog: Arc<InstanceCatalog>,
    engine: Arc<dyn FleetReplacementEngine>,
    terminator: Arc<dyn TerminationHandler>,
    classifier: EnvelopeClassifier,
    router: EventRouter,
}

impl Dispatcher {
    pub fn new(
        config: Arc<ConfigModel>,
        catalog: Arc<InstanceCatalog>,
        engine: Arc<dyn FleetReplacementEngine>,
        terminator: Arc<dyn TerminationHandler>,
    ) -> Self {
        Self {
            config,
            catalog,
            engine,
            terminator,
            classifier: EnvelopeClassifier::new(),
            router: EventRouter::new(),
        }
    }

    pub fn config(&self) -> &ConfigModel {
        &self.config
    }

    /// Handle one platform-delivered payload
    ///
    /// Never fails: unparseable payloads and collaborator errors are logged
    /// so the platform does not redeliver the event. Returns the action
    /// that was carried out.
    #[instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub async fn handle_event(&self, payload: &[u8]) -> Action {
        let event = self.classifier.classify(payload);
        let action = self.router.route(&event, &self.config);
        self.perform(&action).await;
        action
    }

    /// Direct-mode entry: one scheduled run, no classification
    pub async fn run_scheduled(&self) {
        self.perform(&Action::InvokeScheduledRun).await;
    }

    async fn perform(&self, action: &Action) {
        match action {
            Action::InvokeTermination {
                instance_id,
                region,
                notification_action,
            } => {
                info!(
                    instance_id = %instance_id,
                    region = %region,
                    action = %notification_action,
                    "handling spot interruption"
                );
                if let Err(e) = self
                    .terminator
                    .execute_action(instance_id, region, *notification_action)
                    .await
                {
                    error!(instance_id = %instance_id, error = %e, "termination handler failed");
                }
            }
            Action::InvokeScheduledRun => {
                log_settings(&self.config);
                if let Err(e) = self.engine.run(&self.config, &self.catalog).await {
                    error!(error = %e, "replacement run failed");
                }
                info!("execution completed, nothing left to do");
            }
            Action::NoAction => {
                info!("nothing to do for this event");
            }
        }
    }
}

/// One structured line with every effective setting
pub fn log_settings(config: &ConfigModel) {
    info!(
        main_region = %config.main_region,
        regions = %config.regions,
        min_on_demand_number = config.min_on_demand_number,
        min_on_demand_percentage = %format!("{:.1}", config.min_on_demand_percentage),
        allowed_instance_types = %config.allowed_instance_types,
        disallowed_instance_types = %config.disallowed_instance_types,
        on_demand_price_multiplier = %format!("{:.2}", config.on_demand_price_multiplier),
        spot_price_buffer_percentage = %format!("{:.3}", config.spot_price_buffer_percentage),
        bidding_policy = config.bidding_policy.as_str(),
        tag_filters = %format_tag_filters(&config.tag_filters),
        tag_filtering_mode = %config.tag_filtering_mode,
        spot_product_description = %config.spot_product_description,
        instance_termination_method = config.instance_termination_method.as_str(),
        termination_notification_action = %config.termination_notification_action,
        cron_schedule = %config.cron_schedule,
        cron_schedule_state = %config.cron_schedule_state,
        "effective settings"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{NotificationAction, RawSettings};
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        runs: Mutex<u32>,
        terminations: Mutex<Vec<(String, String, NotificationAction)>>,
        fail: bool,
    }

    #[async_trait]
    impl FleetReplacementEngine for Recorder {
        async fn run(&self, _config: &ConfigModel, _catalog: &InstanceCatalog) -> Result<()> {
            *self.runs.lock().unwrap() += 1;
            if self.fail {
                anyhow::bail!("engine exploded");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TerminationHandler for Recorder {
        async fn execute_action(
            &self,
            instance_id: &str,
            region: &str,
            action: NotificationAction,
        ) -> Result<()> {
            self.terminations
                .lock()
                .unwrap()
                .push((instance_id.to_string(), region.to_string(), action));
            if self.fail {
                anyhow::bail!("handler exploded");
            }
            Ok(())
        }
    }

    fn dispatcher(recorder: &Arc<Recorder>) -> Dispatcher {
        let config = ConfigModel::build(&RawSettings::default()).unwrap();
        Dispatcher::new(
            Arc::new(config),
            Arc::new(InstanceCatalog::default()),
            recorder.clone(),
            recorder.clone(),
        )
    }

    #[tokio::test]
    async fn test_scheduled_event_runs_engine_once() {
        let recorder = Arc::new(Recorder::default());
        let payload = json!({"detail-type": "Scheduled Event", "region": "eu-west-1"});

        let action = dispatcher(&recorder)
            .handle_event(payload.to_string().as_bytes())
            .await;

        assert_eq!(action, Action::InvokeScheduledRun);
        assert_eq!(*recorder.runs.lock().unwrap(), 1);
        assert!(recorder.terminations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_interruption_reaches_termination_handler() {
        let recorder = Arc::new(Recorder::default());
        let payload = json!({
            "detail-type": "EC2 Spot Instance Interruption Warning",
            "region": "us-east-1",
            "detail": {"instance-id": "i-0123", "instance-action": "terminate"}
        });

        dispatcher(&recorder)
            .handle_event(payload.to_string().as_bytes())
            .await;

        assert_eq!(*recorder.runs.lock().unwrap(), 0);
        assert_eq!(
            recorder.terminations.lock().unwrap().as_slice(),
            &[("i-0123".to_string(), "us-east-1".to_string(), NotificationAction::Auto)]
        );
    }

    #[tokio::test]
    async fn test_garbage_payload_does_nothing() {
        let recorder = Arc::new(Recorder::default());
        let action = dispatcher(&recorder).handle_event(b"\x00\x01").await;
        assert_eq!(action, Action::NoAction);
        assert_eq!(*recorder.runs.lock().unwrap(), 0);
        assert!(recorder.terminations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collaborator_errors_are_swallowed() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let d = dispatcher(&recorder);
        d.run_scheduled().await;
        let action = d
            .handle_event(
                json!({
                    "detail-type": "EC2 Spot Instance Interruption Warning",
                    "region": "us-east-1",
                    "detail": {"instance-id": "i-9", "instance-action": "stop"}
                })
                .to_string()
                .as_bytes(),
            )
            .await;
        assert!(matches!(action, Action::InvokeTermination { .. }));
        assert_eq!(*recorder.runs.lock().unwrap(), 1);
    }
}
