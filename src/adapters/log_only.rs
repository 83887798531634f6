use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::models::{ConfigModel, InstanceCatalog, NotificationAction, ScheduleInstant};
use crate::domain::ports::{FleetReplacementEngine, TerminationHandler};
use crate::services::ScheduleGate;

/// What a replacement pass would touch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementPlan {
    /// Catalog regions that pass the region allow-list, sorted
    pub regions: Vec<String>,
    /// Whether the global schedule permits replacements right now
    pub schedule_permits: bool,
}

impl ReplacementPlan {
    pub fn build(config: &ConfigModel, catalog: &InstanceCatalog, now: ScheduleInstant) -> Self {
        let regions = catalog
            .regions()
            .filter(|region| config.region_enabled(region))
            .map(str::to_string)
            .collect();

        Self {
            regions,
            schedule_permits: ScheduleGate::from_config(config).permits(now),
        }
    }
}

/// Replacement engine that plans a pass and logs it without side effects
#[derive(Debug, Default)]
pub struct LoggingReplacementEngine;

#[async_trait]
impl FleetReplacementEngine for LoggingReplacementEngine {
    async fn run(&self, config: &ConfigModel, catalog: &InstanceCatalog) -> Result<()> {
        let plan = ReplacementPlan::build(config, catalog, ScheduleInstant::now());

        if !plan.schedule_permits {
            info!(
                cron_schedule = %config.cron_schedule,
                cron_schedule_state = %config.cron_schedule_state,
                "replacements not permitted by the schedule at this time"
            );
        }
        if plan.regions.is_empty() {
            warn!(regions = %config.regions, "no enabled region has instance data");
        }

        for region in &plan.regions {
            info!(
                region = %region,
                instance_types = catalog.types_in_region(region).len(),
                tag_filtering_mode = %config.tag_filtering_mode,
                replacements_permitted = plan.schedule_permits,
                "region selected for processing"
            );
        }
        Ok(())
    }
}

/// Termination handler that only reports the interruption it was given
#[derive(Debug, Default)]
pub struct LoggingTerminationHandler;

#[async_trait]
impl TerminationHandler for LoggingTerminationHandler {
    async fn execute_action(
        &self,
        instance_id: &str,
        region: &str,
        action: NotificationAction,
    ) -> Result<()> {
        info!(
            instance_id = %instance_id,
            region = %region,
            action = %action,
            without_lifecycle_hook = %action.resolve(false),
            with_lifecycle_hook = %action.resolve(true),
            "interrupted instance would be handled"
        );
        Ok(())
    }
}
