use anyhow::Result;
use async_trait::async_trait;

use super::error::InstanceDataError;
use super::models::{ConfigModel, InstanceCatalog, NotificationAction};

/// Fleet-wide replacement across every matching elastic group
///
/// Implementations discover groups on their own; the caller only decides
/// that a scheduled run should start. Schedule gating happens per group
/// inside the implementation.
#[async_trait]
pub trait FleetReplacementEngine: Send + Sync {
    /// Run one replacement pass
    ///
    /// # Arguments
    /// * `config` - Validated settings shared by the process
    /// * `catalog` - Instance type reference data loaded at startup
    async fn run(&self, config: &ConfigModel, catalog: &InstanceCatalog) -> Result<()>;
}

/// Handles a single instance that received an interruption warning
#[async_trait]
pub trait TerminationHandler: Send + Sync {
    /// Act on `instance_id` in `region`
    ///
    /// `action` may still be `auto`; resolving it against the group's
    /// lifecycle hooks is the handler's job.
    async fn execute_action(
        &self,
        instance_id: &str,
        region: &str,
        action: NotificationAction,
    ) -> Result<()>;
}

/// Source of the instance type reference dataset
#[async_trait]
pub trait InstanceDataSource: Send + Sync {
    async fn load(&self) -> Result<InstanceCatalog, InstanceDataError>;
}
