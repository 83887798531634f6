use tracing::{info, instrument};

use super::runtime_api::RuntimeApiClient;
use crate::domain::error::RuntimeApiError;
use crate::domain::models::Action;
use crate::services::Dispatcher;

/// Feeds runtime API invocations to the dispatcher
pub struct EventLoop<'a> {
    client: &'a RuntimeApiClient,
    dispatcher: &'a Dispatcher,
}

impl<'a> EventLoop<'a> {
    pub const fn new(client: &'a RuntimeApiClient, dispatcher: &'a Dispatcher) -> Self {
        Self { client, dispatcher }
    }

    /// Serve invocations until the runtime API fails
    ///
    /// The platform freezes or kills the process between invocations, so in
    /// practice this only returns on error.
    pub async fn run(&self) -> Result<(), RuntimeApiError> {
        info!("waiting for invocations");
        loop {
            self.process_next().await?;
        }
    }

    /// Fetch, handle and acknowledge exactly one invocation
    #[instrument(skip(self))]
    pub async fn process_next(&self) -> Result<Action, RuntimeApiError> {
        let invocation = self.client.next_invocation().await?;
        let action = self.dispatcher.handle_event(&invocation.payload).await;
        self.client.send_response(&invocation.request_id).await?;
        info!(
            request_id = %invocation.request_id,
            action = action.kind(),
            "invocation completed"
        );
        Ok(action)
    }
}
