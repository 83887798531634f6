//! Common test utilities for integration tests
//!
//! Provides shared fixtures, recording collaborators and payload builders
//! used across multiple integration test files.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use spotswap::domain::models::{InstanceTypeInfo, NotificationAction};
use spotswap::{
    ConfigModel, Dispatcher, FleetReplacementEngine, InstanceCatalog, RawSettings,
    TerminationHandler,
};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Engine and termination handler that record every call
#[derive(Default)]
pub struct Recorder {
    pub runs: Mutex<Vec<Vec<String>>>,
    pub terminations: Mutex<Vec<(String, String, NotificationAction)>>,
}

impl Recorder {
    pub fn run_count(&self) -> usize {
        self.runs.lock().unwrap().len()
    }

    pub fn terminations(&self) -> Vec<(String, String, NotificationAction)> {
        self.terminations.lock().unwrap().clone()
    }
}

#[async_trait]
impl FleetReplacementEngine for Recorder {
    async fn run(&self, config: &ConfigModel, catalog: &InstanceCatalog) -> Result<()> {
        let regions = catalog
            .regions()
            .filter(|region| config.region_enabled(region))
            .map(str::to_string)
            .collect();
        self.runs.lock().unwrap().push(regions);
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
        Ok(())
    }
}

/// Validated settings starting from the defaults
pub fn config_with(edit: impl FnOnce(&mut RawSettings)) -> ConfigModel {
    let mut raw = RawSettings::default();
    edit(&mut raw);
    ConfigModel::build(&raw).expect("test settings should validate")
}

/// Small dataset spanning three regions
pub fn dataset() -> Value {
    json!([
        {"instance_type": "m5.large", "family": "General purpose",
         "pricing": {"us-east-1": {}, "eu-west-1": {}}},
        {"instance_type": "c5.xlarge", "family": "Compute optimized",
         "pricing": {"us-east-1": {}, "ap-south-1": {}}}
    ])
}

pub fn catalog() -> InstanceCatalog {
    let entries: Vec<InstanceTypeInfo> =
        serde_json::from_value(dataset()).expect("dataset fixture should decode");
    InstanceCatalog::new(entries)
}

pub fn dispatcher(config: ConfigModel, recorder: &Arc<Recorder>) -> Dispatcher {
    Dispatcher::new(
        Arc::new(config),
        Arc::new(catalog()),
        recorder.clone(),
        recorder.clone(),
    )
}

/// Direct interruption notification for `instance_id`
pub fn interruption(instance_id: &str, region: &str) -> Value {
    json!({
        "version": "0",
        "id": "1e5527d7-bb36-4607-3370-4164db56a40e",
        "detail-type": "EC2 Spot Instance Interruption Warning",
        "source": "aws.ec2",
        "region": region,
        "resources": [format!("arn:aws:ec2:{region}:123456789012:instance/{instance_id}")],
        "detail": {"instance-id": instance_id, "instance-action": "terminate"}
    })
}

pub fn scheduled(region: &str) -> Value {
    json!({
        "id": "53dc4d37-cffa-4f76-80c9-8b7d4a4d2eaa",
        "detail-type": "Scheduled Event",
        "source": "aws.events",
        "region": region,
        "detail": {}
    })
}

/// Wrap a notification in a pub/sub delivery envelope
pub fn pubsub(inner: &Value) -> Value {
    json!({
        "Records": [{
            "EventSource": "aws:sns",
            "Sns": {"MessageId": "95df01b4-ee98-5cb9-9903-4c221d41eb5e", "Message": inner.to_string()}
        }]
    })
}

/// Write the dataset fixture to a temporary file
pub fn dataset_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("instances.json");
    std::fs::write(&path, dataset().to_string()).expect("Failed to write dataset");
    (dir, path)
}
