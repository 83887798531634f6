use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the instance type reference dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceTypeInfo {
    pub instance_type: String,

    #[serde(default)]
    pub family: Option<String>,

    /// Pricing blocks keyed by region; the inner layout is left opaque
    #[serde(default)]
    pub pricing: BTreeMap<String, Value>,
}

/// Indexed view over the reference dataset, loaded once per process
#[derive(Debug, Clone, Default)]
pub struct InstanceCatalog {
    by_type: HashMap<String, InstanceTypeInfo>,
    regions: BTreeSet<String>,
}

impl InstanceCatalog {
    pub fn new(entries: Vec<InstanceTypeInfo>) -> Self {
        let regions = entries
            .iter()
            .flat_map(|entry| entry.pricing.keys().cloned())
            .collect();
        let by_type = entries
            .into_iter()
            .map(|entry| (entry.instance_type.clone(), entry))
            .collect();
        Self { by_type, regions }
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    pub fn get(&self, instance_type: &str) -> Option<&InstanceTypeInfo> {
        self.by_type.get(instance_type)
    }

    /// Regions that have pricing data for at least one type, sorted
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(String::as_str)
    }

    /// Instance types with pricing data in `region`, sorted
    pub fn types_in_region(&self, region: &str) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .by_type
            .values()
            .filter(|entry| entry.pricing.contains_key(region))
            .map(|entry| entry.instance_type.as_str())
            .collect();
        types.sort_unstable();
        types
    }
}
