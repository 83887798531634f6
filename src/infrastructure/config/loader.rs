use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Format, Serialized, Yaml};
use figment::Figment;
use serde::Serialize;

use crate::domain::models::{ConfigModel, RawSettings};

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Base layers: programmatic defaults, then the optional YAML file
    pub fn figment(config_file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(RawSettings::default()));

        if let Some(path) = config_file {
            // an explicitly named file must exist; figment would silently skip it
            if !path.is_file() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        Ok(figment)
    }

    /// Load settings with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. YAML config file, when one is given
    /// 3. Explicit flags and their environment variables (`overrides`;
    ///    fields serialized as absent leave lower layers untouched)
    pub fn load(config_file: Option<&Path>, overrides: &impl Serialize) -> Result<ConfigModel> {
        let figment = Self::figment(config_file)?.merge(Serialized::defaults(overrides));
        Self::from_figment(&figment)
    }

    /// Extract and validate settings from an assembled figment
    pub fn from_figment(figment: &Figment) -> Result<ConfigModel> {
        let raw: RawSettings = figment
            .extract()
            .context("Failed to extract configuration from figment")?;

        let config = ConfigModel::build(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ConfigError;
    use crate::domain::models::{BiddingPolicy, ScheduleState};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Serialize, Default)]
    struct Overrides {
        #[serde(skip_serializing_if = "Option::is_none")]
        bidding_policy: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        min_on_demand_number: Option<i64>,
    }

    #[test]
    fn test_defaults_validate() {
        let config = ConfigLoader::load(None, &Overrides::default()).unwrap();
        assert_eq!(config.bidding_policy, BiddingPolicy::Normal);
        assert_eq!(config.cron_schedule.as_str(), "* *");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
regions: 'eu-*, us-east-1'
min_on_demand_percentage: 50
cron_schedule: '9-18 1-5'
cron_schedule_state: 'off'
tag_filters: 'team=vision'
";
        let raw: RawSettings = serde_yaml::from_str(yaml).expect("YAML should parse");
        assert_eq!(raw.regions, "eu-*, us-east-1");
        assert_eq!(raw.bidding_policy, "normal", "missing keys keep their defaults");

        let config = ConfigModel::build(&raw).unwrap();
        assert_eq!(config.regions.len(), 2);
        assert_eq!(config.cron_schedule_state, ScheduleState::Off);
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bidding_policy: aggressive\nmin_on_demand_number: 3\nregions: eu-west-1"
        )
        .unwrap();
        file.flush().unwrap();

        let overrides = Overrides {
            min_on_demand_number: Some(5),
            ..Overrides::default()
        };
        let config = ConfigLoader::load(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.min_on_demand_number, 5, "flags should win");
        assert_eq!(
            config.bidding_policy,
            BiddingPolicy::Aggressive,
            "file value should persist when not overridden"
        );
        assert!(config.region_enabled("eu-west-1"));
        assert!(!config.region_enabled("eu-west-2"));
    }

    #[test]
    fn test_single_key_providers() {
        let figment = ConfigLoader::figment(None)
            .unwrap()
            .merge(("cron_schedule", "9-18 1-5"))
            .merge(("min_on_demand_percentage", 12.5));
        let config = ConfigLoader::from_figment(&figment).unwrap();
        assert_eq!(config.cron_schedule.as_str(), "9-18 1-5");
        assert!((config.min_on_demand_percentage - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = ConfigLoader::load(
            Some(Path::new("/definitely/not/here.yaml")),
            &Overrides::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_error_is_preserved() {
        let overrides = Overrides {
            bidding_policy: Some("reckless".into()),
            ..Overrides::default()
        };
        let err = ConfigLoader::load(None, &overrides).unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().expect("ConfigError");
        assert_eq!(config_err.field(), "bidding_policy");
    }
}
