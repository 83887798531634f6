//! Operational settings.
//!
//! [`RawSettings`] is the flat key/value record assembled from defaults,
//! config files, flags and environment variables. [`ConfigModel::build`]
//! validates it into typed parameters. A built model is never mutated;
//! callers share it behind an `Arc`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::patterns::PatternList;
use super::schedule::{ScheduleState, ScheduleWindow};
use super::tags::{parse_tag_filters, TagFilter, TagFilteringMode};
use crate::domain::error::ConfigError;

/// Region used when the platform does not tell us where we run
pub const DEFAULT_MAIN_REGION: &str = "us-east-1";

/// Default spot bid buffer above the current spot price, in percent
pub const DEFAULT_SPOT_PRICE_BUFFER_PERCENTAGE: f64 = 10.0;

/// Default source of the instance type reference dataset
pub const DEFAULT_INSTANCE_DATA_URL: &str = "https://instances.vantage.sh/instances.json";

/// Flat, unvalidated settings exactly as operators spell them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RawSettings {
    pub main_region: String,
    pub regions: String,
    pub allowed_instance_types: String,
    pub disallowed_instance_types: String,
    pub bidding_policy: String,
    pub min_on_demand_number: i64,
    pub min_on_demand_percentage: f64,
    pub on_demand_price_multiplier: f64,
    pub spot_price_buffer_percentage: f64,
    pub spot_product_description: String,
    pub tag_filtering_mode: String,
    pub tag_filters: String,
    pub instance_termination_method: String,
    pub termination_notification_action: String,
    pub cron_schedule: String,
    pub cron_schedule_state: String,
    pub instance_data_url: String,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            main_region: DEFAULT_MAIN_REGION.to_string(),
            regions: String::new(),
            allowed_instance_types: String::new(),
            disallowed_instance_types: String::new(),
            bidding_policy: BiddingPolicy::default().as_str().to_string(),
            min_on_demand_number: 0,
            min_on_demand_percentage: 0.0,
            on_demand_price_multiplier: 1.0,
            spot_price_buffer_percentage: DEFAULT_SPOT_PRICE_BUFFER_PERCENTAGE,
            spot_product_description: SpotProductDescription::default().as_str().to_string(),
            tag_filtering_mode: TagFilteringMode::default().as_str().to_string(),
            tag_filters: String::new(),
            instance_termination_method: InstanceTerminationMethod::default()
                .as_str()
                .to_string(),
            termination_notification_action: NotificationAction::default().as_str().to_string(),
            cron_schedule: "* *".to_string(),
            cron_schedule_state: ScheduleState::default().as_str().to_string(),
            instance_data_url: DEFAULT_INSTANCE_DATA_URL.to_string(),
        }
    }
}

/// How spot bids are priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiddingPolicy {
    /// Bid the on-demand price (times the multiplier)
    #[default]
    Normal,
    /// Bid a buffer above the current spot price
    Aggressive,
}

impl BiddingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Aggressive => "aggressive",
        }
    }
}

impl FromStr for BiddingPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "aggressive" => Ok(Self::Aggressive),
            _ => Err(ConfigError::invalid(
                "bidding_policy",
                s,
                "must be one of: normal, aggressive",
            )),
        }
    }
}

/// How replaced on-demand instances are removed from their group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceTerminationMethod {
    /// Terminate through the group so lifecycle hooks run
    #[default]
    Terminate,
    /// Detach first, then terminate outside the group
    Detach,
}

impl InstanceTerminationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Terminate => "terminate",
            Self::Detach => "detach",
        }
    }
}

impl FromStr for InstanceTerminationMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "terminate" => Ok(Self::Terminate),
            "detach" => Ok(Self::Detach),
            _ => Err(ConfigError::invalid(
                "instance_termination_method",
                s,
                "must be one of: terminate, detach",
            )),
        }
    }
}

/// What to do with a spot instance that received an interruption warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationAction {
    /// Terminate when the group has a lifecycle hook, detach otherwise
    #[default]
    Auto,
    Terminate,
    Detach,
}

impl NotificationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Terminate => "terminate",
            Self::Detach => "detach",
        }
    }

    /// Collapse `auto` into a concrete action
    pub fn resolve(self, has_lifecycle_hook: bool) -> Self {
        match self {
            Self::Auto if has_lifecycle_hook => Self::Terminate,
            Self::Auto => Self::Detach,
            concrete => concrete,
        }
    }
}

impl FromStr for NotificationAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "terminate" => Ok(Self::Terminate),
            "detach" => Ok(Self::Detach),
            _ => Err(ConfigError::invalid(
                "termination_notification_action",
                s,
                "must be one of: auto, terminate, detach",
            )),
        }
    }
}

impl fmt::Display for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform strings accepted by the spot price history lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpotProductDescription {
    #[serde(rename = "Linux/UNIX")]
    LinuxUnix,
    #[serde(rename = "SUSE Linux")]
    SuseLinux,
    #[serde(rename = "Windows")]
    Windows,
    #[default]
    #[serde(rename = "Linux/UNIX (Amazon VPC)")]
    LinuxUnixVpc,
    #[serde(rename = "SUSE Linux (Amazon VPC)")]
    SuseLinuxVpc,
    #[serde(rename = "Windows (Amazon VPC)")]
    WindowsVpc,
}

impl SpotProductDescription {
    pub const ALL: [Self; 6] = [
        Self::LinuxUnix,
        Self::SuseLinux,
        Self::Windows,
        Self::LinuxUnixVpc,
        Self::SuseLinuxVpc,
        Self::WindowsVpc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinuxUnix => "Linux/UNIX",
            Self::SuseLinux => "SUSE Linux",
            Self::Windows => "Windows",
            Self::LinuxUnixVpc => "Linux/UNIX (Amazon VPC)",
            Self::SuseLinuxVpc => "SUSE Linux (Amazon VPC)",
            Self::WindowsVpc => "Windows (Amazon VPC)",
        }
    }
}

impl FromStr for SpotProductDescription {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| {
                let choices = Self::ALL.map(|d| d.as_str()).join(" | ");
                ConfigError::invalid(
                    "spot_product_description",
                    s,
                    format!("must be one of: {choices}"),
                )
            })
    }
}

impl fmt::Display for SpotProductDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective on-demand floor for a group
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OnDemandMinimum {
    None,
    Count(u64),
    Percentage(f64),
}

impl OnDemandMinimum {
    /// Number of instances that must stay on-demand in a group of `group_size`
    pub fn required(&self, group_size: u64) -> u64 {
        match *self {
            Self::None => 0,
            Self::Count(n) => n.min(group_size),
            Self::Percentage(p) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
                let needed = (group_size as f64 * p / 100.0).floor() as u64;
                needed.min(group_size)
            }
        }
    }
}

/// Validated operational parameters
#[derive(Debug, Clone)]
pub struct ConfigModel {
    /// Region the agent itself runs in
    pub main_region: String,
    /// Regions to act in; empty matches every region
    pub regions: PatternList,
    /// Instance types spot replacements may use; empty allows any
    pub allowed_instance_types: PatternList,
    /// Instance types never used; wins over the allowed list
    pub disallowed_instance_types: PatternList,
    pub bidding_policy: BiddingPolicy,
    /// On-demand instances kept per group; takes precedence over the percentage
    pub min_on_demand_number: u64,
    /// Share of each group kept on-demand, 0-100
    pub min_on_demand_percentage: f64,
    /// Factor applied to on-demand prices
    pub on_demand_price_multiplier: f64,
    /// Percentage above the spot price bid under the aggressive policy
    pub spot_price_buffer_percentage: f64,
    pub spot_product_description: SpotProductDescription,
    pub tag_filtering_mode: TagFilteringMode,
    /// Group tag filters, defaulted from the filtering mode when unset
    pub tag_filters: Vec<TagFilter>,
    pub instance_termination_method: InstanceTerminationMethod,
    /// Action taken on spot interruption warnings
    pub termination_notification_action: NotificationAction,
    /// Window gating replacement actions
    pub cron_schedule: ScheduleWindow,
    /// Whether actions happen inside or outside `cron_schedule`
    pub cron_schedule_state: ScheduleState,
    /// URL or path of the instance type dataset
    pub instance_data_url: String,
}

impl ConfigModel {
    /// Validate raw settings, stopping at the first invalid field
    pub fn build(raw: &RawSettings) -> Result<Self, ConfigError> {
        let main_region = raw.main_region.trim();
        if main_region.is_empty() {
            return Err(ConfigError::invalid(
                "main_region",
                &raw.main_region,
                "cannot be empty",
            ));
        }

        let regions = PatternList::parse("regions", &raw.regions)?;
        let allowed_instance_types =
            PatternList::parse("allowed_instance_types", &raw.allowed_instance_types)?;
        let disallowed_instance_types =
            PatternList::parse("disallowed_instance_types", &raw.disallowed_instance_types)?;
        let bidding_policy = raw.bidding_policy.parse()?;

        let min_on_demand_number = u64::try_from(raw.min_on_demand_number).map_err(|_| {
            ConfigError::invalid(
                "min_on_demand_number",
                raw.min_on_demand_number,
                "must be zero or greater",
            )
        })?;

        let min_on_demand_percentage = raw.min_on_demand_percentage;
        if !(0.0..=100.0).contains(&min_on_demand_percentage) {
            return Err(ConfigError::invalid(
                "min_on_demand_percentage",
                min_on_demand_percentage,
                "must be between 0 and 100",
            ));
        }

        let on_demand_price_multiplier = raw.on_demand_price_multiplier;
        if !on_demand_price_multiplier.is_finite() || on_demand_price_multiplier <= 0.0 {
            return Err(ConfigError::invalid(
                "on_demand_price_multiplier",
                on_demand_price_multiplier,
                "must be greater than 0",
            ));
        }

        let spot_price_buffer_percentage = raw.spot_price_buffer_percentage;
        if !spot_price_buffer_percentage.is_finite() || spot_price_buffer_percentage < 0.0 {
            return Err(ConfigError::invalid(
                "spot_price_buffer_percentage",
                spot_price_buffer_percentage,
                "must be zero or greater",
            ));
        }

        let spot_product_description = raw.spot_product_description.parse()?;
        let tag_filtering_mode: TagFilteringMode = raw.tag_filtering_mode.parse()?;
        let tag_filters = parse_tag_filters(&raw.tag_filters, tag_filtering_mode)?;
        let instance_termination_method = raw.instance_termination_method.parse()?;
        let termination_notification_action = raw.termination_notification_action.parse()?;
        let cron_schedule = raw.cron_schedule.parse()?;
        let cron_schedule_state = raw.cron_schedule_state.parse()?;

        let instance_data_url = raw.instance_data_url.trim();
        if instance_data_url.is_empty() {
            return Err(ConfigError::invalid(
                "instance_data_url",
                &raw.instance_data_url,
                "cannot be empty",
            ));
        }

        Ok(Self {
            main_region: main_region.to_string(),
            regions,
            allowed_instance_types,
            disallowed_instance_types,
            bidding_policy,
            min_on_demand_number,
            min_on_demand_percentage,
            on_demand_price_multiplier,
            spot_price_buffer_percentage,
            spot_product_description,
            tag_filtering_mode,
            tag_filters,
            instance_termination_method,
            termination_notification_action,
            cron_schedule,
            cron_schedule_state,
            instance_data_url: instance_data_url.to_string(),
        })
    }

    /// Whether replacement should run in `region`
    pub fn region_enabled(&self, region: &str) -> bool {
        self.regions.allows(region)
    }

    /// Allowed-list match and not on the disallowed list; disallow wins
    pub fn instance_type_permitted(&self, instance_type: &str) -> bool {
        self.allowed_instance_types.allows(instance_type)
            && !self.disallowed_instance_types.denies(instance_type)
    }

    /// The on-demand floor, with the absolute number taking precedence
    pub fn on_demand_minimum(&self) -> OnDemandMinimum {
        if self.min_on_demand_number > 0 {
            OnDemandMinimum::Count(self.min_on_demand_number)
        } else if self.min_on_demand_percentage > 0.0 {
            OnDemandMinimum::Percentage(self.min_on_demand_percentage)
        } else {
            OnDemandMinimum::None
        }
    }

    pub fn required_on_demand(&self, group_size: u64) -> u64 {
        self.on_demand_minimum().required(group_size)
    }

    /// Maximum spot bid given current spot and on-demand prices
    pub fn bid_price(&self, spot_price: f64, on_demand_price: f64) -> f64 {
        let on_demand_cap = on_demand_price * self.on_demand_price_multiplier;
        match self.bidding_policy {
            BiddingPolicy::Normal => on_demand_cap,
            BiddingPolicy::Aggressive => {
                let buffered = spot_price * (1.0 + self.spot_price_buffer_percentage / 100.0);
                buffered.min(on_demand_cap)
            }
        }
    }
}
