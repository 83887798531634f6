//! CLI type definitions
//!
//! This module contains the clap structures that define the command line.
//! Every setting can also come from an environment variable of the same
//! name in upper case, and the underscore spelling of each flag is accepted.

use std::path::PathBuf;

use clap::{Args, Parser};
use serde::Serialize;

use crate::infrastructure::logging::{LogConfig, LogFormat, RotationPolicy};

#[derive(Parser, Debug)]
#[command(name = "spotswap")]
#[command(about = "Spotswap - replaces on-demand group capacity with spot instances", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    // handled by `version_requested` before full parsing; declared for --help
    /// Print version number and exit
    #[arg(long)]
    pub version: bool,

    /// YAML configuration file, merged below flags and environment variables
    #[arg(short, long, env = "SPOTSWAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, alias = "log_level", env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format (json, pretty)
    #[arg(long, alias = "log_format", env = "LOG_FORMAT", default_value = "json")]
    pub log_format: LogFormat,

    /// Also write JSON logs to rolling files in this directory
    #[arg(long, alias = "log_dir", env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log file rotation (daily, hourly, never)
    #[arg(long, alias = "log_rotation", env = "LOG_ROTATION", default_value = "daily")]
    pub log_rotation: RotationPolicy,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            format: self.log_format,
            log_dir: self.log_dir.clone(),
            rotation: self.log_rotation,
        }
    }
}

/// Operational settings given on the command line or through the environment
///
/// Unset fields are skipped on serialization so lower configuration layers
/// keep their values.
#[derive(Args, Debug, Default, Serialize)]
pub struct SettingsArgs {
    /// Region the agent runs in; used for its own API calls
    #[arg(long, alias = "main_region", env = "AWS_REGION")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_region: Option<String>,

    /// Regions where it should be activated (comma or whitespace separated, supports globs).
    /// By default it runs on all regions. Example: 'eu-*,us-east-1'
    #[arg(long, env = "REGIONS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<String>,

    /// If specified, spot instances will be searched only among these types (supports globs).
    /// Example: 'c5.*,c4.xlarge'
    #[arg(long, alias = "allowed_instance_types", env = "ALLOWED_INSTANCE_TYPES")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_instance_types: Option<String>,

    /// If specified, spot instances will never be of these types (supports globs).
    /// Example: 't2.*,c4.xlarge'
    #[arg(long, alias = "disallowed_instance_types", env = "DISALLOWED_INSTANCE_TYPES")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disallowed_instance_types: Option<String>,

    /// Spot bid policy: 'normal' bids the on-demand price (times the multiplier),
    /// 'aggressive' bids spot_price_buffer_percentage above the spot price
    #[arg(long, alias = "bidding_policy", env = "BIDDING_POLICY")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidding_policy: Option<String>,

    /// Number of on-demand instances to keep running in each group
    #[arg(long, alias = "min_on_demand_number", env = "MIN_ON_DEMAND_NUMBER", allow_negative_numbers = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_on_demand_number: Option<i64>,

    /// Percentage of each group to keep on-demand; ignored when min_on_demand_number is set
    #[arg(long, alias = "min_on_demand_percentage", env = "MIN_ON_DEMAND_PERCENTAGE", allow_negative_numbers = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_on_demand_percentage: Option<f64>,

    /// Multiplier for the on-demand price; values below 1.0 model volume discounts
    #[arg(long, alias = "on_demand_price_multiplier", env = "ON_DEMAND_PRICE_MULTIPLIER")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_demand_price_multiplier: Option<f64>,

    /// Bid this percentage above the current spot price
    #[arg(long, alias = "spot_price_buffer_percentage", env = "SPOT_PRICE_BUFFER_PERCENTAGE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot_price_buffer_percentage: Option<f64>,

    /// Spot product used for price history lookups, e.g. 'Linux/UNIX (Amazon VPC)'
    #[arg(long, alias = "spot_product_description", env = "SPOT_PRODUCT_DESCRIPTION")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot_product_description: Option<String>,

    /// Controls the behavior of tag_filters: opt-in or opt-out
    #[arg(long, alias = "tag_filtering_mode", env = "TAG_FILTERING_MODE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_filtering_mode: Option<String>,

    /// Tags to filter groups on. Defaults to 'spot-enabled=true' in opt-in mode
    /// and 'spot-enabled=false' in opt-out mode
    #[arg(long, alias = "tag_filters", env = "TAG_FILTERS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_filters: Option<String>,

    /// Instance termination method: terminate or detach
    #[arg(long, alias = "instance_termination_method", env = "INSTANCE_TERMINATION_METHOD")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_termination_method: Option<String>,

    /// Action on spot interruption warnings: auto, terminate or detach
    #[arg(long, alias = "termination_notification_action", env = "TERMINATION_NOTIFICATION_ACTION")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_notification_action: Option<String>,

    /// Schedule for replacement actions, 'hours weekdays'. Example: '9-18 1-5'
    #[arg(long, alias = "cron_schedule", env = "CRON_SCHEDULE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_schedule: Option<String>,

    /// Act inside (on) or outside (off) the cron_schedule window
    #[arg(long, alias = "cron_schedule_state", env = "CRON_SCHEDULE_STATE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_schedule_state: Option<String>,

    /// URL or local path of the instance type dataset
    #[arg(long, alias = "instance_data_url", env = "INSTANCE_DATA_URL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_data_url: Option<String>,
}
