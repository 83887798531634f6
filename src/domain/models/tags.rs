use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// Tag key used by the default filters of both modes
pub const DEFAULT_FILTER_TAG: &str = "spot-enabled";

/// How group tag filters are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagFilteringMode {
    /// Only groups carrying the filter tags are processed
    #[default]
    OptIn,
    /// Every group is processed unless it carries the filter tags
    OptOut,
}

impl TagFilteringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OptIn => "opt-in",
            Self::OptOut => "opt-out",
        }
    }

    /// Filters applied when the operator did not set any
    pub fn default_filters(&self) -> Vec<TagFilter> {
        let value = match self {
            Self::OptIn => "true",
            Self::OptOut => "false",
        };
        vec![TagFilter::new(DEFAULT_FILTER_TAG, value)]
    }
}

impl FromStr for TagFilteringMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "opt-in" => Ok(Self::OptIn),
            "opt-out" => Ok(Self::OptOut),
            _ => Err(ConfigError::invalid(
                "tag_filtering_mode",
                s,
                "must be one of: opt-in, opt-out",
            )),
        }
    }
}

impl fmt::Display for TagFilteringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `key=value` tag filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Parse a `key=value,key=value` expression, falling back to the mode default when empty
pub fn parse_tag_filters(raw: &str, mode: TagFilteringMode) -> Result<Vec<TagFilter>, ConfigError> {
    let filters = raw
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let (key, value) = token.split_once('=').ok_or_else(|| {
                ConfigError::invalid("tag_filters", token, "expected key=value")
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::invalid(
                    "tag_filters",
                    token,
                    "tag key cannot be empty",
                ));
            }
            Ok(TagFilter::new(key, value.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if filters.is_empty() {
        return Ok(mode.default_filters());
    }
    Ok(filters)
}

/// Render filters back to their `key=value,...` form
pub fn format_tag_filters(filters: &[TagFilter]) -> String {
    filters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
