//! Cron-like action windows.
//!
//! A window is written as two space separated components, `hours weekdays`,
//! for example `9-18 1-5` (office hours on workdays) or `* *` (always).
//! Each component is `*` or a comma separated list of values and inclusive
//! ranges. Weekdays count from Sunday = 0; `7` is also Sunday and the
//! three-letter names `sun`..`sat` are accepted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Whether actions happen inside or outside the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleState {
    /// Act only inside the window
    #[default]
    On,
    /// Act only outside the window
    Off,
}

impl ScheduleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// The opposite polarity
    pub fn flipped(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

impl FromStr for ScheduleState {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(ConfigError::invalid(
                "cron_schedule_state",
                s,
                "must be one of: on, off",
            )),
        }
    }
}

impl fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point in time reduced to what windows care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleInstant {
    /// Hour of day, 0-23
    pub hour: u8,
    /// Day of week, 0-6 with Sunday = 0
    pub weekday: u8,
}

impl ScheduleInstant {
    pub fn new(hour: u8, weekday: u8) -> Self {
        Self { hour, weekday }
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        // both values are bounded by chrono (hour < 24, weekday < 7)
        Self {
            hour: u8::try_from(at.hour()).unwrap_or(0),
            weekday: u8::try_from(at.weekday().num_days_from_sunday()).unwrap_or(0),
        }
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }
}

/// One component of a window: either any value or an explicit set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    Any,
    /// Inclusive ranges
    Ranges(Vec<(u8, u8)>),
}

impl FieldSpec {
    pub fn contains(&self, value: u8) -> bool {
        match self {
            Self::Any => true,
            Self::Ranges(ranges) => ranges.iter().any(|&(lo, hi)| lo <= value && value <= hi),
        }
    }
}

/// Parsed `hours weekdays` window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleWindow {
    raw: String,
    hours: FieldSpec,
    weekdays: FieldSpec,
}

impl ScheduleWindow {
    /// The window that matches every moment (`* *`)
    pub fn always() -> Self {
        Self {
            raw: "* *".to_string(),
            hours: FieldSpec::Any,
            weekdays: FieldSpec::Any,
        }
    }

    pub fn hours(&self) -> &FieldSpec {
        &self.hours
    }

    pub fn weekdays(&self) -> &FieldSpec {
        &self.weekdays
    }

    /// True when both the hour and the weekday fall inside the window
    pub fn contains(&self, at: ScheduleInstant) -> bool {
        self.hours.contains(at.hour) && self.weekdays.contains(at.weekday)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for ScheduleWindow {
    fn default() -> Self {
        Self::always()
    }
}

impl FromStr for ScheduleWindow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let [hours, weekdays] = parts.as_slice() else {
            return Err(ConfigError::invalid(
                "cron_schedule",
                s,
                "expected two space separated fields: hour day-of-week",
            ));
        };

        Ok(Self {
            raw: parts.join(" "),
            hours: parse_field(s, hours, 0, 23, parse_hour)?,
            weekdays: fold_sunday(parse_field(s, weekdays, 0, 7, parse_weekday)?),
        })
    }
}

impl fmt::Display for ScheduleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_field(
    whole: &str,
    field: &str,
    min: u8,
    max: u8,
    parse_value: fn(&str) -> Option<u8>,
) -> Result<FieldSpec, ConfigError> {
    if field == "*" {
        return Ok(FieldSpec::Any);
    }

    let invalid = |reason: String| ConfigError::invalid("cron_schedule", whole, reason);

    let mut ranges = Vec::new();
    for item in field.split(',') {
        let (lo, hi) = match item.split_once('-') {
            Some((lo, hi)) => (lo, hi),
            None => (item, item),
        };
        let lo = parse_value(lo).ok_or_else(|| invalid(format!("unrecognized value '{lo}'")))?;
        let hi = parse_value(hi).ok_or_else(|| invalid(format!("unrecognized value '{hi}'")))?;

        if lo < min || hi > max {
            return Err(invalid(format!("'{item}' is outside {min}-{max}")));
        }
        if lo > hi {
            return Err(invalid(format!("range '{item}' runs backwards")));
        }
        ranges.push((lo, hi));
    }

    Ok(FieldSpec::Ranges(ranges))
}

/// Rewrites the `7` spelling of Sunday onto `0` so lookups stay in 0-6
fn fold_sunday(spec: FieldSpec) -> FieldSpec {
    match spec {
        FieldSpec::Any => FieldSpec::Any,
        FieldSpec::Ranges(ranges) => FieldSpec::Ranges(
            ranges
                .into_iter()
                .flat_map(|(lo, hi)| match (lo, hi) {
                    (7, _) => vec![(0, 0)],
                    (lo, 7) => vec![(lo, 6), (0, 0)],
                    range => vec![range],
                })
                .collect(),
        ),
    }
}

fn parse_hour(token: &str) -> Option<u8> {
    token.trim().parse().ok()
}

fn parse_weekday(token: &str) -> Option<u8> {
    let token = token.trim().to_lowercase();
    if let Some(pos) = WEEKDAY_NAMES.iter().position(|name| *name == token) {
        return u8::try_from(pos).ok();
    }
    token.parse().ok()
}
