//! Decides whether destructive actions are permitted at a given moment.

use tracing::warn;

use crate::domain::models::{ConfigModel, ScheduleInstant, ScheduleState, ScheduleWindow};

/// Pure window check with polarity
pub fn permits(now: ScheduleInstant, window: &ScheduleWindow, state: ScheduleState) -> bool {
    let inside = window.contains(now);
    match state {
        ScheduleState::On => inside,
        ScheduleState::Off => !inside,
    }
}

/// Per-group schedule settings, as read from the group's own configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleOverride {
    pub schedule: Option<String>,
    pub state: Option<String>,
}

/// Schedule gate bound to the process-wide defaults
#[derive(Debug, Clone)]
pub struct ScheduleGate {
    window: ScheduleWindow,
    state: ScheduleState,
}

impl ScheduleGate {
    pub fn new(window: ScheduleWindow, state: ScheduleState) -> Self {
        Self { window, state }
    }

    pub fn from_config(config: &ConfigModel) -> Self {
        Self::new(config.cron_schedule.clone(), config.cron_schedule_state)
    }

    /// Global window check
    pub fn permits(&self, now: ScheduleInstant) -> bool {
        permits(now, &self.window, self.state)
    }

    /// Window check for one group, preferring its override values
    ///
    /// An override that does not parse is ignored in favour of the global
    /// value for that component.
    pub fn permits_for_group(
        &self,
        group: &str,
        overrides: &ScheduleOverride,
        now: ScheduleInstant,
    ) -> bool {
        let window = match overrides.schedule.as_deref().map(str::parse::<ScheduleWindow>) {
            Some(Ok(window)) => window,
            Some(Err(e)) => {
                warn!(group = %group, error = %e, "ignoring invalid schedule override");
                self.window.clone()
            }
            None => self.window.clone(),
        };

        let state = match overrides.state.as_deref().map(str::parse::<ScheduleState>) {
            Some(Ok(state)) => state,
            Some(Err(e)) => {
                warn!(group = %group, error = %e, "ignoring invalid schedule state override");
                self.state
            }
            None => self.state,
        };

        permits(now, &window, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office_hours() -> ScheduleWindow {
        "9-18 1-5".parse().unwrap()
    }

    #[test]
    fn test_inside_and_outside_office_hours() {
        let window = office_hours();
        assert!(permits(ScheduleInstant::new(10, 3), &window, ScheduleState::On));
        assert!(!permits(ScheduleInstant::new(20, 3), &window, ScheduleState::On));
        assert!(!permits(ScheduleInstant::new(10, 3), &window, ScheduleState::Off));
        assert!(permits(ScheduleInstant::new(20, 3), &window, ScheduleState::Off));
    }

    #[test]
    fn test_always_window_with_off_never_permits() {
        let window = ScheduleWindow::always();
        assert!(!permits(ScheduleInstant::new(0, 0), &window, ScheduleState::Off));
    }

    #[test]
    fn test_group_override_replaces_global_values() {
        let gate = ScheduleGate::new(office_hours(), ScheduleState::On);
        let weekend = ScheduleInstant::new(12, 6);
        assert!(!gate.permits(weekend));

        let overrides = ScheduleOverride {
            schedule: Some("* 0,6".into()),
            state: None,
        };
        assert!(gate.permits_for_group("web-asg", &overrides, weekend));

        let inverted = ScheduleOverride {
            schedule: None,
            state: Some("off".into()),
        };
        assert!(gate.permits_for_group("web-asg", &inverted, weekend));
    }

    #[test]
    fn test_invalid_override_falls_back_to_global() {
        let gate = ScheduleGate::new(office_hours(), ScheduleState::On);
        let overrides = ScheduleOverride {
            schedule: Some("every day".into()),
            state: Some("sideways".into()),
        };
        let now = ScheduleInstant::new(10, 2);
        assert_eq!(
            gate.permits_for_group("batch-asg", &overrides, now),
            gate.permits(now)
        );
    }
}
