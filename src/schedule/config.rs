//! Schedule constants and their validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Maintenance dose {dose} is outside the allowed range {min}..={max} clicks")]
    InvalidMaintenanceDose { dose: u32, min: u32, max: u32 },

    #[error("Phase lengths must be at least one day and sum to at most {} days (initial: {initial}, transition: {transition})", u32::MAX)]
    InvalidPhaseLength { initial: u32, transition: u32 },

    #[error("Invalid maintenance dose range {min}..={max} with default {default}")]
    InvalidDoseRange { min: u32, max: u32, default: u32 },
}

/// Phase lengths and maintenance dose bounds
///
/// Two schedules exist in practice: 10 + 8 days with a 4..=8 click
/// maintenance dose, and a shortened 5 + 4 days with 2..=4 clicks.
/// The first one is the default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Days on the low concentration ramp (K1)
    #[serde(default = "default_initial_days")]
    pub initial_days: u32,

    /// Days on the high concentration ramp (K2)
    #[serde(default = "default_transition_days")]
    pub transition_days: u32,

    #[serde(default = "default_dose_min")]
    pub maintenance_dose_min: u32,

    #[serde(default = "default_dose_max")]
    pub maintenance_dose_max: u32,

    #[serde(default = "default_maintenance_dose")]
    pub default_maintenance_dose: u32,
}

fn default_initial_days() -> u32 {
    10
}

fn default_transition_days() -> u32 {
    8
}

fn default_dose_min() -> u32 {
    4
}

fn default_dose_max() -> u32 {
    8
}

fn default_maintenance_dose() -> u32 {
    6
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            initial_days: default_initial_days(),
            transition_days: default_transition_days(),
            maintenance_dose_min: default_dose_min(),
            maintenance_dose_max: default_dose_max(),
            default_maintenance_dose: default_maintenance_dose(),
        }
    }
}

impl ScheduleConfig {
    /// The shortened 5 + 4 day schedule with a 2..=4 click maintenance dose
    pub fn short_course() -> Self {
        Self {
            initial_days: 5,
            transition_days: 4,
            maintenance_dose_min: 2,
            maintenance_dose_max: 4,
            default_maintenance_dose: 3,
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        // The ramp length also bounds the click counts, which are u32
        if self.initial_days == 0
            || self.transition_days == 0
            || self.initial_days.checked_add(self.transition_days).is_none()
        {
            return Err(ScheduleError::InvalidPhaseLength {
                initial: self.initial_days,
                transition: self.transition_days,
            });
        }

        let (min, max, default) = (
            self.maintenance_dose_min,
            self.maintenance_dose_max,
            self.default_maintenance_dose,
        );
        if min == 0 || min > max || default < min || default > max {
            return Err(ScheduleError::InvalidDoseRange { min, max, default });
        }

        Ok(())
    }

    /// Reject a user-entered maintenance dose outside the configured bounds
    pub fn validate_maintenance_dose(&self, dose: u32) -> Result<u32, ScheduleError> {
        if dose < self.maintenance_dose_min || dose > self.maintenance_dose_max {
            return Err(ScheduleError::InvalidMaintenanceDose {
                dose,
                min: self.maintenance_dose_min,
                max: self.maintenance_dose_max,
            });
        }
        Ok(dose)
    }

    /// Last day of the transition ramp (K1 + K2)
    pub fn ramp_days(&self) -> i64 {
        i64::from(self.initial_days) + i64::from(self.transition_days)
    }
}
