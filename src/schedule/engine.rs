//! Dose schedule engine
//!
//! Phase is never stored: every answer is recomputed from the therapy start
//! date and the reference date, so it stays consistent with the calendar
//! even after days without any activity.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::config::{ScheduleConfig, ScheduleError};
use super::types::{Concentration, DoseInfo, Phase, PhaseProgress};

/// One calendar day of a reconstructed schedule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledDay {
    pub date: NaiveDate,
    /// `None` before therapy starts
    pub dose: Option<DoseInfo>,
}

/// Maps therapy dates to the prescribed dose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoseScheduleEngine {
    config: ScheduleConfig,
}

impl DoseScheduleEngine {
    pub fn new(config: ScheduleConfig) -> Result<Self, ScheduleError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// 1-indexed day count; the start date itself is day 1
    pub fn day_of_therapy(start_date: NaiveDate, reference_date: NaiveDate) -> i64 {
        reference_date.signed_duration_since(start_date).num_days() + 1
    }

    pub fn phase_for_day(&self, day_of_therapy: i64) -> Option<Phase> {
        let initial = i64::from(self.config.initial_days);
        let ramp = self.config.ramp_days();

        match day_of_therapy {
            d if d < 1 => None,
            d if d <= initial => Some(Phase::Initial),
            d if d <= ramp => Some(Phase::Transition),
            _ => Some(Phase::Maintenance),
        }
    }

    /// Dose for an already computed day of therapy
    ///
    /// `maintenance_dose` is used as given; validate it with
    /// [`ScheduleConfig::validate_maintenance_dose`] before it gets here.
    pub fn dose_for_day_number(&self, day_of_therapy: i64, maintenance_dose: u32) -> Option<DoseInfo> {
        let initial = i64::from(self.config.initial_days);

        // Ramp click counts are bounded by the u32 phase lengths.
        let phase = self.phase_for_day(day_of_therapy)?;
        let (concentration, clicks) = match phase {
            Phase::Initial => (Concentration::Low, day_of_therapy as u32),
            Phase::Transition => (Concentration::High, (day_of_therapy - initial) as u32),
            Phase::Maintenance => (Concentration::High, maintenance_dose),
        };

        Some(DoseInfo {
            concentration,
            clicks,
            phase,
            day_of_therapy,
        })
    }

    /// Dose prescribed on `reference_date`, or `None` if therapy has not started
    pub fn compute_dose_for_day(
        &self,
        start_date: NaiveDate,
        reference_date: NaiveDate,
        maintenance_dose: u32,
    ) -> Option<DoseInfo> {
        let day = Self::day_of_therapy(start_date, reference_date);
        self.dose_for_day_number(day, maintenance_dose)
    }

    pub fn phase_progress(&self, day_of_therapy: i64) -> PhaseProgress {
        let initial = self.config.initial_days;
        let transition = self.config.transition_days;

        let (current_step, total_steps) = match self.phase_for_day(day_of_therapy) {
            None => (0, initial),
            Some(Phase::Initial) => (day_of_therapy, initial),
            Some(Phase::Transition) => (day_of_therapy - i64::from(initial), transition),
            Some(Phase::Maintenance) => {
                return PhaseProgress {
                    current_step: day_of_therapy - self.config.ramp_days(),
                    total_steps: 0,
                    percentage: 100.0,
                };
            }
        };

        let percentage = if total_steps == 0 {
            100.0
        } else {
            (current_step as f64 / f64::from(total_steps) * 100.0).clamp(0.0, 100.0)
        };

        PhaseProgress {
            current_step,
            total_steps,
            percentage,
        }
    }

    /// Prescribed dose for every day in `from..=to`
    pub fn schedule_range(
        &self,
        start_date: NaiveDate,
        from: NaiveDate,
        to: NaiveDate,
        maintenance_dose: u32,
    ) -> Vec<ScheduledDay> {
        from.iter_days()
            .take_while(|date| *date <= to)
            .map(|date| ScheduledDay {
                date,
                dose: self.compute_dose_for_day(start_date, date, maintenance_dose),
            })
            .collect()
    }
}

/// Calendar day of a timestamp in its own time zone
pub fn calendar_day<Tz: TimeZone>(at: &DateTime<Tz>) -> NaiveDate {
    at.date_naive()
}

/// Today according to the local wall clock
pub fn local_today() -> NaiveDate {
    calendar_day(&Local::now())
}
