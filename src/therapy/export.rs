//! Therapy export report
//!
//! Reconstructs what the schedule prescribed on every recorded day and
//! compares it with what was actually administered.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{DoseRecord, SideEffect, TherapySession};
use crate::schedule::{Concentration, DoseInfo, DoseScheduleEngine, Phase};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub profile: String,
    pub therapy: TherapySummary,
    pub statistics: Statistics,
    pub doses: Vec<DoseRecord>,
    pub side_effects: Vec<SideEffect>,
    pub schedule_check: Vec<DoseComparison>,
    pub export_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapySummary {
    pub start_date: NaiveDate,
    pub maintenance_dose: u32,
    pub reminder_time: String,
    pub day_of_therapy: i64,
    pub phase: Option<Phase>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    pub total_doses: usize,
    pub taken_doses: usize,
    pub skipped_doses: usize,
    /// Taken records as a rounded percentage of all records
    pub adherence_rate: u32,
    pub side_effects_count: usize,
    /// Scheduled days before today with no record at all
    pub missed_days: i64,
    /// Taken records whose dose differs from the schedule
    pub deviations: usize,
}

/// One recorded day next to its reconstructed prescription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseComparison {
    pub date: NaiveDate,
    pub taken: bool,
    pub recorded_clicks: Option<u32>,
    pub recorded_concentration: Option<Concentration>,
    pub prescribed: Option<DoseInfo>,
    /// `None` for skipped days
    pub matches_schedule: Option<bool>,
}

impl DoseComparison {
    fn new(record: &DoseRecord, prescribed: Option<DoseInfo>) -> Self {
        let matches_schedule = record.taken.then(|| {
            prescribed.map_or(false, |p| {
                record.dose_count == Some(p.clicks) && record.concentration == Some(p.concentration)
            })
        });

        Self {
            date: record.date,
            taken: record.taken,
            recorded_clicks: record.dose_count,
            recorded_concentration: record.concentration,
            prescribed,
            matches_schedule,
        }
    }
}

impl ExportReport {
    /// Assemble the report from already loaded journal rows
    ///
    /// Prescriptions use the session's current maintenance dose.
    pub fn build(
        engine: &DoseScheduleEngine,
        session: &TherapySession,
        doses: Vec<DoseRecord>,
        side_effects: Vec<SideEffect>,
        today: NaiveDate,
        exported_at: DateTime<Utc>,
    ) -> Self {
        let schedule_check: Vec<DoseComparison> = doses
            .iter()
            .map(|record| {
                let prescribed = engine.compute_dose_for_day(
                    session.start_date,
                    record.date,
                    session.maintenance_dose,
                );
                DoseComparison::new(record, prescribed)
            })
            .collect();

        let total_doses = doses.len();
        let taken_doses = doses.iter().filter(|d| d.taken).count();
        let adherence_rate = if total_doses > 0 {
            (taken_doses as f64 / total_doses as f64 * 100.0).round() as u32
        } else {
            0
        };

        let elapsed_days = today
            .signed_duration_since(session.start_date)
            .num_days()
            .max(0);
        let recorded_days: BTreeSet<NaiveDate> = doses
            .iter()
            .map(|d| d.date)
            .filter(|date| *date >= session.start_date && *date < today)
            .collect();

        let statistics = Statistics {
            total_doses,
            taken_doses,
            skipped_doses: total_doses - taken_doses,
            adherence_rate,
            side_effects_count: side_effects.len(),
            missed_days: elapsed_days - recorded_days.len() as i64,
            deviations: schedule_check
                .iter()
                .filter(|c| c.matches_schedule == Some(false))
                .count(),
        };

        let day_of_therapy = DoseScheduleEngine::day_of_therapy(session.start_date, today);

        Self {
            profile: session.profile.clone(),
            therapy: TherapySummary {
                start_date: session.start_date,
                maintenance_dose: session.maintenance_dose,
                reminder_time: session.reminder_time.clone(),
                day_of_therapy,
                phase: engine.phase_for_day(day_of_therapy),
            },
            statistics,
            doses,
            side_effects,
            schedule_check,
            export_date: exported_at,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize export report")
    }
}
