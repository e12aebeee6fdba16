//! Therapy service: the journal operations on top of the dose schedule

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::TherapyError;
use super::export::ExportReport;
use crate::config::{Config, DoseCheckPolicy};
use crate::db::{
    Database, DoseRecord, DoseRepository, NewDoseRecord, Severity, SideEffect, SideEffectKind,
    SideEffectRepository, TherapyRepository, TherapySession,
};
use crate::schedule::{
    Concentration, DoseInfo, DoseScheduleEngine, PhaseProgress, ScheduledDay,
};

pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Longest schedule listing, ten years of days
pub const MAX_SCHEDULE_DAYS: u32 = 3660;

/// What the "today" screen shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayView {
    pub session: TherapySession,
    pub date: NaiveDate,
    /// `None` before the start date
    pub dose: Option<DoseInfo>,
    pub progress: PhaseProgress,
    pub record: Option<DoseRecord>,
}

/// A dose the user reports as administered
#[derive(Debug, Clone, Default)]
pub struct TakeDose {
    pub date: Option<NaiveDate>,
    /// Defaults to the prescribed click count
    pub clicks: Option<u32>,
    /// Defaults to the prescribed concentration
    pub concentration: Option<Concentration>,
    pub notes: Option<String>,
}

pub struct TherapyService {
    engine: DoseScheduleEngine,
    profile: String,
    dose_check: DoseCheckPolicy,
    therapy_repo: TherapyRepository,
    dose_repo: DoseRepository,
    side_effect_repo: SideEffectRepository,
}

impl TherapyService {
    pub fn new(db: Database, config: &Config) -> Result<Self> {
        let engine = DoseScheduleEngine::new(config.schedule)?;

        Ok(Self {
            engine,
            profile: config.profile.clone(),
            dose_check: config.dose_check,
            therapy_repo: TherapyRepository::new(db.clone()),
            dose_repo: DoseRepository::new(db.clone()),
            side_effect_repo: SideEffectRepository::new(db),
        })
    }

    pub fn engine(&self) -> &DoseScheduleEngine {
        &self.engine
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// The profile's therapy session, if started
    pub async fn session(&self) -> Result<Option<TherapySession>> {
        self.therapy_repo.get_by_profile(&self.profile).await
    }

    async fn require_session(&self) -> Result<TherapySession> {
        self.session()
            .await?
            .ok_or_else(|| TherapyError::NoSession(self.profile.clone()).into())
    }

    /// Start therapy, or change dose and reminder of the running one
    ///
    /// The start date of an existing session is kept as is.
    pub async fn start_therapy(
        &self,
        start_date: NaiveDate,
        maintenance_dose: u32,
        reminder_time: &str,
    ) -> Result<TherapySession> {
        let maintenance_dose = self
            .engine
            .config()
            .validate_maintenance_dose(maintenance_dose)?;
        let reminder_time = normalize_reminder_time(reminder_time)?;

        match self.session().await? {
            Some(session) => {
                if session.start_date != start_date {
                    warn!(
                        "Therapy already started on {}, ignoring new start date {}",
                        session.start_date, start_date
                    );
                }
                self.therapy_repo
                    .update_settings(&session.id, maintenance_dose, &reminder_time)
                    .await?;
                info!(
                    "Updated therapy settings: maintenance dose {}, reminder {}",
                    maintenance_dose, reminder_time
                );
                self.require_session().await
            }
            None => {
                let session = self
                    .therapy_repo
                    .create(&self.profile, start_date, maintenance_dose, &reminder_time)
                    .await?;
                info!("Started therapy on {} for profile {}", start_date, self.profile);
                Ok(session)
            }
        }
    }

    /// Today's prescription and record; `None` if therapy was never started
    pub async fn current(&self, today: NaiveDate) -> Result<Option<TodayView>> {
        let Some(session) = self.session().await? else {
            return Ok(None);
        };

        let day = DoseScheduleEngine::day_of_therapy(session.start_date, today);
        let dose = self.engine.dose_for_day_number(day, session.maintenance_dose);
        let progress = self.engine.phase_progress(day);
        let record = self.dose_repo.get_by_date(&session.id, today).await?;

        Ok(Some(TodayView {
            session,
            date: today,
            dose,
            progress,
            record,
        }))
    }

    /// Record an administered dose, checked against the schedule
    pub async fn take_dose(&self, today: NaiveDate, request: TakeDose) -> Result<DoseRecord> {
        let session = self.require_session().await?;
        let date = request.date.unwrap_or(today);
        let prescribed = self.prescription(&session, date)?;

        let clicks = request.clicks.unwrap_or(prescribed.clicks);
        if clicks == 0 {
            return Err(TherapyError::EmptyDose.into());
        }
        let concentration = request.concentration.unwrap_or(prescribed.concentration);

        if clicks != prescribed.clicks || concentration != prescribed.concentration {
            let recorded = describe(clicks, concentration);
            let expected = describe(prescribed.clicks, prescribed.concentration);
            match self.dose_check {
                DoseCheckPolicy::Off => {}
                DoseCheckPolicy::Warn => {
                    warn!("Dose for {} differs from schedule: recorded {}, prescribed {}", date, recorded, expected);
                }
                DoseCheckPolicy::Strict => {
                    return Err(TherapyError::DoseMismatch {
                        date,
                        recorded,
                        prescribed: expected,
                    }
                    .into());
                }
            }
        }

        let record = self
            .dose_repo
            .upsert(
                &session.id,
                NewDoseRecord {
                    date,
                    taken: true,
                    dose_count: Some(clicks),
                    concentration: Some(concentration),
                    notes: request.notes,
                    prescribed_clicks: Some(prescribed.clicks),
                },
            )
            .await?;

        info!("Dose taken on {}: {}", date, describe(clicks, concentration));
        Ok(record)
    }

    /// Mark a day as skipped
    pub async fn skip_dose(
        &self,
        date: NaiveDate,
        reason: Option<String>,
    ) -> Result<DoseRecord> {
        let session = self.require_session().await?;
        let prescribed = self.prescription(&session, date)?;

        let record = self
            .dose_repo
            .upsert(
                &session.id,
                NewDoseRecord {
                    date,
                    taken: false,
                    dose_count: None,
                    concentration: None,
                    notes: reason,
                    prescribed_clicks: Some(prescribed.clicks),
                },
            )
            .await?;

        info!("Dose skipped on {}", date);
        Ok(record)
    }

    /// Most recent records first; an unstarted therapy has no history
    pub async fn history(&self, limit: Option<usize>) -> Result<Vec<DoseRecord>> {
        let Some(session) = self.session().await? else {
            return Ok(Vec::new());
        };
        self.dose_repo
            .history(&session.id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await
    }

    /// Log a side effect on the dose record of `dose_date`
    pub async fn add_side_effect(
        &self,
        dose_date: NaiveDate,
        kind: SideEffectKind,
        severity: Severity,
        description: Option<String>,
        today: NaiveDate,
    ) -> Result<SideEffect> {
        let session = self.require_session().await?;
        let record = self
            .dose_repo
            .get_by_date(&session.id, dose_date)
            .await?
            .ok_or(TherapyError::DoseRecordNotFound(dose_date))?;

        let effect = self
            .side_effect_repo
            .create(&record.id, today, kind, severity, description)
            .await?;

        info!(
            "Side effect recorded for {}: {} ({})",
            dose_date,
            kind.as_str(),
            severity.as_str()
        );
        Ok(effect)
    }

    /// Planned doses for `days` calendar days starting at `from`
    pub async fn schedule(&self, from: NaiveDate, days: u32) -> Result<Vec<ScheduledDay>> {
        let session = self.require_session().await?;
        if days == 0 {
            return Ok(Vec::new());
        }
        if days > MAX_SCHEDULE_DAYS {
            return Err(TherapyError::ScheduleTooLong {
                days,
                max: MAX_SCHEDULE_DAYS,
            }
            .into());
        }
        let to = from
            .checked_add_signed(chrono::Duration::days(i64::from(days) - 1))
            .with_context(|| format!("Schedule of {} days from {} runs past the calendar", days, from))?;

        Ok(self
            .engine
            .schedule_range(session.start_date, from, to, session.maintenance_dose))
    }

    /// Full journal dump with statistics and schedule comparison
    pub async fn export(&self, today: NaiveDate) -> Result<ExportReport> {
        let session = self.require_session().await?;
        let doses = self.dose_repo.list_all(&session.id).await?;
        let side_effects = self.side_effect_repo.list_for_session(&session.id).await?;

        debug!(
            "Exporting {} dose records and {} side effects",
            doses.len(),
            side_effects.len()
        );

        Ok(ExportReport::build(
            &self.engine,
            &session,
            doses,
            side_effects,
            today,
            Utc::now(),
        ))
    }

    fn prescription(&self, session: &TherapySession, date: NaiveDate) -> Result<DoseInfo> {
        self.engine
            .compute_dose_for_day(session.start_date, date, session.maintenance_dose)
            .ok_or_else(|| {
                TherapyError::NotStarted {
                    date,
                    start_date: session.start_date,
                }
                .into()
            })
    }
}

/// Validate an `HH:MM` reminder and return it zero-padded
pub fn normalize_reminder_time(raw: &str) -> Result<String, TherapyError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| TherapyError::InvalidReminderTime(raw.to_string()))
}

fn describe(clicks: u32, concentration: Concentration) -> String {
    format!("{} clicks of {}", clicks, concentration.label())
}
