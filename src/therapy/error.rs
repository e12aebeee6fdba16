//! Therapy journal errors

use chrono::NaiveDate;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TherapyError {
    #[error("Therapy not started for profile '{0}'")]
    NoSession(String),

    #[error("Therapy starts on {start_date}; nothing is scheduled for {date}")]
    NotStarted { date: NaiveDate, start_date: NaiveDate },

    #[error("Dose for {date} does not match the schedule: recorded {recorded}, prescribed {prescribed}")]
    DoseMismatch {
        date: NaiveDate,
        recorded: String,
        prescribed: String,
    },

    #[error("No dose record for {0}")]
    DoseRecordNotFound(NaiveDate),

    #[error("Invalid reminder time '{0}', expected HH:MM")]
    InvalidReminderTime(String),

    #[error("Dose count must be at least one click")]
    EmptyDose,

    #[error("Cannot list {days} days of schedule, the limit is {max}")]
    ScheduleTooLong { days: u32, max: u32 },
}
