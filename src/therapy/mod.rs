//! Therapy journal: sessions, daily doses and side effects

pub mod error;
pub mod export;
pub mod service;

pub use error::TherapyError;
pub use export::{DoseComparison, ExportReport, Statistics, TherapySummary};
pub use service::{
    normalize_reminder_time, TakeDose, TherapyService, TodayView, DEFAULT_HISTORY_LIMIT,
    MAX_SCHEDULE_DAYS,
};
