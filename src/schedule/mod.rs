//! Dose schedule: phase and click count for any day of therapy

pub mod config;
pub mod engine;
pub mod types;

pub use config::{ScheduleConfig, ScheduleError};
pub use engine::{calendar_day, local_today, DoseScheduleEngine, ScheduledDay};
pub use types::{Concentration, DoseInfo, Phase, PhaseProgress};
