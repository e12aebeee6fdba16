//! Database module

pub mod schema;
pub mod connection;
pub mod repositories;

pub use connection::Database;
pub use repositories::dose::{DoseRecord, DoseRepository, NewDoseRecord};
pub use repositories::side_effect::{SideEffect, SideEffectKind, SideEffectRepository, Severity};
pub use repositories::therapy::{TherapyRepository, TherapySession};
