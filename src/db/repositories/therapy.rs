//! Therapy session repository

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{date_column, format_date, timestamp_column};
use crate::db::Database;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TherapySession {
    pub id: String,
    pub profile: String,
    pub start_date: NaiveDate,
    pub maintenance_dose: u32,
    /// Wall-clock reminder, `HH:MM`
    pub reminder_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct TherapyRepository {
    db: Database,
}

impl TherapyRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create the therapy session for a profile
    pub async fn create(
        &self,
        profile: &str,
        start_date: NaiveDate,
        maintenance_dose: u32,
        reminder_time: &str,
    ) -> Result<TherapySession> {
        let now = Utc::now();

        let session = TherapySession {
            id: Uuid::new_v4().to_string(),
            profile: profile.to_string(),
            start_date,
            maintenance_dose,
            reminder_time: reminder_time.to_string(),
            created_at: now,
            updated_at: now,
        };

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO therapy_sessions (id, profile, start_date, maintenance_dose, reminder_time, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.id,
                session.profile,
                format_date(session.start_date),
                session.maintenance_dose,
                session.reminder_time,
                session.created_at.to_rfc3339(),
                session.updated_at.to_rfc3339(),
            ],
        ).context("Failed to insert therapy session")?;

        tracing::debug!("Created therapy session {} for profile {}", session.id, profile);
        Ok(session)
    }

    /// Get the session of a profile, if therapy was started
    pub async fn get_by_profile(&self, profile: &str) -> Result<Option<TherapySession>> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, profile, start_date, maintenance_dose, reminder_time, created_at, updated_at
             FROM therapy_sessions WHERE profile = ?1"
        )?;

        let result = stmt.query_row(params![profile], Self::map_row);

        match result {
            Ok(session) => Ok(Some(session)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get therapy session"),
        }
    }

    /// Change maintenance dose and reminder; the start date never changes
    pub async fn update_settings(
        &self,
        id: &str,
        maintenance_dose: u32,
        reminder_time: &str,
    ) -> Result<()> {
        let conn = self.db.lock().await;
        let now = Utc::now().to_rfc3339();

        let updated = conn.execute(
            "UPDATE therapy_sessions SET maintenance_dose = ?1, reminder_time = ?2, updated_at = ?3 WHERE id = ?4",
            params![maintenance_dose, reminder_time, now, id],
        )?;
        if updated == 0 {
            anyhow::bail!("Therapy session not found: {}", id);
        }

        tracing::debug!(
            "Updated therapy session {}: maintenance dose {}, reminder {}",
            id,
            maintenance_dose,
            reminder_time
        );
        Ok(())
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<TherapySession> {
        Ok(TherapySession {
            id: row.get(0)?,
            profile: row.get(1)?,
            start_date: date_column(row, 2)?,
            maintenance_dose: row.get(3)?,
            reminder_time: row.get(4)?,
            created_at: timestamp_column(row, 5)?,
            updated_at: timestamp_column(row, 6)?,
        })
    }
}
