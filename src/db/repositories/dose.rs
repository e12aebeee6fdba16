//! Dose record repository

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{date_column, format_date, parsed_optional_column, timestamp_column};
use crate::db::Database;
use crate::schedule::Concentration;

const COLUMNS: &str = "id, therapy_session_id, date, taken, dose_count, concentration, notes,
                       prescribed_clicks, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseRecord {
    pub id: String,
    pub therapy_session_id: String,
    pub date: NaiveDate,
    pub taken: bool,
    /// Clicks administered; `None` for a skipped day
    pub dose_count: Option<u32>,
    pub concentration: Option<Concentration>,
    pub notes: Option<String>,
    /// What the schedule prescribed for this date when the record was written
    pub prescribed_clicks: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written by an upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDoseRecord {
    pub date: NaiveDate,
    pub taken: bool,
    pub dose_count: Option<u32>,
    pub concentration: Option<Concentration>,
    pub notes: Option<String>,
    pub prescribed_clicks: Option<u32>,
}

pub struct DoseRepository {
    db: Database,
}

impl DoseRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert the record for a day, or overwrite the existing one
    ///
    /// An overwritten record keeps its id and creation time.
    pub async fn upsert(&self, session_id: &str, record: NewDoseRecord) -> Result<DoseRecord> {
        let now = Utc::now().to_rfc3339();
        let date = format_date(record.date);

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO doses (id, therapy_session_id, date, taken, dose_count, concentration, notes,
                                prescribed_clicks, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(therapy_session_id, date) DO UPDATE SET
                taken = excluded.taken,
                dose_count = excluded.dose_count,
                concentration = excluded.concentration,
                notes = excluded.notes,
                prescribed_clicks = excluded.prescribed_clicks,
                updated_at = excluded.updated_at",
            params![
                Uuid::new_v4().to_string(),
                session_id,
                date,
                record.taken,
                record.dose_count,
                record.concentration.map(|c| c.as_str()),
                record.notes,
                record.prescribed_clicks,
                now,
            ],
        ).context("Failed to upsert dose record")?;

        let stored = Self::query_by_date(&conn, session_id, &date)?
            .context("Dose record missing after upsert")?;

        tracing::debug!(
            "Recorded dose {} for {} (taken: {})",
            stored.id,
            date,
            stored.taken
        );
        Ok(stored)
    }

    /// Get the record of one calendar day
    pub async fn get_by_date(&self, session_id: &str, date: NaiveDate) -> Result<Option<DoseRecord>> {
        let conn = self.db.lock().await;
        Self::query_by_date(&conn, session_id, &format_date(date))
    }

    /// Get a record by ID
    pub async fn get(&self, id: &str) -> Result<Option<DoseRecord>> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM doses WHERE id = ?1"))?;

        let result = stmt.query_row(params![id], Self::map_row);

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get dose record"),
        }
    }

    /// Most recent records first
    pub async fn history(&self, session_id: &str, limit: usize) -> Result<Vec<DoseRecord>> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM doses WHERE therapy_session_id = ?1 ORDER BY date DESC LIMIT ?2"
        ))?;

        let records = stmt
            .query_map(
                params![session_id, i64::try_from(limit).unwrap_or(i64::MAX)],
                Self::map_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to collect dose history")?;

        Ok(records)
    }

    /// Every record of a session, oldest first
    pub async fn list_all(&self, session_id: &str) -> Result<Vec<DoseRecord>> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM doses WHERE therapy_session_id = ?1 ORDER BY date ASC"
        ))?;

        let records = stmt
            .query_map(params![session_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to collect dose records")?;

        Ok(records)
    }

    /// Records dated within `from..=to`, oldest first
    pub async fn list_range(
        &self,
        session_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DoseRecord>> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM doses
             WHERE therapy_session_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC"
        ))?;

        let records = stmt
            .query_map(
                params![session_id, format_date(from), format_date(to)],
                Self::map_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to collect dose records")?;

        Ok(records)
    }

    fn query_by_date(conn: &Connection, session_id: &str, date: &str) -> Result<Option<DoseRecord>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM doses WHERE therapy_session_id = ?1 AND date = ?2"
        ))?;

        let result = stmt.query_row(params![session_id, date], Self::map_row);

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get dose record"),
        }
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<DoseRecord> {
        let concentration = parsed_optional_column(row, 5, Concentration::from_str)?;

        Ok(DoseRecord {
            id: row.get(0)?,
            therapy_session_id: row.get(1)?,
            date: date_column(row, 2)?,
            taken: row.get(3)?,
            dose_count: row.get(4)?,
            concentration,
            notes: row.get(6)?,
            prescribed_clicks: row.get(7)?,
            created_at: timestamp_column(row, 8)?,
            updated_at: timestamp_column(row, 9)?,
        })
    }
}
