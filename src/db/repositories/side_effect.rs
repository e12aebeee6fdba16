//! Side effect repository

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{date_column, format_date, parsed_column, timestamp_column};
use crate::db::Database;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideEffect {
    pub id: String,
    pub dose_record_id: String,
    pub date: NaiveDate,
    pub kind: SideEffectKind,
    pub severity: Severity,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SideEffectKind {
    Itching,
    Swelling,
    Redness,
    Other,
}

impl SideEffectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SideEffectKind::Itching => "itching",
            SideEffectKind::Swelling => "swelling",
            SideEffectKind::Redness => "redness",
            SideEffectKind::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "itching" => Ok(SideEffectKind::Itching),
            "swelling" => Ok(SideEffectKind::Swelling),
            "redness" => Ok(SideEffectKind::Redness),
            "other" => Ok(SideEffectKind::Other),
            _ => anyhow::bail!("Unknown side effect type: {}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            _ => anyhow::bail!("Unknown severity: {}", s),
        }
    }
}

pub struct SideEffectRepository {
    db: Database,
}

impl SideEffectRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record a side effect against a dose record
    pub async fn create(
        &self,
        dose_record_id: &str,
        date: NaiveDate,
        kind: SideEffectKind,
        severity: Severity,
        description: Option<String>,
    ) -> Result<SideEffect> {
        let effect = SideEffect {
            id: Uuid::new_v4().to_string(),
            dose_record_id: dose_record_id.to_string(),
            date,
            kind,
            severity,
            description,
            created_at: Utc::now(),
        };

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO side_effects (id, dose_record_id, date, kind, severity, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                effect.id,
                effect.dose_record_id,
                format_date(effect.date),
                effect.kind.as_str(),
                effect.severity.as_str(),
                effect.description,
                effect.created_at.to_rfc3339(),
            ],
        ).context("Failed to insert side effect")?;

        tracing::debug!("Created side effect {} on dose {}", effect.id, dose_record_id);
        Ok(effect)
    }

    /// All side effects of a therapy session, newest first
    pub async fn list_for_session(&self, session_id: &str) -> Result<Vec<SideEffect>> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(
            "SELECT s.id, s.dose_record_id, s.date, s.kind, s.severity, s.description, s.created_at
             FROM side_effects s
             JOIN doses d ON d.id = s.dose_record_id
             WHERE d.therapy_session_id = ?1
             ORDER BY s.date DESC, s.created_at DESC"
        )?;

        let effects = stmt
            .query_map(params![session_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to collect side effects")?;

        Ok(effects)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<SideEffect> {
        Ok(SideEffect {
            id: row.get(0)?,
            dose_record_id: row.get(1)?,
            date: date_column(row, 2)?,
            kind: parsed_column(row, 3, SideEffectKind::from_str)?,
            severity: parsed_column(row, 4, Severity::from_str)?,
            description: row.get(5)?,
            created_at: timestamp_column(row, 6)?,
        })
    }
}
