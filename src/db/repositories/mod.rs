//! Repositories over the journal tables

pub mod dose;
pub mod side_effect;
pub mod therapy;

use chrono::{DateTime, NaiveDate, Utc};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Read a `YYYY-MM-DD` column
pub(crate) fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw = row.get::<_, String>(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Read a text column through a fallible parser
///
/// An unknown value is a conversion failure on that column.
pub(crate) fn parsed_column<T>(
    row: &rusqlite::Row,
    idx: usize,
    parse: impl FnOnce(&str) -> anyhow::Result<T>,
) -> rusqlite::Result<T> {
    let raw = row.get::<_, String>(idx)?;
    parse(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

/// Nullable variant of [`parsed_column`]
pub(crate) fn parsed_optional_column<T>(
    row: &rusqlite::Row,
    idx: usize,
    parse: impl FnOnce(&str) -> anyhow::Result<T>,
) -> rusqlite::Result<Option<T>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| {
            parse(&raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
            })
        })
        .transpose()
}

/// Read an RFC 3339 timestamp column, falling back to now for garbage
pub(crate) fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(&row.get::<_, String>(idx)?)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now()))
}
