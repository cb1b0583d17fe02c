//! Canonical observation store: idempotent upsert and trend reads

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use log::warn;
use rusqlite::{params, types::Value as SqlValue};
use uuid::Uuid;

use crate::error::{Result, TesseraError};
use crate::metrics;
use crate::models::Reading;

use super::Store;

/// Outcome of one upsert batch. `written` can be lower than `attempted`
/// when individual rows failed validation; the batch itself is never
/// discarded for a bad row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
    pub attempted: usize,
    pub written: usize,
}

/// A raw time-series point read back for the trend engine
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationPoint {
    pub observed_at: DateTime<Utc>,
    pub label: String,
    pub unit: Option<String>,
    pub value: f64,
}

/// Fixed-width RFC 3339 UTC, so string order equals time order
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TesseraError::store(format!("Bad timestamp '{}': {}", raw, e)))
}

/// Inclusive day bounds widened to full-day timestamps; the end bound
/// runs through the day's last millisecond.
pub(crate) fn day_bounds(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> (Option<String>, Option<String>) {
    (
        start.map(|d| format!("{}T00:00:00.000Z", d)),
        end.map(|d| format!("{}T23:59:59.999Z", d)),
    )
}

impl Store {
    /// Upsert a batch of readings.
    ///
    /// Each row commits independently. On a dedup-key conflict only the
    /// value is overwritten; observation time, ingestion time, label, and
    /// unit keep their original row's contents. A reading that fails
    /// validation is skipped and logged; a write failure aborts, leaving
    /// already-committed rows in place (safe to retry wholesale).
    pub fn upsert_observations(&self, readings: &[Reading]) -> Result<UpsertReport> {
        let mut written = 0;

        for reading in readings {
            if let Err(reason) = validate_reading(reading) {
                warn!(
                    "skipping malformed reading ({} {}): {}",
                    reading.source, reading.type_key, reason
                );
                continue;
            }

            self.conn()
                .execute(
                    "INSERT INTO observations
                         (id, source, type, label, unit, value, observed_at, user_id, integration_id)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                     ON CONFLICT (user_id, observed_at, type, source)
                     DO UPDATE SET value = excluded.value",
                    params![
                        Uuid::new_v4().to_string(),
                        reading.source.as_str(),
                        reading.type_key,
                        reading.label,
                        reading.unit,
                        reading.value,
                        format_ts(&reading.observed_at),
                        reading.user_id,
                        reading.integration_id,
                    ],
                )
                .map_err(|e| TesseraError::store(format!("Failed to upsert observation: {}", e)))?;

            written += 1;
        }

        Ok(UpsertReport {
            attempted: readings.len(),
            written,
        })
    }

    /// Raw points for one canonical type, ascending by time, with
    /// optional inclusive day bounds and a raw-row limit.
    pub fn observation_points(
        &self,
        type_key: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: Option<usize>,
    ) -> Result<Vec<ObservationPoint>> {
        let (start_ts, end_ts) = day_bounds(start, end);

        let mut sql = String::from(
            "SELECT observed_at, label, unit, value FROM observations WHERE type = ?",
        );
        let mut args: Vec<SqlValue> = vec![SqlValue::from(type_key.to_string())];

        if let Some(start_ts) = start_ts {
            sql.push_str(" AND observed_at >= ?");
            args.push(SqlValue::from(start_ts));
        }
        if let Some(end_ts) = end_ts {
            sql.push_str(" AND observed_at <= ?");
            args.push(SqlValue::from(end_ts));
        }
        sql.push_str(" ORDER BY observed_at ASC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            args.push(SqlValue::from(limit as i64));
        }

        let mut stmt = self
            .conn()
            .prepare(&sql)
            .map_err(|e| TesseraError::store(format!("Failed to prepare trend query: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(args), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })
            .map_err(|e| TesseraError::store(format!("Failed to query observations: {}", e)))?;

        let mut points = Vec::new();
        for row in rows {
            let (observed_at, label, unit, value) =
                row.map_err(|e| TesseraError::store(format!("Failed to read row: {}", e)))?;
            points.push(ObservationPoint {
                observed_at: parse_ts(&observed_at)?,
                label,
                unit,
                value,
            });
        }

        Ok(points)
    }

    /// Total observation rows (test and reporting helper)
    pub fn count_observations(&self) -> Result<usize> {
        self.conn()
            .query_row("SELECT COUNT(*) FROM observations", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as usize)
            .map_err(|e| TesseraError::store(format!("Failed to count observations: {}", e)))
    }
}

fn validate_reading(reading: &Reading) -> std::result::Result<(), String> {
    if reading.type_key.is_empty() {
        return Err("empty type".to_string());
    }
    if reading.user_id.is_empty() || reading.integration_id.is_empty() {
        return Err("missing ownership".to_string());
    }
    if !reading.value.is_finite() {
        return Err(format!("non-finite value: {}", reading.value));
    }
    if !metrics::is_allowed(reading.source, &reading.type_key) {
        return Err(format!(
            "type '{}' not in the {} allow-list",
            reading.type_key, reading.source
        ));
    }
    Ok(())
}
