//! Wide per-day nutrition snapshots, imported wholesale

use chrono::NaiveDate;
use rusqlite::{params, types::Value as SqlValue, OptionalExtension};
use uuid::Uuid;

use crate::error::{Result, TesseraError};
use crate::models::DailySnapshot;

use super::Store;

/// One (date, value) pair read back for the trend engine. The value is
/// nullable: a day can be present without every column filled.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Store {
    /// Insert or wholesale-overwrite the row for the snapshot's date.
    /// There is no field-by-field merge against prior data.
    pub fn upsert_snapshot(&self, snapshot: &DailySnapshot) -> Result<()> {
        let columns = DailySnapshot::COLUMNS.join(", ");
        let placeholders = vec!["?"; DailySnapshot::COLUMNS.len() + 3].join(", ");
        let updates: Vec<String> = DailySnapshot::COLUMNS
            .iter()
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();

        let sql = format!(
            "INSERT INTO daily_snapshots (id, date, {columns}, raw)
             VALUES ({placeholders})
             ON CONFLICT (date) DO UPDATE SET {updates},
                 raw = excluded.raw,
                 imported_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            updates = updates.join(", "),
        );

        let raw = snapshot
            .raw
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut args: Vec<SqlValue> = Vec::with_capacity(DailySnapshot::COLUMNS.len() + 3);
        args.push(SqlValue::from(Uuid::new_v4().to_string()));
        args.push(SqlValue::from(snapshot.date.to_string()));
        for value in snapshot.values() {
            args.push(SqlValue::from(value));
        }
        args.push(SqlValue::from(raw));

        self.conn()
            .execute(&sql, rusqlite::params_from_iter(args))
            .map_err(|e| TesseraError::store(format!("Failed to upsert snapshot: {}", e)))?;

        Ok(())
    }

    /// Read one snapshot row back by date
    pub fn get_snapshot(&self, date: NaiveDate) -> Result<Option<DailySnapshot>> {
        let columns = DailySnapshot::COLUMNS.join(", ");
        let sql = format!("SELECT date, {columns}, raw FROM daily_snapshots WHERE date = ?");

        self.conn()
            .query_row(&sql, params![date.to_string()], |row| {
                let date: String = row.get(0)?;
                let mut values = Vec::with_capacity(DailySnapshot::COLUMNS.len());
                for i in 0..DailySnapshot::COLUMNS.len() {
                    values.push(row.get::<_, Option<f64>>(i + 1)?);
                }
                let raw: Option<String> = row.get(DailySnapshot::COLUMNS.len() + 1)?;
                Ok((date, values, raw))
            })
            .optional()
            .map_err(|e| TesseraError::store(format!("Failed to get snapshot: {}", e)))?
            .map(|(date, values, raw)| build_snapshot(&date, &values, raw.as_deref()))
            .transpose()
    }

    /// Points for one snapshot column, ascending by date, with optional
    /// inclusive bounds and a raw-row limit.
    pub fn snapshot_points(
        &self,
        column: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: Option<usize>,
    ) -> Result<Vec<SnapshotPoint>> {
        if !DailySnapshot::COLUMNS.contains(&column) {
            return Err(TesseraError::InvalidParameter(format!(
                "unknown snapshot column: {}",
                column
            )));
        }

        let mut sql = format!("SELECT date, {column} FROM daily_snapshots");
        let mut args: Vec<SqlValue> = Vec::new();
        let mut clauses: Vec<&str> = Vec::new();

        if let Some(start) = start {
            clauses.push("date >= ?");
            args.push(SqlValue::from(start.to_string()));
        }
        if let Some(end) = end {
            clauses.push("date <= ?");
            args.push(SqlValue::from(end.to_string()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY date ASC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            args.push(SqlValue::from(limit as i64));
        }

        let mut stmt = self
            .conn()
            .prepare(&sql)
            .map_err(|e| TesseraError::store(format!("Failed to prepare snapshot query: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(args), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?))
            })
            .map_err(|e| TesseraError::store(format!("Failed to query snapshots: {}", e)))?;

        let mut points = Vec::new();
        for row in rows {
            let (date, value) =
                row.map_err(|e| TesseraError::store(format!("Failed to read row: {}", e)))?;
            points.push(SnapshotPoint {
                date: parse_date(&date)?,
                value,
            });
        }
        Ok(points)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| TesseraError::store(format!("Bad date '{}': {}", raw, e)))
}

fn build_snapshot(date: &str, values: &[Option<f64>], raw: Option<&str>) -> Result<DailySnapshot> {
    let mut json = serde_json::Map::new();
    json.insert("date".to_string(), serde_json::Value::String(date.to_string()));
    for (column, value) in DailySnapshot::COLUMNS.iter().zip(values) {
        if let Some(v) = value {
            json.insert(
                column_to_field(column).to_string(),
                serde_json::json!(v),
            );
        }
    }
    let mut snapshot: DailySnapshot = serde_json::from_value(serde_json::Value::Object(json))?;
    snapshot.raw = raw.map(serde_json::from_str).transpose()?;
    Ok(snapshot)
}

/// The lone column whose SQL name differs from the struct field
fn column_to_field(column: &str) -> &str {
    if column == "step" {
        "steps"
    } else {
        column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn snapshot(date: NaiveDate, weight: Option<f64>, calories: Option<f64>) -> DailySnapshot {
        DailySnapshot {
            date,
            weight_kg: weight,
            calories_kcal: calories,
            ..Default::default()
        }
    }

    #[test]
    fn test_upsert_and_read_back() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_snapshot(&snapshot(day(10), Some(80.5), Some(2400.0)))
            .unwrap();

        let loaded = store.get_snapshot(day(10)).unwrap().unwrap();
        assert_eq!(loaded.weight_kg, Some(80.5));
        assert_eq!(loaded.calories_kcal, Some(2400.0));
        assert_eq!(loaded.fiber_g, None);
    }

    #[test]
    fn test_reimport_overwrites_wholesale() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_snapshot(&snapshot(day(10), Some(80.5), Some(2400.0)))
            .unwrap();
        // Second import has no calories at all; the old value must not survive.
        store
            .upsert_snapshot(&snapshot(day(10), Some(80.1), None))
            .unwrap();

        let loaded = store.get_snapshot(day(10)).unwrap().unwrap();
        assert_eq!(loaded.weight_kg, Some(80.1));
        assert_eq!(loaded.calories_kcal, None);

        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM daily_snapshots", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_snapshot_points_bounds() {
        let store = Store::open_in_memory().unwrap();
        for d in 9..=12 {
            store
                .upsert_snapshot(&snapshot(day(d), Some(80.0 + d as f64), None))
                .unwrap();
        }

        let points = store
            .snapshot_points("weight_kg", Some(day(10)), Some(day(11)), None)
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, day(10));
        assert_eq!(points[1].date, day(11));
    }

    #[test]
    fn test_snapshot_points_null_values_kept() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_snapshot(&snapshot(day(10), None, Some(2400.0)))
            .unwrap();

        let points = store
            .snapshot_points("weight_kg", None, None, None)
            .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, None);
    }

    #[test]
    fn test_unknown_column_rejected() {
        let store = Store::open_in_memory().unwrap();
        assert!(store
            .snapshot_points("value; DROP TABLE", None, None, None)
            .is_err());
    }
}
