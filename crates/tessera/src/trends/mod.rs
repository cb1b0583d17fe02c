//! Trend query and aggregation engine
//!
//! Serves uniform "metric over time" answers across two structurally
//! different stores: the sparse observations table and the wide per-day
//! snapshot table. Reads are independent of ingestion and take the same
//! inclusive date bounds regardless of backing store.

pub mod entities;

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::{Result, TesseraError};
use crate::models::TrendPoint;
use crate::store::Store;

use entities::{resolve, ResolvedEntity};

/// Most entities one aggregated query may request
pub const MAX_ENTITIES: usize = 5;
/// Hard cap on raw rows fetched per entity before aggregation
pub const MAX_LIMIT: usize = 1000;
/// Raw-row limit when the caller does not pass one
pub const DEFAULT_LIMIT: usize = 100;

/// Temporal bucket for aggregation. Weekly buckets start on the ISO week
/// start (Monday); monthly buckets on the first of the calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Daily,
    Weekly,
    Monthly,
}

impl Bucket {
    /// The bucket key a date falls into
    pub fn key(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Bucket::Daily => date,
            Bucket::Weekly => {
                let week = date.iso_week();
                NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon)
                    .expect("iso week start is always valid")
            }
            Bucket::Monthly => date.with_day(1).expect("first of month is always valid"),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bucket::Daily => "daily",
            Bucket::Weekly => "weekly",
            Bucket::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

impl FromStr for Bucket {
    type Err = TesseraError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Bucket::Daily),
            "weekly" => Ok(Bucket::Weekly),
            "monthly" => Ok(Bucket::Monthly),
            other => Err(TesseraError::InvalidParameter(format!(
                "unknown aggregation: {}",
                other
            ))),
        }
    }
}

/// Metadata + data envelope for aggregated queries
#[derive(Debug, Serialize)]
pub struct TrendReport {
    pub metadata: TrendMetadata,
    pub data: Vec<BucketRow>,
}

#[derive(Debug, Serialize)]
pub struct TrendMetadata {
    pub entities: Vec<String>,
    pub aggregation: Bucket,
    pub date_range: Option<DateRange>,
    pub count: usize,
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct BucketRow {
    pub date: NaiveDate,
    pub metrics: Vec<MetricValue>,
}

#[derive(Debug, Serialize)]
pub struct MetricValue {
    pub label: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
}

/// Raw per-entity series before bucketing
struct RawSeries {
    entity: String,
    unit: Option<String>,
    points: Vec<(NaiveDate, Option<f64>)>,
}

pub struct TrendEngine<'a> {
    store: &'a Store,
}

impl<'a> TrendEngine<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Points for one entity, uniform over both stores.
    ///
    /// Resolution order: snapshot column map, then metric catalogs, then
    /// raw pass-through on the observations table (which ignores date
    /// bounds, permitting ad hoc queries for uncurated types).
    pub fn query(
        &self,
        entity: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<TrendPoint>> {
        match resolve(entity) {
            ResolvedEntity::Snapshot(snapshot) => {
                let points = self
                    .store
                    .snapshot_points(snapshot.column, start, end, None)?;
                Ok(points
                    .into_iter()
                    .map(|p| TrendPoint {
                        date: p.date.and_hms_opt(0, 0, 0).expect("midnight").and_utc(),
                        label: entity.to_string(),
                        unit: Some(snapshot.unit.to_string()),
                        value: p.value,
                    })
                    .collect())
            }
            ResolvedEntity::Metric(unit) => {
                let points = self.store.observation_points(entity, start, end, None)?;
                Ok(points
                    .into_iter()
                    .map(|p| TrendPoint {
                        date: p.observed_at,
                        label: entity.to_string(),
                        unit: unit.map(|u| u.to_string()),
                        value: Some(p.value),
                    })
                    .collect())
            }
            ResolvedEntity::Raw => {
                let points = self.store.observation_points(entity, None, None, None)?;
                Ok(points
                    .into_iter()
                    .map(|p| TrendPoint {
                        date: p.observed_at,
                        label: p.label,
                        unit: p.unit,
                        value: Some(p.value),
                    })
                    .collect())
            }
        }
    }

    /// Aggregated multi-entity query.
    ///
    /// The limit bounds raw rows fetched per entity before aggregation,
    /// not the number of buckets returned. Every entity is reduced
    /// independently: the arithmetic mean of its non-null values per
    /// bucket, null where a bucket holds none while another entity has
    /// data there. Buckets come back in ascending key order.
    pub fn query_aggregated(
        &self,
        requested: &[String],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        bucket: Bucket,
        limit: Option<usize>,
    ) -> Result<TrendReport> {
        if requested.is_empty() {
            return Err(TesseraError::InvalidParameter(
                "at least one entity is required".to_string(),
            ));
        }
        if requested.len() > MAX_ENTITIES {
            return Err(TesseraError::InvalidParameter(format!(
                "at most {} entities per query",
                MAX_ENTITIES
            )));
        }
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(TesseraError::InvalidParameter(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        let mut series = Vec::with_capacity(requested.len());
        for entity in requested {
            series.push(self.raw_series(entity, start, end, limit)?);
        }

        let date_range = series
            .iter()
            .flat_map(|s| s.points.iter().map(|(date, _)| *date))
            .fold(None::<DateRange>, |acc, date| {
                Some(match acc {
                    None => DateRange {
                        start: date,
                        end: date,
                    },
                    Some(range) => DateRange {
                        start: range.start.min(date),
                        end: range.end.max(date),
                    },
                })
            });

        // Union of bucket keys across entities, then one mean per
        // (bucket, entity).
        let mut keys = BTreeSet::new();
        let mut sums: Vec<HashMap<NaiveDate, (f64, usize)>> = Vec::with_capacity(series.len());
        for s in &series {
            let mut per_bucket: HashMap<NaiveDate, (f64, usize)> = HashMap::new();
            for (date, value) in &s.points {
                let key = bucket.key(*date);
                keys.insert(key);
                if let Some(value) = value {
                    let slot = per_bucket.entry(key).or_insert((0.0, 0));
                    slot.0 += value;
                    slot.1 += 1;
                }
            }
            sums.push(per_bucket);
        }

        let data: Vec<BucketRow> = keys
            .into_iter()
            .map(|key| BucketRow {
                date: key,
                metrics: series
                    .iter()
                    .zip(&sums)
                    .map(|(s, per_bucket)| MetricValue {
                        label: s.entity.clone(),
                        value: per_bucket
                            .get(&key)
                            .map(|(sum, count)| sum / *count as f64),
                        unit: s.unit.clone(),
                    })
                    .collect(),
            })
            .collect();

        Ok(TrendReport {
            metadata: TrendMetadata {
                entities: requested.to_vec(),
                aggregation: bucket,
                date_range,
                count: data.len(),
                limit,
            },
            data,
        })
    }

    fn raw_series(
        &self,
        entity: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: usize,
    ) -> Result<RawSeries> {
        let (unit, points) = match resolve(entity) {
            ResolvedEntity::Snapshot(snapshot) => {
                let points = self
                    .store
                    .snapshot_points(snapshot.column, start, end, Some(limit))?;
                (
                    Some(snapshot.unit.to_string()),
                    points.into_iter().map(|p| (p.date, p.value)).collect(),
                )
            }
            ResolvedEntity::Metric(unit) => {
                let points = self
                    .store
                    .observation_points(entity, start, end, Some(limit))?;
                (
                    unit.map(|u| u.to_string()),
                    points
                        .into_iter()
                        .map(|p| (p.observed_at.date_naive(), Some(p.value)))
                        .collect(),
                )
            }
            ResolvedEntity::Raw => {
                let points = self.store.observation_points(entity, None, None, Some(limit))?;
                let unit = points.first().and_then(|p| p.unit.clone());
                (
                    unit,
                    points
                        .into_iter()
                        .map(|p| (p.observed_at.date_naive(), Some(p.value)))
                        .collect(),
                )
            }
        };

        Ok(RawSeries {
            entity: entity.to_string(),
            unit,
            points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailySnapshot, Reading, Vendor};
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn garmin_reading(type_key: &str, value: f64, d: u32) -> Reading {
        Reading {
            source: Vendor::Garmin,
            type_key: type_key.to_string(),
            label: type_key.to_string(),
            unit: Some("score".to_string()),
            value,
            observed_at: Utc.with_ymd_and_hms(2024, 1, d, 6, 0, 0).unwrap(),
            user_id: "u1".to_string(),
            integration_id: "i1".to_string(),
        }
    }

    fn snapshot_with_weight(d: u32, weight: Option<f64>) -> DailySnapshot {
        DailySnapshot {
            date: day(d),
            weight_kg: weight,
            ..Default::default()
        }
    }

    #[test]
    fn test_bucket_keys() {
        // 2024-01-10 is a Wednesday; its ISO week starts Monday 2024-01-08.
        assert_eq!(Bucket::Daily.key(day(10)), day(10));
        assert_eq!(Bucket::Weekly.key(day(10)), day(8));
        assert_eq!(Bucket::Monthly.key(day(10)), day(1));
    }

    #[test]
    fn test_query_snapshot_entity_uses_curated_unit() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_snapshot(&snapshot_with_weight(10, Some(80.5)))
            .unwrap();

        let points = TrendEngine::new(&store)
            .query("weight", None, None)
            .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "weight");
        assert_eq!(points[0].unit.as_deref(), Some("kg"));
        assert_eq!(points[0].value, Some(80.5));
    }

    #[test]
    fn test_query_vendor_entity_with_date_bounds() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_observations(&[
                garmin_reading("sleep_score", 80.0, 9),
                garmin_reading("sleep_score", 85.0, 10),
                garmin_reading("sleep_score", 90.0, 11),
            ])
            .unwrap();

        let points = TrendEngine::new(&store)
            .query("sleep_score", Some(day(10)), Some(day(10)))
            .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, Some(85.0));
        assert_eq!(points[0].label, "sleep_score");
    }

    #[test]
    fn test_weekly_mean_of_three_days() {
        let store = Store::open_in_memory().unwrap();
        // Mon/Tue/Wed of ISO week starting 2024-01-08
        store
            .upsert_observations(&[
                garmin_reading("sleep_score", 10.0, 8),
                garmin_reading("sleep_score", 20.0, 9),
                garmin_reading("sleep_score", 30.0, 10),
            ])
            .unwrap();

        let report = TrendEngine::new(&store)
            .query_aggregated(
                &["sleep_score".to_string()],
                None,
                None,
                Bucket::Weekly,
                None,
            )
            .unwrap();

        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].date, day(8));
        assert_eq!(report.data[0].metrics[0].value, Some(20.0));
        assert_eq!(report.metadata.count, 1);
    }

    #[test]
    fn test_sparse_bucket_yields_null_for_one_entity_only() {
        let store = Store::open_in_memory().unwrap();
        // sleep_score only in week of Jan 8; weight snapshot in both weeks.
        store
            .upsert_observations(&[garmin_reading("sleep_score", 80.0, 9)])
            .unwrap();
        store
            .upsert_snapshot(&snapshot_with_weight(9, Some(80.0)))
            .unwrap();
        store
            .upsert_snapshot(&snapshot_with_weight(16, Some(79.0)))
            .unwrap();

        let report = TrendEngine::new(&store)
            .query_aggregated(
                &["weight".to_string(), "sleep_score".to_string()],
                None,
                None,
                Bucket::Weekly,
                None,
            )
            .unwrap();

        assert_eq!(report.data.len(), 2);
        let second_week = &report.data[1];
        assert_eq!(second_week.date, day(15));
        assert_eq!(second_week.metrics[0].label, "weight");
        assert_eq!(second_week.metrics[0].value, Some(79.0));
        assert_eq!(second_week.metrics[1].label, "sleep_score");
        assert_eq!(second_week.metrics[1].value, None);
    }

    #[test]
    fn test_null_snapshot_values_do_not_drag_the_mean() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_snapshot(&snapshot_with_weight(8, Some(80.0)))
            .unwrap();
        store.upsert_snapshot(&snapshot_with_weight(9, None)).unwrap();

        let report = TrendEngine::new(&store)
            .query_aggregated(&["weight".to_string()], None, None, Bucket::Weekly, None)
            .unwrap();

        assert_eq!(report.data[0].metrics[0].value, Some(80.0));
    }

    #[test]
    fn test_monthly_bucket() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_snapshot(&snapshot_with_weight(8, Some(80.0)))
            .unwrap();
        store
            .upsert_snapshot(&snapshot_with_weight(20, Some(82.0)))
            .unwrap();

        let report = TrendEngine::new(&store)
            .query_aggregated(&["weight".to_string()], None, None, Bucket::Monthly, None)
            .unwrap();

        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].date, day(1));
        assert_eq!(report.data[0].metrics[0].value, Some(81.0));
    }

    #[test]
    fn test_limit_applies_to_raw_rows_before_aggregation() {
        let store = Store::open_in_memory().unwrap();
        for d in 8..=12 {
            store
                .upsert_snapshot(&snapshot_with_weight(d, Some(d as f64)))
                .unwrap();
        }

        // Only the first two raw rows survive the limit, so the weekly
        // mean covers Jan 8-9 alone.
        let report = TrendEngine::new(&store)
            .query_aggregated(
                &["weight".to_string()],
                None,
                None,
                Bucket::Weekly,
                Some(2),
            )
            .unwrap();

        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].metrics[0].value, Some(8.5));
    }

    #[test]
    fn test_entity_and_limit_caps() {
        let store = Store::open_in_memory().unwrap();
        let engine = TrendEngine::new(&store);

        let six: Vec<String> = (0..6).map(|i| format!("e{}", i)).collect();
        assert!(engine
            .query_aggregated(&six, None, None, Bucket::Daily, None)
            .is_err());

        assert!(engine
            .query_aggregated(
                &["weight".to_string()],
                None,
                None,
                Bucket::Daily,
                Some(1001)
            )
            .is_err());
    }

    #[test]
    fn test_metadata_date_range() {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_snapshot(&snapshot_with_weight(8, Some(80.0)))
            .unwrap();
        store
            .upsert_snapshot(&snapshot_with_weight(20, Some(82.0)))
            .unwrap();

        let report = TrendEngine::new(&store)
            .query_aggregated(&["weight".to_string()], None, None, Bucket::Daily, None)
            .unwrap();

        let range = report.metadata.date_range.unwrap();
        assert_eq!(range.start, day(8));
        assert_eq!(range.end, day(20));
        assert_eq!(report.metadata.count, 2);
        assert_eq!(report.metadata.limit, DEFAULT_LIMIT);
    }
}
