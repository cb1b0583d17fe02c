//! Garmin adapter: per-day, per-family fetches through the companion
//! service, with partial-failure isolation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::warn;

use crate::client::{GarminServiceClient, HeartRateSummary, HrvSummary, SleepSummary};
use crate::config::GarminServiceConfig;
use crate::crypto::Cipher;
use crate::error::{Result, TesseraError};
use crate::metrics::GarminMetric;
use crate::models::{FetchRange, Integration, Reading, Vendor};
use crate::store::Store;

use super::{RawPayload, VendorAdapter};

/// Everything fetched for one calendar day. A `None` family means that
/// fetch failed or returned nothing; the other families are unaffected.
#[derive(Debug, Default)]
pub struct DaySample {
    pub date: NaiveDate,
    pub sleep: Option<SleepSummary>,
    pub heart_rate: Option<HeartRateSummary>,
    pub hrv: Option<HrvSummary>,
}

pub struct GarminAdapter {
    client: GarminServiceClient,
    cipher: Arc<dyn Cipher>,
}

impl GarminAdapter {
    pub fn new(config: &GarminServiceConfig, cipher: Arc<dyn Cipher>) -> Self {
        Self {
            client: GarminServiceClient::new(config),
            cipher,
        }
    }

    #[doc(hidden)]
    pub fn with_client(client: GarminServiceClient, cipher: Arc<dyn Cipher>) -> Self {
        Self { client, cipher }
    }
}

#[async_trait(?Send)]
impl VendorAdapter for GarminAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::Garmin
    }

    /// Decrypt the stored credential pair and push it to the companion
    /// service. A push failure is tolerated: the service may still hold
    /// valid session tokens from an earlier push.
    async fn refresh_credentials(
        &self,
        _store: &Store,
        integration: &mut Integration,
    ) -> Result<()> {
        let email = integration
            .garmin_email
            .as_deref()
            .ok_or_else(|| TesseraError::MissingCredentials("garmin email".into()))?;
        let password = integration
            .garmin_password
            .as_deref()
            .ok_or_else(|| TesseraError::MissingCredentials("garmin password".into()))?;

        let email = self.cipher.decrypt(email)?;
        let password = self.cipher.decrypt(password)?;

        if let Err(e) = self.client.update_credentials(&email, &password).await {
            warn!("failed to push credentials to garmin service: {}", e);
        }

        Ok(())
    }

    /// One request per day per family. A failed unit is logged and
    /// skipped; the run continues with the remaining units.
    async fn fetch_window(
        &self,
        _integration: &Integration,
        range: &FetchRange,
    ) -> Result<RawPayload> {
        let mut samples = Vec::new();

        for date in range.days() {
            let sleep = match self.client.fetch_sleep(date).await {
                Ok(sleep) => Some(sleep),
                Err(e) => {
                    warn!("sleep fetch failed for {}: {}", date, e);
                    None
                }
            };

            let heart_rate = match self.client.fetch_heart_rate(date).await {
                Ok(hr) => Some(hr),
                Err(e) => {
                    warn!("heart-rate fetch failed for {}: {}", date, e);
                    None
                }
            };

            let hrv = match self.client.fetch_hrv(date).await {
                Ok(hrv) => Some(hrv),
                Err(e) => {
                    warn!("hrv fetch failed for {}: {}", date, e);
                    None
                }
            };

            samples.push(DaySample {
                date,
                sleep,
                heart_rate,
                hrv,
            });
        }

        Ok(RawPayload::Garmin(samples))
    }

    fn normalize(&self, payload: RawPayload, integration: &Integration) -> Result<Vec<Reading>> {
        let RawPayload::Garmin(samples) = payload else {
            return Err(TesseraError::validation(
                "garmin adapter received a foreign payload",
            ));
        };

        let mut readings = Vec::new();
        for sample in &samples {
            normalize_day(sample, integration, &mut readings);
        }
        Ok(readings)
    }
}

fn normalize_day(sample: &DaySample, integration: &Integration, out: &mut Vec<Reading>) {
    let day_start = midnight(sample.date);

    if let Some(sleep) = &sample.sleep {
        // The sleep payload carries its own start time; fall back to the
        // fetch day when absent or unparseable.
        let observed_at = sleep
            .date
            .as_deref()
            .and_then(parse_loose_ts)
            .unwrap_or(day_start);

        let fields = [
            (GarminMetric::SleepScore, sleep.sleep_score),
            (GarminMetric::SleepTotalHours, sleep.total_hours),
            (GarminMetric::SleepDeepHours, sleep.deep_hours),
            (GarminMetric::SleepLightHours, sleep.light_hours),
            (GarminMetric::SleepRemHours, sleep.rem_hours),
            (GarminMetric::SleepAwakeHours, sleep.awake_hours),
        ];
        for (metric, value) in fields {
            push_reading(out, integration, metric, value, observed_at);
        }
    }

    if let Some(hr) = &sample.heart_rate {
        let fields = [
            (GarminMetric::RestingHeartRate, hr.resting_hr),
            (GarminMetric::HeartRateMax, hr.max_hr),
            (GarminMetric::HeartRateMin, hr.min_hr),
            (GarminMetric::HeartRateAvg, hr.avg_hr),
        ];
        for (metric, value) in fields {
            push_reading(out, integration, metric, value, day_start);
        }

        // Intraday samples keep their own timestamps; this is the only
        // metric with sub-daily granularity.
        for point in &hr.timeseries {
            let Some(bpm) = point.bpm else { continue };
            let Some(observed_at) = parse_loose_ts(&point.time) else {
                warn!("skipping heart-rate sample with bad time: {}", point.time);
                continue;
            };
            push_reading(out, integration, GarminMetric::HeartRate, Some(bpm), observed_at);
        }
    }

    if let Some(hrv) = &sample.hrv {
        push_reading(
            out,
            integration,
            GarminMetric::HrvWeeklyAvg,
            hrv.weekly_average,
            day_start,
        );
        push_reading(
            out,
            integration,
            GarminMetric::HrvLastNightAvg,
            hrv.last_night_average,
            day_start,
        );
        push_reading(
            out,
            integration,
            GarminMetric::HrvStatus,
            hrv.status.as_ref().map(|s| s.as_f64()),
            day_start,
        );
    }
}

/// Absent fields are simply omitted; there is no zero-fill.
fn push_reading(
    out: &mut Vec<Reading>,
    integration: &Integration,
    metric: GarminMetric,
    value: Option<f64>,
    observed_at: DateTime<Utc>,
) {
    let Some(value) = value else { return };
    let def = metric.def();
    out.push(Reading {
        source: Vendor::Garmin,
        type_key: def.key.to_string(),
        label: def.label.to_string(),
        unit: def.unit.map(|u| u.to_string()),
        value,
        observed_at,
        user_id: integration.user_id.clone(),
        integration_id: integration.id.clone(),
    });
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

/// Parse the assorted timestamp shapes the companion service emits
fn parse_loose_ts(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(midnight(date));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HeartRateSample;
    use crate::crypto::XorCipher;

    fn integration() -> Integration {
        let mut integration =
            Integration::new_credentials("u1", Vendor::Garmin, "e".into(), "p".into());
        integration.id = "i2".to_string();
        integration
    }

    fn adapter() -> GarminAdapter {
        GarminAdapter::with_client(
            GarminServiceClient::new_with_base_url("http://localhost:0"),
            Arc::new(XorCipher::new("k")),
        )
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_normalize_sleep_skips_absent_fields() {
        let sample = DaySample {
            date: day(),
            sleep: Some(SleepSummary {
                date: Some("2024-01-09T23:05:00.0".to_string()),
                sleep_score: Some(88.0),
                total_hours: Some(7.5),
                ..Default::default()
            }),
            ..Default::default()
        };

        let readings = adapter()
            .normalize(RawPayload::Garmin(vec![sample]), &integration())
            .unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].type_key, "sleep_score");
        assert_eq!(readings[0].value, 88.0);
        // Stamped with the payload's own start time, not the fetch day.
        assert_eq!(
            readings[0].observed_at,
            NaiveDate::from_ymd_opt(2024, 1, 9)
                .unwrap()
                .and_hms_opt(23, 5, 0)
                .unwrap()
                .and_utc()
        );
        assert_eq!(readings[1].type_key, "sleep_total_hours");
    }

    #[test]
    fn test_normalize_heart_rate_timeseries() {
        let sample = DaySample {
            date: day(),
            heart_rate: Some(HeartRateSummary {
                resting_hr: Some(43.0),
                timeseries: vec![
                    HeartRateSample {
                        time: "2024-01-10T08:00:00+00:00".to_string(),
                        bpm: Some(55.0),
                    },
                    HeartRateSample {
                        time: "2024-01-10T08:01:00+00:00".to_string(),
                        bpm: None,
                    },
                ],
                ..Default::default()
            }),
            ..Default::default()
        };

        let readings = adapter()
            .normalize(RawPayload::Garmin(vec![sample]), &integration())
            .unwrap();

        // resting_hr at day start, plus one intraday sample; null bpm dropped.
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].type_key, "resting_heart_rate");
        assert_eq!(readings[0].observed_at, midnight(day()));
        assert_eq!(readings[1].type_key, "heart_rate");
        assert_eq!(readings[1].value, 55.0);
        assert_eq!(
            readings[1].observed_at,
            day().and_hms_opt(8, 0, 0).unwrap().and_utc()
        );
    }

    #[test]
    fn test_normalize_hrv_status_text() {
        let hrv: HrvSummary = serde_json::from_str(
            r#"{"weekly_average": 65, "last_night_average": 62, "status": "BALANCED"}"#,
        )
        .unwrap();
        let sample = DaySample {
            date: day(),
            hrv: Some(hrv),
            ..Default::default()
        };

        let readings = adapter()
            .normalize(RawPayload::Garmin(vec![sample]), &integration())
            .unwrap();

        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].type_key, "hrv_weekly_avg");
        assert_eq!(readings[0].value, 65.0);
        assert_eq!(readings[2].type_key, "hrv_status");
        assert_eq!(readings[2].value, 0.0);
    }

    #[test]
    fn test_failed_family_leaves_day_partial() {
        // HRV fetch failed for this day: the sample has no hrv but the
        // other families still normalize.
        let sample = DaySample {
            date: day(),
            sleep: Some(SleepSummary {
                sleep_score: Some(80.0),
                ..Default::default()
            }),
            heart_rate: Some(HeartRateSummary {
                resting_hr: Some(45.0),
                ..Default::default()
            }),
            hrv: None,
        };

        let readings = adapter()
            .normalize(RawPayload::Garmin(vec![sample]), &integration())
            .unwrap();

        let types: Vec<_> = readings.iter().map(|r| r.type_key.as_str()).collect();
        assert_eq!(types, vec!["sleep_score", "resting_heart_rate"]);
    }

    #[test]
    fn test_parse_loose_ts_shapes() {
        assert!(parse_loose_ts("2024-01-10T08:00:00+00:00").is_some());
        assert!(parse_loose_ts("2024-01-09T23:05:00.0").is_some());
        assert!(parse_loose_ts("2024-01-09 23:05:00").is_some());
        assert_eq!(parse_loose_ts("2024-01-10"), Some(midnight(day())));
        assert!(parse_loose_ts("not a time").is_none());
    }
}
