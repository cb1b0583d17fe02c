//! Garmin companion service client
//!
//! The companion service wraps Garmin Connect behind plain JSON endpoints,
//! one per metric family. Fetch cost is one request per day per family;
//! each request carries its own timeout and failures stay scoped to that
//! (day, family) unit.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::GarminServiceConfig;
use crate::error::{Result, TesseraError};

/// Daily sleep summary from `/sleep`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SleepSummary {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub sleep_score: Option<f64>,
    #[serde(default)]
    pub total_hours: Option<f64>,
    #[serde(default)]
    pub deep_hours: Option<f64>,
    #[serde(default)]
    pub light_hours: Option<f64>,
    #[serde(default)]
    pub rem_hours: Option<f64>,
    #[serde(default)]
    pub awake_hours: Option<f64>,
}

/// One intraday heart-rate sample
#[derive(Debug, Clone, Deserialize)]
pub struct HeartRateSample {
    pub time: String,
    #[serde(default)]
    pub bpm: Option<f64>,
}

/// Daily heart-rate summary plus intraday samples from `/hr`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeartRateSummary {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub resting_hr: Option<f64>,
    #[serde(default)]
    pub max_hr: Option<f64>,
    #[serde(default)]
    pub min_hr: Option<f64>,
    #[serde(default)]
    pub avg_hr: Option<f64>,
    #[serde(default)]
    pub timeseries: Vec<HeartRateSample>,
}

/// HRV status arrives as a number or a string depending on the upstream
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HrvStatusValue {
    Number(f64),
    Text(String),
}

impl HrvStatusValue {
    /// Numeric form; non-numeric text collapses to 0.
    pub fn as_f64(&self) -> f64 {
        match self {
            HrvStatusValue::Number(n) => *n,
            HrvStatusValue::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }
}

/// Heart-rate-variability summary from `/hrv`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HrvSummary {
    #[serde(default)]
    pub weekly_average: Option<f64>,
    #[serde(default)]
    pub last_night_average: Option<f64>,
    #[serde(default)]
    pub status: Option<HrvStatusValue>,
}

pub struct GarminServiceClient {
    client: reqwest::Client,
    base_url: String,
    admin_key: Option<String>,
}

impl GarminServiceClient {
    pub fn new(config: &GarminServiceConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(super::HTTP_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.base_url.clone(),
            admin_key: config.admin_key.clone(),
        }
    }

    /// Create a client with a custom base URL (for testing)
    #[doc(hidden)]
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self::new(&GarminServiceConfig {
            base_url: base_url.to_string(),
            admin_key: None,
        })
    }

    /// Push decrypted credentials to the companion service so it can
    /// establish or refresh its own session with the vendor.
    pub async fn update_credentials(&self, email: &str, password: &str) -> Result<()> {
        let url = format!("{}/update-credentials", self.base_url);
        let mut request = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "email": email, "password": password }));

        if let Some(key) = &self.admin_key {
            request = request.header("X-API-Key", key.as_str());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TesseraError::fetch(format!(
                "Failed to update credentials on garmin service ({}): {}",
                status, body
            )));
        }

        Ok(())
    }

    /// Sleep summary for one day
    pub async fn fetch_sleep(&self, date: NaiveDate) -> Result<SleepSummary> {
        self.get_json(&format!("{}/sleep?date={}", self.base_url, date))
            .await
    }

    /// Heart-rate summary and intraday samples for one day
    pub async fn fetch_heart_rate(&self, date: NaiveDate) -> Result<HeartRateSummary> {
        self.get_json(&format!("{}/hr?date={}", self.base_url, date))
            .await
    }

    /// HRV summary for one day
    pub async fn fetch_hrv(&self, date: NaiveDate) -> Result<HrvSummary> {
        self.get_json(&format!("{}/hrv?start={}&end={}", self.base_url, date, date))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TesseraError::fetch(format!(
                "Garmin service error {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            TesseraError::validation(format!("Failed to parse garmin service response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_summary_absent_fields() {
        let sleep: SleepSummary =
            serde_json::from_str(r#"{"date": "2024-01-10", "sleep_score": 88}"#).unwrap();
        assert_eq!(sleep.sleep_score, Some(88.0));
        assert_eq!(sleep.deep_hours, None);
    }

    #[test]
    fn test_heart_rate_timeseries_null_bpm() {
        let hr: HeartRateSummary = serde_json::from_str(
            r#"{
                "resting_hr": 43,
                "timeseries": [
                    {"time": "2024-01-10T08:00:00+00:00", "bpm": 55},
                    {"time": "2024-01-10T08:01:00+00:00", "bpm": null}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(hr.timeseries.len(), 2);
        assert_eq!(hr.timeseries[0].bpm, Some(55.0));
        assert_eq!(hr.timeseries[1].bpm, None);
    }

    #[test]
    fn test_hrv_status_number_or_text() {
        let hrv: HrvSummary =
            serde_json::from_str(r#"{"weekly_average": 65, "status": "BALANCED"}"#).unwrap();
        assert_eq!(hrv.status.unwrap().as_f64(), 0.0);

        let hrv: HrvSummary = serde_json::from_str(r#"{"status": 2}"#).unwrap();
        assert_eq!(hrv.status.unwrap().as_f64(), 2.0);

        let hrv: HrvSummary = serde_json::from_str(r#"{"status": "3"}"#).unwrap();
        assert_eq!(hrv.status.unwrap().as_f64(), 3.0);
    }
}
