//! Withings API client
//!
//! The vendor signals failure through a top-level `status` field inside an
//! HTTP 200 response; a 200 alone never means success. Both the token and
//! measurement endpoints go through the same envelope check.

use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::WithingsConfig;
use crate::error::{Result, TesseraError};
use crate::metrics::withings::meastypes_param;

/// Trailing fetch window, in days. Every scheduled run re-fetches this
/// window and relies on the store's upsert key for idempotence.
pub const FETCH_WINDOW_DAYS: i64 = 7;

/// Token pair returned by the vendor's token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct WithingsTokens {
    #[serde(default)]
    pub userid: Option<i64>,
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: i64,
}

/// One scalar measure inside a group: `value * 10^unit` is the real value
#[derive(Debug, Clone, Deserialize)]
pub struct Measure {
    pub value: i64,
    #[serde(rename = "type")]
    pub type_code: i64,
    pub unit: i64,
}

/// A group of measures taken at one moment
#[derive(Debug, Clone, Deserialize)]
pub struct MeasureGroup {
    pub grpid: i64,
    /// Unix timestamp the measurement applies to
    pub date: i64,
    pub measures: Vec<Measure>,
}

/// Body of a successful measurement response
#[derive(Debug, Clone, Deserialize)]
pub struct MeasureBody {
    #[serde(default)]
    pub updatetime: i64,
    #[serde(default)]
    pub timezone: String,
    pub measuregrps: Vec<MeasureGroup>,
}

/// Application-level envelope: status 0 is success, anything else failure.
/// The body is kept raw until the status check passes, since error
/// responses carry an empty object there.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: i64,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    body: serde_json::Value,
}

pub struct WithingsClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl WithingsClient {
    pub fn new(config: &WithingsConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(super::HTTP_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.base_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Create a client with a custom base URL (for testing)
    #[doc(hidden)]
    pub fn new_with_base_url(base_url: &str, client_id: &str, client_secret: &str) -> Self {
        Self::new(&WithingsConfig {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            base_url: base_url.to_string(),
        })
    }

    /// Exchange a refresh token for a fresh token pair.
    ///
    /// A non-zero application status, even under HTTP 200, means the
    /// vendor rejected the credentials.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<WithingsTokens> {
        let form = [
            ("action", "requesttoken"),
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];

        let url = format!("{}/v2/oauth2", self.base_url);
        let response = self.client.post(&url).form(&form).send().await?;

        self.unwrap_envelope(response, |status, error| {
            TesseraError::auth(format!(
                "Token refresh rejected (status {}): {}",
                status,
                error.unwrap_or_else(|| "no error detail".to_string())
            ))
        })
        .await
    }

    /// Fetch the trailing week of body measurements.
    ///
    /// The window is always the last [`FETCH_WINDOW_DAYS`] days from now;
    /// arbitrary historical backfill is not supported for this vendor.
    pub async fn get_measurements(&self, access_token: &str) -> Result<MeasureBody> {
        let now = Utc::now();
        let start = now - Duration::days(FETCH_WINDOW_DAYS);
        let meastypes = meastypes_param();

        let form = [
            ("action", "getmeas".to_string()),
            ("meastypes", meastypes),
            ("category", "1".to_string()),
            ("startdate", start.timestamp().to_string()),
            ("enddate", now.timestamp().to_string()),
        ];

        let url = format!("{}/measure", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .form(&form)
            .send()
            .await?;

        self.unwrap_envelope(response, |status, error| {
            TesseraError::fetch(format!(
                "Measurement fetch failed (status {}): {}",
                status,
                error.unwrap_or_else(|| "no error detail".to_string())
            ))
        })
        .await
    }

    /// Check both the HTTP status and the application-level status field.
    async fn unwrap_envelope<T, F>(&self, response: reqwest::Response, on_status: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(i64, Option<String>) -> TesseraError,
    {
        let http_status = response.status();
        if !http_status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TesseraError::fetch(format!(
                "HTTP error {}: {}",
                http_status, body
            )));
        }

        let envelope: Envelope = response.json().await.map_err(|e| {
            TesseraError::validation(format!("Failed to parse withings response: {}", e))
        })?;

        if envelope.status != 0 {
            return Err(on_status(envelope.status, envelope.error));
        }

        serde_json::from_value(envelope.body).map_err(|e| {
            TesseraError::validation(format!("Failed to parse withings response body: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_error_arm_parses() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"status": 1, "error": "invalid_token", "body": {}}"#).unwrap();
        assert_eq!(envelope.status, 1);
        assert_eq!(envelope.error.as_deref(), Some("invalid_token"));
    }

    #[test]
    fn test_measure_body_parses() {
        let json = r#"{
            "status": 0,
            "body": {
                "updatetime": 1700000000,
                "timezone": "Europe/Madrid",
                "measuregrps": [
                    {
                        "grpid": 42,
                        "attrib": 0,
                        "date": 1699999000,
                        "category": 1,
                        "measures": [
                            {"value": 702, "type": 1, "unit": -2}
                        ]
                    }
                ]
            }
        }"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        let body: MeasureBody = serde_json::from_value(envelope.body).unwrap();
        assert_eq!(body.measuregrps.len(), 1);
        let measure = &body.measuregrps[0].measures[0];
        assert_eq!(measure.value, 702);
        assert_eq!(measure.type_code, 1);
        assert_eq!(measure.unit, -2);
    }
}
