//! Withings adapter: OAuth2 token refresh and body-composition groups

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::client::{MeasureBody, WithingsClient};
use crate::config::WithingsConfig;
use crate::error::{Result, TesseraError};
use crate::metrics::MeasureCode;
use crate::models::{FetchRange, Integration, Reading, Vendor};
use crate::store::Store;

use super::{RawPayload, VendorAdapter};

pub struct WithingsAdapter {
    client: WithingsClient,
}

impl WithingsAdapter {
    pub fn new(config: &WithingsConfig) -> Self {
        Self {
            client: WithingsClient::new(config),
        }
    }

    #[doc(hidden)]
    pub fn with_client(client: WithingsClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl VendorAdapter for WithingsAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::Withings
    }

    /// Rotate the token pair. The vendor invalidates the old refresh
    /// token on use, so the new pair is persisted before anything else
    /// can fail.
    async fn refresh_credentials(
        &self,
        store: &Store,
        integration: &mut Integration,
    ) -> Result<()> {
        let refresh_token = integration
            .refresh_token
            .as_deref()
            .ok_or_else(|| TesseraError::MissingCredentials("withings refresh token".into()))?;

        let tokens = self.client.refresh_access_token(refresh_token).await?;
        let expires_at = Utc::now() + Duration::seconds(tokens.expires_in);

        store.update_integration_tokens(
            &integration.id,
            &tokens.access_token,
            &tokens.refresh_token,
            &tokens.scope,
            expires_at,
        )?;

        integration.access_token = Some(tokens.access_token);
        integration.refresh_token = Some(tokens.refresh_token);
        integration.scope = Some(tokens.scope);
        integration.expires_at = Some(expires_at);

        Ok(())
    }

    /// Always the trailing week from now; the range argument is ignored
    /// because the vendor flow has no backfill path.
    async fn fetch_window(
        &self,
        integration: &Integration,
        _range: &FetchRange,
    ) -> Result<RawPayload> {
        let access_token = integration
            .access_token
            .as_deref()
            .ok_or_else(|| TesseraError::MissingCredentials("withings access token".into()))?;

        let body = self.client.get_measurements(access_token).await?;
        Ok(RawPayload::Withings(body))
    }

    fn normalize(&self, payload: RawPayload, integration: &Integration) -> Result<Vec<Reading>> {
        let RawPayload::Withings(body) = payload else {
            return Err(TesseraError::validation(
                "withings adapter received a foreign payload",
            ));
        };

        let mut readings = Vec::new();
        for group in &body.measuregrps {
            let observed_at = timestamp_from_unix(group.date)?;
            for measure in &group.measures {
                let code = MeasureCode::from_code(measure.type_code)?;
                let def = code.def().ok_or_else(|| {
                    TesseraError::validation(format!(
                        "Retired withings measure type code: {}",
                        measure.type_code
                    ))
                })?;

                readings.push(Reading {
                    source: Vendor::Withings,
                    type_key: def.key.to_string(),
                    label: def.label.to_string(),
                    unit: def.unit.map(|u| u.to_string()),
                    value: scale_value(measure.value, measure.unit),
                    observed_at,
                    user_id: integration.user_id.clone(),
                    integration_id: integration.id.clone(),
                });
            }
        }

        Ok(readings)
    }
}

/// True value is `raw * 10^exponent`, rounded to two decimals
fn scale_value(raw: i64, exponent: i64) -> f64 {
    let value = raw as f64 * 10f64.powi(exponent as i32);
    (value * 100.0).round() / 100.0
}

fn timestamp_from_unix(secs: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| TesseraError::validation(format!("Bad measurement timestamp: {}", secs)))
}
