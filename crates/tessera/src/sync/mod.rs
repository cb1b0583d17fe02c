//! Ingestion orchestrator
//!
//! One sync run per (user, vendor) invocation: refresh credentials, fetch
//! the window, normalize, derive, upsert, report. Stages short-circuit on
//! failure, except inside the Garmin fetch loop where per-day, per-family
//! failures are isolated by the adapter. Runs take no locks; overlapping
//! runs are made safe by the store's upsert dedup key.

use std::fmt;
use std::sync::Arc;

use chrono::{Months, Utc};
use log::{debug, error, info};

use crate::adapters::{GarminAdapter, VendorAdapter, WithingsAdapter};
use crate::config::AppConfig;
use crate::crypto::XorCipher;
use crate::derive::derived_readings;
use crate::error::{Result, TesseraError};
use crate::models::{FetchRange, SyncOutcome, Vendor};
use crate::store::Store;

/// Pipeline stage of a sync run, recorded on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    RefreshCredentials,
    Fetch,
    Normalize,
    Derive,
    Upsert,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::RefreshCredentials => "refresh-credentials",
            SyncStage::Fetch => "fetch",
            SyncStage::Normalize => "normalize",
            SyncStage::Derive => "derive",
            SyncStage::Upsert => "upsert",
        };
        f.write_str(name)
    }
}

/// Sync engine for orchestrating vendor ingestion runs
pub struct SyncEngine {
    store: Store,
    withings: WithingsAdapter,
    garmin: GarminAdapter,
}

impl SyncEngine {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let store = Store::open(&config.db_path)?;
        Ok(Self::with_parts(
            store,
            WithingsAdapter::new(&config.withings),
            GarminAdapter::new(&config.garmin, Arc::new(XorCipher::new(&config.encryption_key))),
        ))
    }

    /// Assemble an engine from explicit parts (used by tests)
    pub fn with_parts(store: Store, withings: WithingsAdapter, garmin: GarminAdapter) -> Self {
        Self {
            store,
            withings,
            garmin,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Run one sync for (user, vendor).
    ///
    /// Returns the number of rows upserted and a human-readable message.
    /// Errors keep their taxonomy variant for status mapping; the failed
    /// stage goes to the log.
    pub async fn run(
        &self,
        user_id: &str,
        vendor: Vendor,
        range: Option<FetchRange>,
    ) -> Result<SyncOutcome> {
        let range = range.unwrap_or_else(|| default_range(vendor));
        info!(
            "sync {} for user {} ({} to {})",
            vendor, user_id, range.start, range.end
        );

        match self.run_stages(user_id, vendor, &range).await {
            Ok(outcome) => {
                info!("sync {} done: {} imported", vendor, outcome.imported);
                Ok(outcome)
            }
            Err((stage, e)) => {
                error!("sync {} failed at {}: {}", vendor, stage, e);
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        user_id: &str,
        vendor: Vendor,
        range: &FetchRange,
    ) -> std::result::Result<SyncOutcome, (SyncStage, TesseraError)> {
        let mut integration = self
            .store
            .get_integration(user_id, vendor)
            .map_err(|e| (SyncStage::RefreshCredentials, e))?
            .ok_or((
                SyncStage::RefreshCredentials,
                TesseraError::NotConnected(vendor.to_string()),
            ))?;

        let adapter: &dyn VendorAdapter = match vendor {
            Vendor::Withings => &self.withings,
            Vendor::Garmin => &self.garmin,
        };

        adapter
            .refresh_credentials(&self.store, &mut integration)
            .await
            .map_err(|e| (SyncStage::RefreshCredentials, e))?;

        let payload = adapter
            .fetch_window(&integration, range)
            .await
            .map_err(|e| (SyncStage::Fetch, e))?;

        let mut readings = adapter
            .normalize(payload, &integration)
            .map_err(|e| (SyncStage::Normalize, e))?;

        if readings.is_empty() {
            return Ok(SyncOutcome {
                imported: 0,
                message: "No data to import".to_string(),
            });
        }

        let derived = derived_readings(&readings);
        debug!("{} base readings, {} derived", readings.len(), derived.len());
        readings.extend(derived);

        let report = self
            .store
            .upsert_observations(&readings)
            .map_err(|e| (SyncStage::Upsert, e))?;

        Ok(SyncOutcome {
            imported: report.written,
            message: "Data fetched successfully".to_string(),
        })
    }
}

/// Default window per vendor: Garmin backfills a trailing month of days;
/// Withings always re-fetches its fixed trailing week regardless.
fn default_range(vendor: Vendor) -> FetchRange {
    let today = Utc::now().date_naive();
    match vendor {
        Vendor::Withings => FetchRange::trailing(today, 7),
        Vendor::Garmin => FetchRange::new(
            today.checked_sub_months(Months::new(1)).unwrap_or(today),
            today,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{GarminServiceClient, WithingsClient};
    use crate::models::Integration;

    fn engine() -> SyncEngine {
        SyncEngine::with_parts(
            Store::open_in_memory().unwrap(),
            WithingsAdapter::with_client(WithingsClient::new_with_base_url(
                "http://localhost:0",
                "id",
                "secret",
            )),
            GarminAdapter::with_client(
                GarminServiceClient::new_with_base_url("http://localhost:0"),
                Arc::new(XorCipher::new("k")),
            ),
        )
    }

    #[tokio::test]
    async fn test_run_without_integration_is_not_found() {
        let engine = engine();
        let err = engine
            .run("u1", Vendor::Withings, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TesseraError::NotConnected(_)));
        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn test_run_without_refresh_token_is_bad_request() {
        let engine = engine();
        engine
            .store()
            .insert_integration(&Integration::new_token("u1", Vendor::Withings))
            .unwrap();

        let err = engine
            .run("u1", Vendor::Withings, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TesseraError::MissingCredentials(_)));
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn test_garmin_without_credentials_is_bad_request() {
        let engine = engine();
        engine
            .store()
            .insert_integration(&Integration::new_token("u1", Vendor::Garmin))
            .unwrap();

        let err = engine.run("u1", Vendor::Garmin, None).await.unwrap_err();
        assert!(matches!(err, TesseraError::MissingCredentials(_)));
    }

    #[test]
    fn test_default_ranges() {
        let withings = default_range(Vendor::Withings);
        assert_eq!(withings.num_days(), 8);

        let garmin = default_range(Vendor::Garmin);
        assert!(garmin.num_days() >= 29 && garmin.num_days() <= 32);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(SyncStage::RefreshCredentials.to_string(), "refresh-credentials");
        assert_eq!(SyncStage::Upsert.to_string(), "upsert");
    }
}
