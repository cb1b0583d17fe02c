//! Vendor adapters: the normalization boundary
//!
//! Every vendor implements the same capability set: refresh credentials,
//! fetch a window of raw data, and normalize it into canonical readings.
//! The orchestrator drives adapters through [`VendorAdapter`] and never
//! sees vendor payload shapes.

mod garmin;
mod withings;

pub use garmin::{DaySample, GarminAdapter};
pub use withings::WithingsAdapter;

use async_trait::async_trait;

use crate::client::MeasureBody;
use crate::error::Result;
use crate::models::{FetchRange, Integration, Reading, Vendor};
use crate::store::Store;

/// Raw vendor payload for one fetch window, prior to normalization
#[derive(Debug)]
pub enum RawPayload {
    Withings(MeasureBody),
    Garmin(Vec<DaySample>),
}

#[async_trait(?Send)]
pub trait VendorAdapter: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Refresh or re-establish vendor credentials, persisting any rotated
    /// secrets into the integration row before fetching begins.
    async fn refresh_credentials(
        &self,
        store: &Store,
        integration: &mut Integration,
    ) -> Result<()>;

    /// Fetch the raw payload for `range`. Vendors that only support a
    /// fixed trailing window may ignore the range.
    async fn fetch_window(
        &self,
        integration: &Integration,
        range: &FetchRange,
    ) -> Result<RawPayload>;

    /// Map a raw payload to canonical readings. Rejects payload shapes
    /// outside the vendor catalog rather than dropping them silently.
    fn normalize(&self, payload: RawPayload, integration: &Integration) -> Result<Vec<Reading>>;
}
