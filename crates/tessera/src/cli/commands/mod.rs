pub mod integrations;
pub mod snapshot;
pub mod sync;
pub mod trend;

pub use integrations::{connect, disconnect, list as list_integrations};
pub use snapshot::import as import_snapshots;
pub use sync::run as sync_run;
pub use trend::{aggregated as trend_aggregated, query as trend_query};

use chrono::NaiveDate;

use crate::error::{Result, TesseraError};

/// Parse a YYYY-MM-DD argument
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| TesseraError::InvalidDateFormat(raw.to_string()))
}
