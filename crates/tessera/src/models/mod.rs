//! Domain models shared across the pipeline and the query engine

mod integration;
mod observation;
mod snapshot;

pub use integration::Integration;
pub use observation::{Observation, Reading, TrendPoint};
pub use snapshot::DailySnapshot;

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::TesseraError;

/// Vendors the system can pull from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Withings,
    Garmin,
}

impl Vendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Withings => "withings",
            Vendor::Garmin => "garmin",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "withings" => Ok(Vendor::Withings),
            "garmin" => Ok(Vendor::Garmin),
            other => Err(TesseraError::InvalidParameter(format!(
                "unknown vendor: {}",
                other
            ))),
        }
    }
}

/// Inclusive calendar-day range for a fetch window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Trailing window of `days` days ending at `end`, inclusive.
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// Iterate every day in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let mut current = self.start;
        let end = self.end;
        std::iter::from_fn(move || {
            if current > end {
                return None;
            }
            let d = current;
            current += Duration::days(1);
            Some(d)
        })
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Result of one sync run, surfaced to the caller
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub imported: usize,
    pub message: String,
}
