//! HTTP clients for vendor APIs
//!
//! One client per upstream: the Withings public API (OAuth2 bearer, an
//! application-level status field inside HTTP 200) and the Garmin
//! companion service (plain JSON per metric family). Every call has a
//! bounded timeout; a timed-out call surfaces as a fetch error for that
//! unit, never a hang.

pub mod garmin;
pub mod withings;

pub use garmin::{GarminServiceClient, HeartRateSample, HeartRateSummary, HrvSummary, SleepSummary};
pub use withings::{Measure, MeasureBody, MeasureGroup, WithingsClient, WithingsTokens};

/// Bounded timeout applied to every vendor HTTP call
pub(crate) const HTTP_TIMEOUT_SECS: u64 = 30;
