//! Garmin metric catalog
//!
//! The companion service reports per-family JSON objects; each field that
//! survives normalization maps to one of these canonical metrics.

use crate::metrics::MetricDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GarminMetric {
    SleepScore,
    SleepQuality,
    SleepTotalHours,
    SleepDeepHours,
    SleepLightHours,
    SleepRemHours,
    SleepAwakeHours,
    RestingHeartRate,
    HeartRateMax,
    HeartRateMin,
    HeartRateAvg,
    HeartRate,
    HrvWeeklyAvg,
    HrvLastNightAvg,
    HrvStatus,
}

impl GarminMetric {
    pub fn def(self) -> &'static MetricDef {
        match self {
            Self::SleepScore => &MetricDef {
                key: "sleep_score",
                label: "Sleep Score",
                unit: Some("score"),
            },
            Self::SleepQuality => &MetricDef {
                key: "sleep_quality",
                label: "Sleep Quality",
                unit: Some("rating"),
            },
            Self::SleepTotalHours => &MetricDef {
                key: "sleep_total_hours",
                label: "Total Sleep Hours",
                unit: Some("hours"),
            },
            Self::SleepDeepHours => &MetricDef {
                key: "sleep_deep_hours",
                label: "Deep Sleep Hours",
                unit: Some("hours"),
            },
            Self::SleepLightHours => &MetricDef {
                key: "sleep_light_hours",
                label: "Light Sleep Hours",
                unit: Some("hours"),
            },
            Self::SleepRemHours => &MetricDef {
                key: "sleep_rem_hours",
                label: "REM Sleep Hours",
                unit: Some("hours"),
            },
            Self::SleepAwakeHours => &MetricDef {
                key: "sleep_awake_hours",
                label: "Awake Hours",
                unit: Some("hours"),
            },
            Self::RestingHeartRate => &MetricDef {
                key: "resting_heart_rate",
                label: "Resting Heart Rate",
                unit: Some("bpm"),
            },
            Self::HeartRateMax => &MetricDef {
                key: "heart_rate_max",
                label: "Max Heart Rate",
                unit: Some("bpm"),
            },
            Self::HeartRateMin => &MetricDef {
                key: "heart_rate_min",
                label: "Min Heart Rate",
                unit: Some("bpm"),
            },
            Self::HeartRateAvg => &MetricDef {
                key: "heart_rate_avg",
                label: "Average Heart Rate",
                unit: Some("bpm"),
            },
            Self::HeartRate => &MetricDef {
                key: "heart_rate",
                label: "Heart Rate",
                unit: Some("bpm"),
            },
            Self::HrvWeeklyAvg => &MetricDef {
                key: "hrv_weekly_avg",
                label: "HRV Weekly Average",
                unit: Some("ms"),
            },
            Self::HrvLastNightAvg => &MetricDef {
                key: "hrv_last_night_avg",
                label: "HRV Last Night Average",
                unit: Some("ms"),
            },
            Self::HrvStatus => &MetricDef {
                key: "hrv_status",
                label: "HRV Status",
                unit: Some("status"),
            },
        }
    }
}

pub const ALL: &[GarminMetric] = &[
    GarminMetric::SleepScore,
    GarminMetric::SleepQuality,
    GarminMetric::SleepTotalHours,
    GarminMetric::SleepDeepHours,
    GarminMetric::SleepLightHours,
    GarminMetric::SleepRemHours,
    GarminMetric::SleepAwakeHours,
    GarminMetric::RestingHeartRate,
    GarminMetric::HeartRateMax,
    GarminMetric::HeartRateMin,
    GarminMetric::HeartRateAvg,
    GarminMetric::HeartRate,
    GarminMetric::HrvWeeklyAvg,
    GarminMetric::HrvLastNightAvg,
    GarminMetric::HrvStatus,
];

/// Look up the definition for a canonical key.
pub fn def_for_key(type_key: &str) -> Option<&'static MetricDef> {
    ALL.iter().map(|m| m.def()).find(|d| d.key == type_key)
}
