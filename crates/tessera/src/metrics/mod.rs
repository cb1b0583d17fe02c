//! Metric catalogs for vendor data
//!
//! Each vendor exposes an opaque vocabulary (integer type codes for
//! Withings, string keys for Garmin). The catalogs here are the single
//! source of truth for what the system understands: every code the vendor
//! has ever shipped is an explicit enum variant, and anything outside the
//! catalog is rejected at normalization time rather than silently dropped.

pub mod garmin;
pub mod withings;

pub use garmin::GarminMetric;
pub use withings::MeasureCode;

use crate::models::Vendor;

/// Canonical identity of one metric: type key, display label, unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDef {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
}

/// Mass-basis metrics and the percentage metric each one derives.
/// Derived metrics are computed from co-located base readings, never
/// fetched from a vendor.
pub const MASS_BASIS: &[(&str, MetricDef)] = &[
    (
        "muscle_mass",
        MetricDef {
            key: "muscle_mass_pct",
            label: "Muscle Mass (%)",
            unit: Some("%"),
        },
    ),
    (
        "bone_mass",
        MetricDef {
            key: "bone_mass_pct",
            label: "Bone Mass (%)",
            unit: Some("%"),
        },
    ),
];

/// Whether `type_key` is in the allow-list for `source`.
///
/// Derived percentage metrics ride along with the withings source since
/// they are computed from withings body-composition batches.
pub fn is_allowed(source: Vendor, type_key: &str) -> bool {
    match source {
        Vendor::Withings => {
            withings::active_keys().any(|k| k == type_key)
                || MASS_BASIS.iter().any(|(_, d)| d.key == type_key)
        }
        Vendor::Garmin => garmin::ALL.iter().any(|m| m.def().key == type_key),
    }
}

/// Look up a metric definition by canonical key, across all catalogs.
pub fn def_for_key(type_key: &str) -> Option<&'static MetricDef> {
    withings::def_for_key(type_key)
        .or_else(|| garmin::def_for_key(type_key))
        .or_else(|| {
            MASS_BASIS
                .iter()
                .map(|(_, d)| d)
                .find(|d| d.key == type_key)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_per_source() {
        assert!(is_allowed(Vendor::Withings, "weight"));
        assert!(is_allowed(Vendor::Withings, "muscle_mass_pct"));
        assert!(!is_allowed(Vendor::Withings, "sleep_score"));

        assert!(is_allowed(Vendor::Garmin, "sleep_score"));
        assert!(is_allowed(Vendor::Garmin, "heart_rate"));
        assert!(!is_allowed(Vendor::Garmin, "weight"));
    }

    #[test]
    fn test_def_for_key_spans_catalogs() {
        assert_eq!(def_for_key("weight").unwrap().unit, Some("kg"));
        assert_eq!(def_for_key("heart_rate").unwrap().unit, Some("bpm"));
        assert_eq!(def_for_key("bone_mass_pct").unwrap().unit, Some("%"));
        assert!(def_for_key("not_a_metric").is_none());
    }
}
