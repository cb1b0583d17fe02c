//! Derived metric calculator
//!
//! Computes composite metrics from base readings that share one
//! observation timestamp within a single ingestion batch. Strictly a
//! function of the batch: a batch without `weight` yields no percentages,
//! and previously stored values are never consulted.

use std::collections::BTreeMap;

use crate::metrics::MASS_BASIS;
use crate::models::Reading;

/// Derived readings for one ingestion batch.
///
/// For every observation timestamp where both `weight` and a mass-basis
/// metric are present (and non-zero), emits `<metric>_pct =
/// metric / weight * 100` rounded to one decimal, carrying the base
/// reading's provenance.
pub fn derived_readings(batch: &[Reading]) -> Vec<Reading> {
    let mut by_timestamp: BTreeMap<i64, Vec<&Reading>> = BTreeMap::new();
    for reading in batch {
        by_timestamp
            .entry(reading.observed_at.timestamp_millis())
            .or_default()
            .push(reading);
    }

    let mut derived = Vec::new();
    for group in by_timestamp.values() {
        let weight = group
            .iter()
            .find(|r| r.type_key == "weight" && r.value != 0.0)
            .map(|r| r.value);
        let Some(weight) = weight else {
            continue;
        };

        for (base_key, def) in MASS_BASIS {
            let Some(base) = group
                .iter()
                .find(|r| r.type_key == *base_key && r.value != 0.0)
            else {
                continue;
            };

            let pct = (base.value / weight * 100.0 * 10.0).round() / 10.0;
            derived.push(Reading {
                source: base.source,
                type_key: def.key.to_string(),
                label: def.label.to_string(),
                unit: def.unit.map(|u| u.to_string()),
                value: pct,
                observed_at: base.observed_at,
                user_id: base.user_id.clone(),
                integration_id: base.integration_id.clone(),
            });
        }
    }

    derived
}
