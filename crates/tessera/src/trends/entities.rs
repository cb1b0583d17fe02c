//! Entity vocabulary for trend queries
//!
//! Two disjoint name spaces: the wide snapshot table's curated column map
//! and the canonical-store metric catalogs. Snapshot names win on
//! collision (`weight` resolves to the imported scale weight, not the
//! vendor reading).

use crate::metrics;

/// A snapshot-backed entity: which column serves it and its unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotEntity {
    pub column: &'static str,
    pub unit: &'static str,
}

/// Curated entity → snapshot column map. Entity names are the public
/// query vocabulary and stay stable even if columns are renamed.
pub const SNAPSHOT_ENTITIES: &[(&str, SnapshotEntity)] = &[
    ("weight", SnapshotEntity { column: "weight_kg", unit: "kg" }),
    ("calories", SnapshotEntity { column: "calories_kcal", unit: "kcal" }),
    ("protein", SnapshotEntity { column: "protein_g", unit: "g" }),
    ("fat", SnapshotEntity { column: "fat_g", unit: "g" }),
    ("carbs", SnapshotEntity { column: "carbs_g", unit: "g" }),
    ("targetCaloriesKcal", SnapshotEntity { column: "target_calories_kcal", unit: "kcal" }),
    ("targetProtein", SnapshotEntity { column: "target_protein_g", unit: "g" }),
    ("targetFat", SnapshotEntity { column: "target_fat_g", unit: "g" }),
    ("targetCarbs", SnapshotEntity { column: "target_carbs_g", unit: "g" }),
    ("steps", SnapshotEntity { column: "step", unit: "step" }),
    ("alcohol", SnapshotEntity { column: "alcohol_g", unit: "g" }),
    ("b12Cobalamin", SnapshotEntity { column: "b12_cobalamin_mcg", unit: "mcg" }),
    ("b1Thiamine", SnapshotEntity { column: "b1_thiamine_mg", unit: "mg" }),
    ("b2Riboflavin", SnapshotEntity { column: "b2_riboflavin_mg", unit: "mg" }),
    ("b3Niacin", SnapshotEntity { column: "b3_niacin_mg", unit: "mg" }),
    ("b5PantothenicAcid", SnapshotEntity { column: "b5_pantothenic_acid_mg", unit: "mg" }),
    ("b6Pyridoxine", SnapshotEntity { column: "b6_pyridoxine_mg", unit: "mg" }),
    ("caffeine", SnapshotEntity { column: "caffeine_mg", unit: "mg" }),
    ("calcium", SnapshotEntity { column: "calcium_mg", unit: "mg" }),
    ("cholesterol", SnapshotEntity { column: "cholesterol_mg", unit: "mg" }),
    ("choline", SnapshotEntity { column: "choline_mg", unit: "mg" }),
    ("copper", SnapshotEntity { column: "copper_mg", unit: "mg" }),
    ("cysteine", SnapshotEntity { column: "cysteine_g", unit: "g" }),
    ("monounsaturatedFat", SnapshotEntity { column: "monounsaturated_fat_g", unit: "g" }),
    ("polyunsaturatedFat", SnapshotEntity { column: "polyunsaturated_fat_g", unit: "g" }),
    ("saturatedFat", SnapshotEntity { column: "saturated_fat_g", unit: "g" }),
    ("transFat", SnapshotEntity { column: "trans_fat_g", unit: "g" }),
    ("fiber", SnapshotEntity { column: "fiber_g", unit: "g" }),
    ("folate", SnapshotEntity { column: "folate_mcg", unit: "mcg" }),
    ("histidine", SnapshotEntity { column: "histidine_g", unit: "g" }),
    ("iron", SnapshotEntity { column: "iron_mg", unit: "mg" }),
    ("isoleucine", SnapshotEntity { column: "isoleucine_g", unit: "g" }),
    ("leucine", SnapshotEntity { column: "leucine_g", unit: "g" }),
    ("lysine", SnapshotEntity { column: "lysine_g", unit: "g" }),
    ("magnesium", SnapshotEntity { column: "magnesium_mg", unit: "mg" }),
    ("manganese", SnapshotEntity { column: "manganese_mg", unit: "mg" }),
    ("methionine", SnapshotEntity { column: "methionine_g", unit: "g" }),
    ("omega3Ala", SnapshotEntity { column: "omega3_ala_g", unit: "g" }),
    ("omega3Dha", SnapshotEntity { column: "omega3_dha_g", unit: "g" }),
    ("omega3Epa", SnapshotEntity { column: "omega3_epa_g", unit: "g" }),
    ("omega3", SnapshotEntity { column: "omega3_g", unit: "g" }),
    ("omega6", SnapshotEntity { column: "omega6_g", unit: "g" }),
    ("phenylalanine", SnapshotEntity { column: "phenylalanine_g", unit: "g" }),
    ("phosphorus", SnapshotEntity { column: "phosphorus_mg", unit: "mg" }),
    ("potassium", SnapshotEntity { column: "potassium_mg", unit: "mg" }),
    ("selenium", SnapshotEntity { column: "selenium_mcg", unit: "mcg" }),
    ("sodium", SnapshotEntity { column: "sodium_mg", unit: "mg" }),
    ("starch", SnapshotEntity { column: "starch_g", unit: "g" }),
    ("sugars", SnapshotEntity { column: "sugars_g", unit: "g" }),
    ("sugarsAdded", SnapshotEntity { column: "sugars_added_g", unit: "g" }),
    ("threonine", SnapshotEntity { column: "threonine_g", unit: "g" }),
    ("tryptophan", SnapshotEntity { column: "tryptophan_g", unit: "g" }),
    ("tyrosine", SnapshotEntity { column: "tyrosine_g", unit: "g" }),
    ("valine", SnapshotEntity { column: "valine_g", unit: "g" }),
    ("vitaminA", SnapshotEntity { column: "vitamin_a_mcg", unit: "mcg" }),
    ("vitaminC", SnapshotEntity { column: "vitamin_c_mg", unit: "mg" }),
    ("vitaminD", SnapshotEntity { column: "vitamin_d_mcg", unit: "mcg" }),
    ("vitaminE", SnapshotEntity { column: "vitamin_e_mg", unit: "mg" }),
    ("vitaminK", SnapshotEntity { column: "vitamin_k_mcg", unit: "mcg" }),
    ("water", SnapshotEntity { column: "water_g", unit: "g" }),
    ("zinc", SnapshotEntity { column: "zinc_mg", unit: "mg" }),
];

/// How a requested entity resolves against the two name spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedEntity {
    /// Wide-table column with its curated unit
    Snapshot(SnapshotEntity),
    /// Canonical-store metric with its catalog unit
    Metric(Option<&'static str>),
    /// Unknown to both curated maps: raw pass-through type query
    Raw,
}

/// Resolution order: snapshot map, then metric catalogs, then raw.
pub fn resolve(entity: &str) -> ResolvedEntity {
    if let Some((_, snapshot)) = SNAPSHOT_ENTITIES.iter().find(|(name, _)| *name == entity) {
        return ResolvedEntity::Snapshot(*snapshot);
    }
    if let Some(def) = metrics::def_for_key(entity) {
        return ResolvedEntity::Metric(def.unit);
    }
    ResolvedEntity::Raw
}
