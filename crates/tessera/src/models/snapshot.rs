use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Declares the wide per-day nutrition table once: struct fields, SQL
/// column names, and by-column access all stay in sync.
macro_rules! snapshot_columns {
    ($($field:ident => $col:literal),+ $(,)?) => {
        /// One calendar day of imported nutrition data (wide row).
        ///
        /// Keyed by `date` alone; re-importing a day overwrites the whole
        /// row rather than merging field by field.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct DailySnapshot {
            pub date: NaiveDate,
            $(
                #[serde(default)]
                pub $field: Option<f64>,
            )+
            #[serde(default)]
            pub raw: Option<serde_json::Value>,
        }

        impl DailySnapshot {
            /// SQL column names of the numeric payload, in declaration order.
            pub const COLUMNS: &'static [&'static str] = &[$($col),+];

            /// Numeric payload values in the same order as [`Self::COLUMNS`].
            pub fn values(&self) -> Vec<Option<f64>> {
                vec![$(self.$field),+]
            }

            /// Value of a single payload column by SQL name.
            pub fn value(&self, column: &str) -> Option<f64> {
                match column {
                    $($col => self.$field,)+
                    _ => None,
                }
            }
        }
    };
}

snapshot_columns! {
    expenditure => "expenditure",
    trend_weight_kg => "trend_weight_kg",
    weight_kg => "weight_kg",
    calories_kcal => "calories_kcal",
    protein_g => "protein_g",
    fat_g => "fat_g",
    carbs_g => "carbs_g",
    target_calories_kcal => "target_calories_kcal",
    target_protein_g => "target_protein_g",
    target_fat_g => "target_fat_g",
    target_carbs_g => "target_carbs_g",
    steps => "step",
    alcohol_g => "alcohol_g",
    b12_cobalamin_mcg => "b12_cobalamin_mcg",
    b1_thiamine_mg => "b1_thiamine_mg",
    b2_riboflavin_mg => "b2_riboflavin_mg",
    b3_niacin_mg => "b3_niacin_mg",
    b5_pantothenic_acid_mg => "b5_pantothenic_acid_mg",
    b6_pyridoxine_mg => "b6_pyridoxine_mg",
    caffeine_mg => "caffeine_mg",
    calcium_mg => "calcium_mg",
    cholesterol_mg => "cholesterol_mg",
    choline_mg => "choline_mg",
    copper_mg => "copper_mg",
    cysteine_g => "cysteine_g",
    monounsaturated_fat_g => "monounsaturated_fat_g",
    polyunsaturated_fat_g => "polyunsaturated_fat_g",
    saturated_fat_g => "saturated_fat_g",
    trans_fat_g => "trans_fat_g",
    fiber_g => "fiber_g",
    folate_mcg => "folate_mcg",
    histidine_g => "histidine_g",
    iron_mg => "iron_mg",
    isoleucine_g => "isoleucine_g",
    leucine_g => "leucine_g",
    lysine_g => "lysine_g",
    magnesium_mg => "magnesium_mg",
    manganese_mg => "manganese_mg",
    methionine_g => "methionine_g",
    omega3_ala_g => "omega3_ala_g",
    omega3_dha_g => "omega3_dha_g",
    omega3_epa_g => "omega3_epa_g",
    omega3_g => "omega3_g",
    omega6_g => "omega6_g",
    phenylalanine_g => "phenylalanine_g",
    phosphorus_mg => "phosphorus_mg",
    potassium_mg => "potassium_mg",
    selenium_mcg => "selenium_mcg",
    sodium_mg => "sodium_mg",
    starch_g => "starch_g",
    sugars_g => "sugars_g",
    sugars_added_g => "sugars_added_g",
    threonine_g => "threonine_g",
    tryptophan_g => "tryptophan_g",
    tyrosine_g => "tyrosine_g",
    valine_g => "valine_g",
    vitamin_a_mcg => "vitamin_a_mcg",
    vitamin_c_mg => "vitamin_c_mg",
    vitamin_d_mcg => "vitamin_d_mcg",
    vitamin_e_mg => "vitamin_e_mg",
    vitamin_k_mcg => "vitamin_k_mcg",
    water_g => "water_g",
    zinc_mg => "zinc_mg",
}
