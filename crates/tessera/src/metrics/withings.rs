//! Withings measurement type catalog
//!
//! The vendor identifies each measurement with an integer type code and
//! scales values with a base-10 unit exponent. Codes the product once
//! ingested but no longer does are kept as retired variants so that a
//! payload carrying one fails loudly as unsupported instead of falling
//! through to the unknown-code path.

use crate::error::{Result, TesseraError};
use crate::metrics::MetricDef;

/// Every Withings measure type code the catalog has ever covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureCode {
    Weight,
    Height,
    FatFreeMass,
    FatRatioPct,
    FatMassWeight,
    DiastolicBp,
    SystolicBp,
    MuscleMass,
    BoneMass,
    PulseWaveVelocity,
    VascularAge,
    NerveHealthScoreFeet,
    VisceralFat,
    // Retired: understood but no longer ingested.
    HeartPulse,
    Temperature,
    Spo2,
    BodyTemperature,
    SkinTemperature,
    Hydration,
    Vo2Max,
    AtrialFibrillation,
    QrsInterval,
    PrInterval,
    QtInterval,
    QtCorrectedInterval,
    AtrialFibrillationPpg,
    ExtracellularWater,
    IntracellularWater,
    FatFreeMassSegments,
    FatMassSegments,
    MuscleMassSegments,
    ElectrodermalActivityFeet,
    BasalMetabolicRate,
    MetabolicAge,
    SkinConductance,
}

impl MeasureCode {
    /// Decode a vendor type code. Unknown codes are a validation error:
    /// the allow-list defines what the system understands.
    pub fn from_code(code: i64) -> Result<Self> {
        let decoded = match code {
            1 => Self::Weight,
            4 => Self::Height,
            5 => Self::FatFreeMass,
            6 => Self::FatRatioPct,
            8 => Self::FatMassWeight,
            9 => Self::DiastolicBp,
            10 => Self::SystolicBp,
            11 => Self::HeartPulse,
            12 => Self::Temperature,
            54 => Self::Spo2,
            71 => Self::BodyTemperature,
            73 => Self::SkinTemperature,
            76 => Self::MuscleMass,
            77 => Self::Hydration,
            88 => Self::BoneMass,
            91 => Self::PulseWaveVelocity,
            123 => Self::Vo2Max,
            130 => Self::AtrialFibrillation,
            135 => Self::QrsInterval,
            136 => Self::PrInterval,
            137 => Self::QtInterval,
            138 => Self::QtCorrectedInterval,
            139 => Self::AtrialFibrillationPpg,
            155 => Self::VascularAge,
            167 => Self::NerveHealthScoreFeet,
            168 => Self::ExtracellularWater,
            169 => Self::IntracellularWater,
            170 => Self::VisceralFat,
            173 => Self::FatFreeMassSegments,
            174 => Self::FatMassSegments,
            175 => Self::MuscleMassSegments,
            196 => Self::ElectrodermalActivityFeet,
            226 => Self::BasalMetabolicRate,
            227 => Self::MetabolicAge,
            229 => Self::SkinConductance,
            other => {
                return Err(TesseraError::validation(format!(
                    "Unknown withings measure type code: {}",
                    other
                )))
            }
        };
        Ok(decoded)
    }

    /// The vendor-side integer for this code.
    pub fn code(self) -> i64 {
        match self {
            Self::Weight => 1,
            Self::Height => 4,
            Self::FatFreeMass => 5,
            Self::FatRatioPct => 6,
            Self::FatMassWeight => 8,
            Self::DiastolicBp => 9,
            Self::SystolicBp => 10,
            Self::HeartPulse => 11,
            Self::Temperature => 12,
            Self::Spo2 => 54,
            Self::BodyTemperature => 71,
            Self::SkinTemperature => 73,
            Self::MuscleMass => 76,
            Self::Hydration => 77,
            Self::BoneMass => 88,
            Self::PulseWaveVelocity => 91,
            Self::Vo2Max => 123,
            Self::AtrialFibrillation => 130,
            Self::QrsInterval => 135,
            Self::PrInterval => 136,
            Self::QtInterval => 137,
            Self::QtCorrectedInterval => 138,
            Self::AtrialFibrillationPpg => 139,
            Self::VascularAge => 155,
            Self::NerveHealthScoreFeet => 167,
            Self::ExtracellularWater => 168,
            Self::IntracellularWater => 169,
            Self::VisceralFat => 170,
            Self::FatFreeMassSegments => 173,
            Self::FatMassSegments => 174,
            Self::MuscleMassSegments => 175,
            Self::ElectrodermalActivityFeet => 196,
            Self::BasalMetabolicRate => 226,
            Self::MetabolicAge => 227,
            Self::SkinConductance => 229,
        }
    }

    /// Canonical definition for active codes; `None` for retired codes.
    pub fn def(self) -> Option<&'static MetricDef> {
        let def = match self {
            Self::Weight => &MetricDef {
                key: "weight",
                label: "Weight (kg)",
                unit: Some("kg"),
            },
            Self::Height => &MetricDef {
                key: "height",
                label: "Height (meter)",
                unit: Some("m"),
            },
            Self::FatFreeMass => &MetricDef {
                key: "fat_free_mass",
                label: "Fat Free Mass (kg)",
                unit: Some("kg"),
            },
            Self::FatRatioPct => &MetricDef {
                key: "fat_ratio_pct",
                label: "Fat Ratio (%)",
                unit: Some("%"),
            },
            Self::FatMassWeight => &MetricDef {
                key: "fat_mass_weight",
                label: "Fat Mass Weight (kg)",
                unit: Some("kg"),
            },
            Self::DiastolicBp => &MetricDef {
                key: "diastolic_bp",
                label: "Diastolic Blood Pressure (mmHg)",
                unit: Some("mmHg"),
            },
            Self::SystolicBp => &MetricDef {
                key: "systolic_bp",
                label: "Systolic Blood Pressure (mmHg)",
                unit: Some("mmHg"),
            },
            Self::MuscleMass => &MetricDef {
                key: "muscle_mass",
                label: "Muscle Mass (kg)",
                unit: Some("kg"),
            },
            Self::BoneMass => &MetricDef {
                key: "bone_mass",
                label: "Bone Mass (kg)",
                unit: Some("kg"),
            },
            Self::PulseWaveVelocity => &MetricDef {
                key: "pulse_wave_velocity",
                label: "Pulse Wave Velocity (m/s)",
                unit: Some("m/s"),
            },
            Self::VascularAge => &MetricDef {
                key: "vascular_age",
                label: "Vascular age",
                unit: Some("years"),
            },
            Self::NerveHealthScoreFeet => &MetricDef {
                key: "nerve_health_score_feet",
                label: "Nerve Health Score Conductance 2 electrodes Feet",
                unit: None,
            },
            Self::VisceralFat => &MetricDef {
                key: "visceral_fat",
                label: "Visceral Fat (without unity)",
                unit: None,
            },
            _ => return None,
        };
        Some(def)
    }

    pub fn is_retired(self) -> bool {
        self.def().is_none()
    }
}

/// Active codes, in the order they are requested from the vendor.
pub const ACTIVE: &[MeasureCode] = &[
    MeasureCode::Weight,
    MeasureCode::Height,
    MeasureCode::FatFreeMass,
    MeasureCode::FatRatioPct,
    MeasureCode::FatMassWeight,
    MeasureCode::DiastolicBp,
    MeasureCode::SystolicBp,
    MeasureCode::MuscleMass,
    MeasureCode::BoneMass,
    MeasureCode::PulseWaveVelocity,
    MeasureCode::VascularAge,
    MeasureCode::NerveHealthScoreFeet,
    MeasureCode::VisceralFat,
];

/// Comma-separated code list for the vendor's `meastypes` query parameter.
pub fn meastypes_param() -> String {
    ACTIVE
        .iter()
        .map(|c| c.code().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Iterate the canonical keys of all active codes.
pub fn active_keys() -> impl Iterator<Item = &'static str> {
    ACTIVE.iter().filter_map(|c| c.def()).map(|d| d.key)
}

/// Look up the definition for a canonical key.
pub fn def_for_key(type_key: &str) -> Option<&'static MetricDef> {
    ACTIVE
        .iter()
        .filter_map(|c| c.def())
        .find(|d| d.key == type_key)
}
