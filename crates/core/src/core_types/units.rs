//! Output unit family, conversion, and heat release
//!
//! The engine computes internally in tons/acre (the unit of the reference
//! loadings) and converts finished arrays to the requested member of a fixed
//! unit family. Conversion goes through canonical absolute tons: per-area
//! sources are multiplied out by the scenario area first, per-area targets
//! divided back down at the end.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const LBS_PER_TON: f64 = 2000.0;
const KG_PER_TON: f64 = 907.18474;
const KG_PER_TONNE: f64 = 1000.0;
const HECTARES_PER_ACRE: f64 = 0.40468564224;
const SQ_METERS_PER_ACRE: f64 = 4046.8564224;
const SQ_KM_PER_ACRE: f64 = 0.0040468564224;

/// Heat content of consumed fuel, BTU per ton (8,000 BTU/lb).
pub const BTU_PER_TON: f64 = 16_000_000.0;

/// The recognized mass and mass-per-area output units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumptionUnit {
    #[serde(rename = "lbs")]
    Lbs,
    #[serde(rename = "lbs_ac")]
    LbsPerAcre,
    #[serde(rename = "tons")]
    Tons,
    #[serde(rename = "tons_ac")]
    TonsPerAcre,
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "kg_m^2")]
    KgPerSqMeter,
    #[serde(rename = "kg_ha")]
    KgPerHectare,
    #[serde(rename = "kg_km^2")]
    KgPerSqKm,
    #[serde(rename = "tonnes")]
    Tonnes,
    #[serde(rename = "tonnes_ha")]
    TonnesPerHectare,
    #[serde(rename = "tonnes_km^2")]
    TonnesPerSqKm,
}

/// Unrecognized unit string; rejected before any conversion is attempted.
#[derive(Debug, Clone, Error)]
#[error("unrecognized units `{0}`")]
pub struct UnitError(pub String);

impl FromStr for ConsumptionUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lbs" => Ok(ConsumptionUnit::Lbs),
            "lbs_ac" => Ok(ConsumptionUnit::LbsPerAcre),
            "tons" => Ok(ConsumptionUnit::Tons),
            "tons_ac" => Ok(ConsumptionUnit::TonsPerAcre),
            "kg" => Ok(ConsumptionUnit::Kg),
            "kg_m^2" => Ok(ConsumptionUnit::KgPerSqMeter),
            "kg_ha" => Ok(ConsumptionUnit::KgPerHectare),
            "kg_km^2" => Ok(ConsumptionUnit::KgPerSqKm),
            "tonnes" => Ok(ConsumptionUnit::Tonnes),
            "tonnes_ha" => Ok(ConsumptionUnit::TonnesPerHectare),
            "tonnes_km^2" => Ok(ConsumptionUnit::TonnesPerSqKm),
            _ => Err(UnitError(s.to_string())),
        }
    }
}

impl fmt::Display for ConsumptionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConsumptionUnit::Lbs => "lbs",
            ConsumptionUnit::LbsPerAcre => "lbs_ac",
            ConsumptionUnit::Tons => "tons",
            ConsumptionUnit::TonsPerAcre => "tons_ac",
            ConsumptionUnit::Kg => "kg",
            ConsumptionUnit::KgPerSqMeter => "kg_m^2",
            ConsumptionUnit::KgPerHectare => "kg_ha",
            ConsumptionUnit::KgPerSqKm => "kg_km^2",
            ConsumptionUnit::Tonnes => "tonnes",
            ConsumptionUnit::TonnesPerHectare => "tonnes_ha",
            ConsumptionUnit::TonnesPerSqKm => "tonnes_km^2",
        };
        write!(f, "{s}")
    }
}

impl ConsumptionUnit {
    pub const ALL: [ConsumptionUnit; 11] = [
        ConsumptionUnit::Lbs,
        ConsumptionUnit::LbsPerAcre,
        ConsumptionUnit::Tons,
        ConsumptionUnit::TonsPerAcre,
        ConsumptionUnit::Kg,
        ConsumptionUnit::KgPerSqMeter,
        ConsumptionUnit::KgPerHectare,
        ConsumptionUnit::KgPerSqKm,
        ConsumptionUnit::Tonnes,
        ConsumptionUnit::TonnesPerHectare,
        ConsumptionUnit::TonnesPerSqKm,
    ];

    /// True for the mass-per-area members of the family.
    pub fn is_per_area(self) -> bool {
        self.area_per_acre().is_some()
    }

    /// Tons per one unit of this unit's mass component.
    fn mass_in_tons(self) -> f64 {
        match self {
            ConsumptionUnit::Lbs | ConsumptionUnit::LbsPerAcre => 1.0 / LBS_PER_TON,
            ConsumptionUnit::Tons | ConsumptionUnit::TonsPerAcre => 1.0,
            ConsumptionUnit::Kg
            | ConsumptionUnit::KgPerSqMeter
            | ConsumptionUnit::KgPerHectare
            | ConsumptionUnit::KgPerSqKm => 1.0 / KG_PER_TON,
            ConsumptionUnit::Tonnes
            | ConsumptionUnit::TonnesPerHectare
            | ConsumptionUnit::TonnesPerSqKm => KG_PER_TONNE / KG_PER_TON,
        }
    }

    /// This unit's area component expressed in acres, or `None` for absolute
    /// mass units.
    fn area_per_acre(self) -> Option<f64> {
        match self {
            ConsumptionUnit::LbsPerAcre | ConsumptionUnit::TonsPerAcre => Some(1.0),
            ConsumptionUnit::KgPerSqMeter => Some(1.0 / SQ_METERS_PER_ACRE),
            ConsumptionUnit::KgPerHectare | ConsumptionUnit::TonnesPerHectare => {
                Some(1.0 / HECTARES_PER_ACRE)
            }
            ConsumptionUnit::KgPerSqKm | ConsumptionUnit::TonnesPerSqKm => {
                Some(1.0 / SQ_KM_PER_ACRE)
            }
            _ => None,
        }
    }

    /// Heat released per unit mass of this unit (BTU). Depends only on the
    /// mass component, so `tons` and `tons_ac` share the same constant.
    pub fn btu_per_unit(self) -> f64 {
        BTU_PER_TON * self.mass_in_tons()
    }

    /// Tons per one unit of this unit's mass component. Emission factors
    /// are lbs pollutant per ton consumed; this bridges arbitrary output
    /// units back to that basis.
    pub fn mass_tons_factor(self) -> f64 {
        self.mass_in_tons()
    }
}

/// Convert one value between two members of the unit family.
///
/// `area_acres` is the scenario's burned area; it only participates when one
/// side of the conversion is per-area. `from == to` is an exact no-op.
pub fn convert_value(
    value: f64,
    from: ConsumptionUnit,
    to: ConsumptionUnit,
    area_acres: f64,
) -> f64 {
    if from == to {
        return value;
    }
    // Normalize to absolute tons.
    let mut tons = value * from.mass_in_tons();
    if let Some(apa) = from.area_per_acre() {
        // value was mass per `apa` acres of area
        tons *= area_acres / apa;
    }
    // Scale to the target.
    let mut out = tons / to.mass_in_tons();
    if let Some(apa) = to.area_per_acre() {
        out /= area_acres / apa;
    }
    out
}

/// Convert a scenario-axis slice in place, one area per scenario.
pub fn convert_slice(
    values: &mut [f64],
    from: ConsumptionUnit,
    to: ConsumptionUnit,
    area_acres: &[f64],
) {
    debug_assert_eq!(values.len(), area_acres.len());
    if from == to {
        return;
    }
    for (v, &area) in values.iter_mut().zip(area_acres) {
        *v = convert_value(*v, from, to, area);
    }
}
