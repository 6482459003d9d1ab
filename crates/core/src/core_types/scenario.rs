//! Scenario-level enumerations shared across the engine
//!
//! These are the coarse switches of the consumption model: which equation
//! family runs (natural vs. activity), which ecoregion's regression
//! coefficients apply, and how a measured 1000-hr fuel moisture should be
//! interpreted for activity burns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Equation family selector.
///
/// Natural burns (wildfire) and activity burns (prescribed fire on managed
/// units) share most strata equations but differ in how large woody fuels
/// and duff are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurnType {
    Natural,
    Activity,
}

/// Unrecognized burn type string.
#[derive(Debug, Clone, Error)]
#[error("unrecognized burn type `{0}` (expected `natural` or `activity`)")]
pub struct ParseBurnTypeError(pub String);

impl FromStr for BurnType {
    type Err = ParseBurnTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "natural" => Ok(BurnType::Natural),
            "activity" => Ok(BurnType::Activity),
            _ => Err(ParseBurnTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for BurnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurnType::Natural => write!(f, "natural"),
            BurnType::Activity => write!(f, "activity"),
        }
    }
}

/// Coarse climate/vegetation zone.
///
/// Selects among alternative regression coefficients, chiefly for the
/// forest-floor reduction equation and the natural woody percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecoregion {
    Western,
    Southern,
    Boreal,
}

/// Unrecognized ecoregion string.
#[derive(Debug, Clone, Error)]
#[error("unrecognized ecoregion `{0}` (expected `western`, `southern` or `boreal`)")]
pub struct ParseEcoregionError(pub String);

impl FromStr for Ecoregion {
    type Err = ParseEcoregionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "western" => Ok(Ecoregion::Western),
            "southern" => Ok(Ecoregion::Southern),
            "boreal" => Ok(Ecoregion::Boreal),
            _ => Err(ParseEcoregionError(s.to_string())),
        }
    }
}

impl fmt::Display for Ecoregion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ecoregion::Western => write!(f, "western"),
            Ecoregion::Southern => write!(f, "southern"),
            Ecoregion::Boreal => write!(f, "boreal"),
        }
    }
}

/// How the supplied 1000-hr fuel moisture was obtained (activity burns only).
///
/// The diameter-reduction regressions were fit against thermocouple-measured
/// moisture; adjusted and NFDRS-derived values get their own coefficient sets
/// and an additive correction before entering the equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelMoistureType {
    #[serde(rename = "MEAS-Th")]
    MeasTh,
    #[serde(rename = "ADJ-Th")]
    AdjTh,
    #[serde(rename = "NFDRS-Th")]
    NfdrsTh,
}

/// Unrecognized fuel-moisture-type string.
#[derive(Debug, Clone, Error)]
#[error("unrecognized fuel moisture type `{0}` (expected `MEAS-Th`, `ADJ-Th` or `NFDRS-Th`)")]
pub struct ParseFuelMoistureTypeError(pub String);

impl FromStr for FuelMoistureType {
    type Err = ParseFuelMoistureTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MEAS-TH" => Ok(FuelMoistureType::MeasTh),
            "ADJ-TH" => Ok(FuelMoistureType::AdjTh),
            "NFDRS-TH" => Ok(FuelMoistureType::NfdrsTh),
            _ => Err(ParseFuelMoistureTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for FuelMoistureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuelMoistureType::MeasTh => write!(f, "MEAS-Th"),
            FuelMoistureType::AdjTh => write!(f, "ADJ-Th"),
            FuelMoistureType::NfdrsTh => write!(f, "NFDRS-Th"),
        }
    }
}

/// Combustion stage of the consumed mass. `Total` is always the sum of the
/// other three and the four always appear in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombustionStage {
    Flaming,
    Smoldering,
    Residual,
    Total,
}

impl CombustionStage {
    /// Fixed presentation/indexing order.
    pub const ALL: [CombustionStage; 4] = [
        CombustionStage::Flaming,
        CombustionStage::Smoldering,
        CombustionStage::Residual,
        CombustionStage::Total,
    ];
}

impl fmt::Display for CombustionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombustionStage::Flaming => write!(f, "flaming"),
            CombustionStage::Smoldering => write!(f, "smoldering"),
            CombustionStage::Residual => write!(f, "residual"),
            CombustionStage::Total => write!(f, "total"),
        }
    }
}
