//! Shared leaf types of the consumption and emissions engine

pub mod fuelbed;
pub mod scenario;
pub mod units;

pub use fuelbed::{
    DuffDeriv, FuelLoading, FuelLoadingProvider, FuelbedId, LoadingOverride, LookupError,
};
pub use scenario::{
    BurnType, CombustionStage, Ecoregion, FuelMoistureType, ParseBurnTypeError,
    ParseEcoregionError, ParseFuelMoistureTypeError,
};
pub use units::{convert_slice, convert_value, ConsumptionUnit, UnitError, BTU_PER_TON};
