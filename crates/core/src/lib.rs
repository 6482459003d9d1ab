//! Fuel consumption and emissions for wildland-fire fuelbed scenarios
//!
//! Implements a fixed empirical consumption equation set over batches of
//! scenarios: given per-fuelbed loading records and environmental inputs
//! (fuel moistures, wind, slope, canopy and shrub condition), the engine
//! estimates consumed mass per fuel stratum split into flaming, smoldering,
//! and residual combustion stages, plus heat release and pollutant
//! emissions.
//!
//! The pipeline: validate and broadcast scenario inputs, deduplicate
//! identical parameter rows, evaluate the natural or activity equation
//! family per unique row, expand back to the original order, convert units,
//! and assemble a named category hierarchy. Emissions multiply the finished
//! consumption-by-stage arrays by per-fuelbed two-phase factors.
//!
//! Reference data (fuelbed loadings, emission factor groups) comes from
//! injected provider traits; no databases are read here.

pub mod consumption;
pub mod core_types;
pub mod dedup;
pub mod emissions;
pub mod results;
pub mod settings;

pub use consumption::{ConsumptionEngine, EngineError, FuelGroup, PileMix, StageQuad, Stratum};
pub use core_types::{
    convert_slice, convert_value, BurnType, CombustionStage, ConsumptionUnit, Ecoregion,
    FuelLoading, FuelLoadingProvider, FuelMoistureType, FuelbedId, LoadingOverride, LookupError,
    UnitError, BTU_PER_TON,
};
pub use emissions::{
    compute_emissions, EfGroupId, EmissionFactorProvider, EmissionFactorSet, EmissionsResults,
    FactorMode, PhaseFactors, Pollutant, PollutantResult,
};
pub use results::{ConsumptionResults, GroupResult, StageVec, StratumResult};
pub use settings::{
    ActivityInput, BurnInput, InputVar, Problem, ScenarioInput, ValidationError,
    CANOPY_DEFAULT_SENTINEL,
};
