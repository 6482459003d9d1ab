//! The consumption engine: orchestration over the scenario axis
//!
//! The engine ties the pipeline together: fetch loadings, apply
//! customizations, validate/broadcast, deduplicate, evaluate the equation
//! family per unique run, expand back to original order, convert units, and
//! assemble the named hierarchy. Scenario columns are independent, so the
//! per-run evaluation parallelizes over the batch with rayon once the batch
//! is large enough to pay for it.

pub(crate) mod activity;
pub(crate) mod canopy;
pub(crate) mod forest_floor;
pub(crate) mod shared;
pub(crate) mod shrub_nonwoody;
pub(crate) mod woody;

pub use shared::{Csd, FuelGroup, StageQuad, Stratum};
pub use woody::PileMix;

use crate::core_types::{
    convert_slice, ConsumptionUnit, FuelLoading, FuelLoadingProvider, LoadingOverride, LookupError,
};
use crate::dedup::UniqueRunIndex;
use crate::results::{assemble, ConsumptionResults, StageVec};
use crate::settings::{BurnParams, ScenarioBatch, ScenarioInput, ValidationError};
use activity::ActivityEnv;
use rayon::prelude::*;
use shared::ScenarioConsumption;
use thiserror::Error;
use tracing::debug;

/// Batches below this size run serially; thread fan-out costs more than the
/// equations for a handful of scenarios.
const PARALLEL_THRESHOLD: usize = 32;

/// Failures of a whole engine invocation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Entry point for consumption calculations.
#[derive(Debug, Clone, Copy)]
pub struct ConsumptionEngine {
    dedup: bool,
}

impl Default for ConsumptionEngine {
    fn default() -> Self {
        ConsumptionEngine::new()
    }
}

impl ConsumptionEngine {
    /// Engine with batch deduplication enabled (the default).
    pub fn new() -> ConsumptionEngine {
        ConsumptionEngine { dedup: true }
    }

    /// Engine that recomputes every row. Produces bit-identical results to
    /// the default; exists for verification and pathological batches.
    pub fn without_dedup() -> ConsumptionEngine {
        ConsumptionEngine { dedup: false }
    }

    /// Evaluate consumption for a scenario batch.
    ///
    /// `overrides` customizes individual loading fields of individual
    /// scenarios after the provider lookup and before any calculation.
    pub fn compute(
        &self,
        input: &ScenarioInput,
        provider: &dyn FuelLoadingProvider,
        overrides: &[LoadingOverride],
    ) -> Result<ConsumptionResults, EngineError> {
        let n = input.fuelbeds.len();
        let mut loadings = provider.lookup(&input.fuelbeds)?;

        // Customized loadings: applied up front so validation (canopy
        // defaults) and deduplication both see the effective record.
        let mut forced_unique = Vec::new();
        for ov in overrides {
            if ov.scenario >= n {
                return Err(LookupError::OverrideOutOfBounds {
                    scenario: ov.scenario,
                    len: n,
                }
                .into());
            }
            loadings[ov.scenario].set_field(&ov.field, ov.value)?;
            if !forced_unique.contains(&ov.scenario) {
                forced_unique.push(ov.scenario);
            }
        }

        let batch = input.validate(&loadings)?;

        let index = if self.dedup {
            UniqueRunIndex::build(&batch, &forced_unique)
        } else {
            UniqueRunIndex::identity(n)
        };
        let reps = index.representatives();
        let unique_batch = batch.select(reps);
        let unique_loadings: Vec<FuelLoading> =
            reps.iter().map(|&r| loadings[r].clone()).collect();

        debug!(
            scenarios = n,
            unique_runs = reps.len(),
            burn_type = %batch.burn_type(),
            "computing consumption batch"
        );

        let k = reps.len();
        let runs: Vec<ScenarioConsumption> = if k >= PARALLEL_THRESHOLD {
            (0..k)
                .into_par_iter()
                .map(|i| compute_scenario(&unique_batch, &unique_loadings[i], i))
                .collect()
        } else {
            (0..k)
                .map(|i| compute_scenario(&unique_batch, &unique_loadings[i], i))
                .collect()
        };

        // Expand to original order, convert to the requested units, and
        // derive totals.
        let strata: Vec<(Stratum, StageVec)> = Stratum::ALL
            .iter()
            .map(|&stratum| {
                let expand_stage = |pick: fn(&StageQuad) -> f64| {
                    let unique: Vec<f64> =
                        runs.iter().map(|run| pick(&run.get(stratum))).collect();
                    let mut values = index.expand(&unique);
                    convert_slice(
                        &mut values,
                        ConsumptionUnit::TonsPerAcre,
                        batch.units,
                        &batch.area,
                    );
                    values
                };
                let flaming = expand_stage(|q| q.flaming);
                let smoldering = expand_stage(|q| q.smoldering);
                let residual = expand_stage(|q| q.residual);
                let total = flaming
                    .iter()
                    .zip(&smoldering)
                    .zip(&residual)
                    .map(|((f, s), r)| f + s + r)
                    .collect();
                (
                    stratum,
                    StageVec {
                        flaming,
                        smoldering,
                        residual,
                        total,
                    },
                )
            })
            .collect();

        let pile_mix = loadings.iter().map(PileMix::from_loading).collect();
        let cover_type = loadings.iter().map(|ld| ld.cover_type).collect();
        Ok(assemble(
            batch.units,
            batch.burn_type(),
            input.fuelbeds.clone(),
            cover_type,
            batch.area.clone(),
            strata,
            pile_mix,
        ))
    }
}

/// Evaluate every stratum equation for one scenario, in tons/acre.
fn compute_scenario(
    batch: &ScenarioBatch,
    ld: &FuelLoading,
    i: usize,
) -> ScenarioConsumption {
    let mut out = ScenarioConsumption::new();
    let eco = batch.ecoregion[i];

    canopy::consume_canopy(batch.canopy_consumption_pct[i], ld, &mut out);
    shrub_nonwoody::consume_shrub(batch.shrub_blackened_pct[i], ld, &mut out);
    shrub_nonwoody::consume_nonwoody(ld, &mut out);

    match &batch.burn {
        BurnParams::Natural => {
            forest_floor::consume_forest_floor_natural(eco, batch.fm_duff[i], ld, &mut out);
            woody::consume_woody_natural(eco, ld, &mut out);
        }
        BurnParams::Activity(a) => {
            let env = ActivityEnv {
                area: batch.area[i],
                fm_10hr: a.fm_10hr[i],
                fm_1000hr: batch.fm_1000hr[i],
                slope: a.slope[i],
                windspeed: a.windspeed[i],
                fm_type: a.fm_type[i],
                days_since_rain: a.days_since_rain[i],
                length_of_ignition: a.length_of_ignition[i],
            };
            activity::consume_woody_activity(&env, ld, &mut out);
            woody::consume_stumps(eco, ld, &mut out);
            let duff_reduction = activity::activity_duff_reduction(env.days_since_rain, ld);
            forest_floor::consume_forest_floor_activity(eco, duff_reduction, ld, &mut out);
        }
    }

    woody::consume_piles(batch.pile_blackened_pct[i], ld, &mut out);
    out
}
