//! Emissions core: pollutant mass from consumption-by-stage
//!
//! Emission factors are lbs pollutant per ton of fuel consumed, two phases
//! per pollutant (flaming; smoldering and residual share one factor).
//! Factor groups are resolved per scenario through an injected provider,
//! either from the fuelbed's factor-group assignment or from its cover type.
//! Piles burn hotter and cleaner than broadcast fuels, so pile consumption
//! is pulled out of the totals, multiplied with its own split and a
//! cleanliness weighting, and added back at the end.

use crate::consumption::woody::PILE_CSD;
use crate::consumption::{FuelGroup, PileMix, Stratum};
use crate::core_types::{BurnType, ConsumptionUnit, FuelbedId, LookupError};
use crate::results::{ConsumptionResults, GroupResult, StageVec};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// Soil content raises particulate output; factor multipliers by pile
// cleanliness, weighted by the loading mix.
const PILE_CLEAN_MULT: f64 = 1.0;
const PILE_DIRTY_MULT: f64 = 1.2;
const PILE_VDIRTY_MULT: f64 = 1.4;

/// The reported pollutant species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "pm")]
    Pm,
    #[serde(rename = "pm10")]
    Pm10,
    #[serde(rename = "pm2.5")]
    Pm25,
    #[serde(rename = "co")]
    Co,
    #[serde(rename = "co2")]
    Co2,
    #[serde(rename = "ch4")]
    Ch4,
    #[serde(rename = "nmhc")]
    Nmhc,
}

impl Pollutant {
    pub const COUNT: usize = 7;

    pub const ALL: [Pollutant; Pollutant::COUNT] = [
        Pollutant::Pm,
        Pollutant::Pm10,
        Pollutant::Pm25,
        Pollutant::Co,
        Pollutant::Co2,
        Pollutant::Ch4,
        Pollutant::Nmhc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Pollutant::Pm => "pm",
            Pollutant::Pm10 => "pm10",
            Pollutant::Pm25 => "pm2.5",
            Pollutant::Co => "co",
            Pollutant::Co2 => "co2",
            Pollutant::Ch4 => "ch4",
            Pollutant::Nmhc => "nmhc",
        }
    }

    fn index(self) -> usize {
        match self {
            Pollutant::Pm => 0,
            Pollutant::Pm10 => 1,
            Pollutant::Pm25 => 2,
            Pollutant::Co => 3,
            Pollutant::Co2 => 4,
            Pollutant::Ch4 => 5,
            Pollutant::Nmhc => 6,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Two-phase multiplier for one pollutant, lbs per ton consumed. Residual
/// consumption reuses the smoldering factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseFactors {
    pub flaming: f64,
    pub smoldering_residual: f64,
}

/// One factor group's multipliers for every pollutant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactorSet {
    factors: [PhaseFactors; Pollutant::COUNT],
}

impl EmissionFactorSet {
    pub fn new(factors: [PhaseFactors; Pollutant::COUNT]) -> EmissionFactorSet {
        EmissionFactorSet { factors }
    }

    pub fn get(&self, pollutant: Pollutant) -> PhaseFactors {
        self.factors[pollutant.index()]
    }

    fn scaled(&self, factor: f64) -> EmissionFactorSet {
        EmissionFactorSet {
            factors: self.factors.map(|pf| PhaseFactors {
                flaming: pf.flaming * factor,
                smoldering_residual: pf.smoldering_residual * factor,
            }),
        }
    }
}

/// Identifier of an emission factor group in the reference database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EfGroupId(pub i32);

/// External contract: resolve factor groups and their multipliers.
pub trait EmissionFactorProvider {
    /// Factor group assigned to a fuelbed for the given burn type.
    fn group_for(&self, id: &FuelbedId, burn_type: BurnType) -> Result<EfGroupId, LookupError>;

    /// Factor group assigned to a cover type index.
    fn group_for_cover_type(&self, cover_type: i32) -> Result<EfGroupId, LookupError>;

    /// Per-pollutant multipliers of one group.
    fn factors(&self, group: EfGroupId) -> Result<EmissionFactorSet, LookupError>;
}

/// How factor groups are resolved. Selected once per calculation and applied
/// uniformly to every scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FactorMode {
    /// Per-fuelbed factor-group table lookup.
    Static,
    /// Cover-type-indexed lookup, every factor scaled by a fixed multiplier.
    CoverType { multiplier: f64 },
}

/// One pollutant's emissions over the batch, same category layout as the
/// consumption hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantResult {
    pub pollutant: Pollutant,
    /// Grand total over all fuel, piles included.
    pub summary: StageVec,
    pub groups: Vec<GroupResult>,
}

/// Batch emissions, lbs pollutant on the same area basis as the consumption
/// results they were derived from (absolute lbs for absolute consumption
/// units, lbs per area unit otherwise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsResults {
    /// Units the source consumption was expressed in.
    pub consumption_units: ConsumptionUnit,
    pub pollutants: Vec<PollutantResult>,
}

impl EmissionsResults {
    pub fn n_scenarios(&self) -> usize {
        self.pollutants
            .first()
            .map_or(0, |p| p.summary.len())
    }

    pub fn pollutant(&self, pollutant: Pollutant) -> &PollutantResult {
        self.pollutants
            .iter()
            .find(|p| p.pollutant == pollutant)
            .expect("all pollutants are always present")
    }
}

/// Multiply consumption-by-stage by emission factors for every pollutant.
///
/// Factor sets are fetched once per distinct group and cached for the
/// duration of the calculation.
pub fn compute_emissions(
    consumption: &ConsumptionResults,
    provider: &dyn EmissionFactorProvider,
    mode: FactorMode,
) -> Result<EmissionsResults, LookupError> {
    let n = consumption.n_scenarios();

    let mut cache: FxHashMap<EfGroupId, EmissionFactorSet> = FxHashMap::default();
    let mut sets: Vec<EmissionFactorSet> = Vec::with_capacity(n);
    for i in 0..n {
        let (group, scale) = match mode {
            FactorMode::Static => (
                provider.group_for(&consumption.fuelbeds[i], consumption.burn_type)?,
                1.0,
            ),
            FactorMode::CoverType { multiplier } => (
                provider.group_for_cover_type(consumption.cover_type[i])?,
                multiplier,
            ),
        };
        let base = match cache.get(&group) {
            Some(set) => *set,
            None => {
                let set = provider.factors(group)?;
                cache.insert(group, set);
                set
            }
        };
        sets.push(base.scaled(scale));
    }
    debug!(
        scenarios = n,
        factor_groups = cache.len(),
        mode = ?mode,
        "computing emissions batch"
    );

    // Consumption values carry the output unit's mass component; factors are
    // per ton, so bridge through the mass-in-tons factor.
    let mass_tons = consumption.units.mass_tons_factor();
    let piles = consumption.stratum(Stratum::Piles);

    let pollutants = Pollutant::ALL
        .iter()
        .map(|&pollutant| {
            let pile = pile_emissions(pollutant, piles, &consumption.pile_mix, &sets, mass_tons);

            let groups: Vec<GroupResult> = consumption
                .groups
                .iter()
                .map(|g| {
                    let stages = if g.group == FuelGroup::WoodyFuels {
                        // Piles leave the broadcast multiply and come back
                        // with their own factors.
                        let mut s = multiply(pollutant, &minus(&g.stages, piles), &sets, mass_tons);
                        s.add_assign(&pile);
                        s
                    } else {
                        multiply(pollutant, &g.stages, &sets, mass_tons)
                    };
                    GroupResult {
                        group: g.group,
                        stages,
                    }
                })
                .collect();

            let mut summary =
                multiply(pollutant, &minus(&consumption.summary, piles), &sets, mass_tons);
            summary.add_assign(&pile);

            PollutantResult {
                pollutant,
                summary,
                groups,
            }
        })
        .collect();

    Ok(EmissionsResults {
        consumption_units: consumption.units,
        pollutants,
    })
}

fn multiply(
    pollutant: Pollutant,
    consumption: &StageVec,
    sets: &[EmissionFactorSet],
    mass_tons: f64,
) -> StageVec {
    let phase = |values: &[f64], pick: fn(PhaseFactors) -> f64| {
        values
            .iter()
            .zip(sets)
            .map(|(&c, set)| c * mass_tons * pick(set.get(pollutant)))
            .collect::<Vec<f64>>()
    };
    let flaming = phase(&consumption.flaming, |pf| pf.flaming);
    let smoldering = phase(&consumption.smoldering, |pf| pf.smoldering_residual);
    let residual = phase(&consumption.residual, |pf| pf.smoldering_residual);
    let mut out = StageVec {
        flaming,
        smoldering,
        residual,
        total: Vec::new(),
    };
    out.total = derive_total(&out);
    out
}

/// Pile emissions: the pile total resplit 70/15/15, factors weighted by the
/// clean/dirty/very-dirty loading ratio.
fn pile_emissions(
    pollutant: Pollutant,
    piles: &StageVec,
    mix: &[PileMix],
    sets: &[EmissionFactorSet],
    mass_tons: f64,
) -> StageVec {
    let n = piles.len();
    let mut out = StageVec::zeros(n);
    for i in 0..n {
        let weight = mix[i].clean * PILE_CLEAN_MULT
            + mix[i].dirty * PILE_DIRTY_MULT
            + mix[i].vdirty * PILE_VDIRTY_MULT;
        let pf = sets[i].get(pollutant);
        let tons = piles.total[i] * mass_tons;
        out.flaming[i] = tons * PILE_CSD.0 * pf.flaming * weight;
        out.smoldering[i] = tons * PILE_CSD.1 * pf.smoldering_residual * weight;
        out.residual[i] = tons * PILE_CSD.2 * pf.smoldering_residual * weight;
        out.total[i] = out.flaming[i] + out.smoldering[i] + out.residual[i];
    }
    out
}

fn minus(a: &StageVec, b: &StageVec) -> StageVec {
    let sub = |x: &[f64], y: &[f64]| {
        x.iter()
            .zip(y)
            .map(|(a, b)| a - b)
            .collect::<Vec<f64>>()
    };
    StageVec {
        flaming: sub(&a.flaming, &b.flaming),
        smoldering: sub(&a.smoldering, &b.smoldering),
        residual: sub(&a.residual, &b.residual),
        total: sub(&a.total, &b.total),
    }
}

fn derive_total(sv: &StageVec) -> Vec<f64> {
    sv.flaming
        .iter()
        .zip(&sv.smoldering)
        .zip(&sv.residual)
        .map(|((f, s), r)| f + s + r)
        .collect()
}
