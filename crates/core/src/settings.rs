//! Scenario batch validation and broadcasting
//!
//! Callers hand the engine one value per fuelbed or a single value broadcast
//! to the whole batch, for every recognized parameter. Validation happens
//! once, here: afterwards every downstream component sees fixed-length
//! vectors only, with the activity-only extras present exactly when the burn
//! type is activity (a tagged union, not an optional grab-bag).
//!
//! Validation reports, it does not raise-and-stop: every offending value in
//! the batch is listed in the returned error, and nothing is clamped.

use crate::core_types::{
    BurnType, ConsumptionUnit, Ecoregion, FuelLoading, FuelMoistureType, FuelbedId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Sentinel canopy-consumption value meaning "use the fuelbed's own default".
pub const CANOPY_DEFAULT_SENTINEL: f64 = -1.0;

/// A parameter supplied either once for the whole batch or once per scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputVar<T> {
    Scalar(T),
    Vector(Vec<T>),
}

impl<T: Clone> InputVar<T> {
    /// Materialize to exactly `n` values. A wrong-length vector is recorded
    /// as a problem; a best-effort fill keeps later checks running so the
    /// caller sees every problem at once.
    fn materialize(&self, n: usize, parameter: &'static str, problems: &mut Vec<Problem>) -> Vec<T> {
        match self {
            InputVar::Scalar(v) => vec![v.clone(); n],
            InputVar::Vector(vs) if vs.len() == n => vs.clone(),
            InputVar::Vector(vs) if vs.len() == 1 => vec![vs[0].clone(); n],
            InputVar::Vector(vs) => {
                problems.push(Problem::LengthMismatch {
                    parameter,
                    actual: vs.len(),
                    expected: n,
                });
                match vs.first() {
                    Some(first) => vec![first.clone(); n],
                    None => Vec::new(),
                }
            }
        }
    }
}

/// Activity-burn parameters, in scalar-or-vector form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInput {
    /// 10-hr fuel moisture, percent.
    pub fm_10hr: InputVar<f64>,
    /// Slope, percent.
    pub slope: InputVar<f64>,
    /// Mid-flame windspeed, mph.
    pub windspeed: InputVar<f64>,
    /// Interpretation of the 1000-hr moisture value.
    pub fm_type: InputVar<FuelMoistureType>,
    /// Days since at least 0.25 in of rain.
    pub days_since_rain: InputVar<f64>,
    /// Length of ignition, minutes.
    pub length_of_ignition: InputVar<f64>,
}

/// Burn-type variant of a scenario batch. Activity burns carry six extra
/// parameters; natural burns carry none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "burn_type", rename_all = "lowercase")]
pub enum BurnInput {
    Natural,
    Activity(ActivityInput),
}

/// A complete scenario batch as supplied by the caller, prior to validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInput {
    /// One fuelbed id per scenario; defines the batch length N.
    pub fuelbeds: Vec<FuelbedId>,
    /// Burned area, acres.
    pub area: InputVar<f64>,
    pub ecoregion: InputVar<Ecoregion>,
    /// 1000-hr fuel moisture, percent.
    pub fm_1000hr: InputVar<f64>,
    /// Duff fuel moisture, percent.
    pub fm_duff: InputVar<f64>,
    /// Canopy consumption, percent; `-1` selects the fuelbed default.
    pub canopy_consumption_pct: InputVar<f64>,
    /// Percent of shrub cover blackened.
    pub shrub_blackened_pct: InputVar<f64>,
    /// Percent of pile loading blackened.
    pub pile_blackened_pct: InputVar<f64>,
    /// Requested output units.
    pub units: ConsumptionUnit,
    pub burn: BurnInput,
}

/// One validation finding. A failed validation carries every finding for the
/// batch, not just the first.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Problem {
    #[error("{parameter}[{position}] = {value} is outside [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        position: usize,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("parameter `{parameter}` has length {actual}; expected 1 or {expected}")]
    LengthMismatch {
        parameter: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("batch is empty: no fuelbed ids supplied")]
    EmptyBatch,
}

fn list_problems(problems: &[Problem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ")
}

/// Scenario parameters failed validation. Recoverable: fix the listed values
/// and resubmit the batch.
#[derive(Debug, Clone, Error)]
#[error("scenario validation failed:\n  {}", list_problems(problems))]
pub struct ValidationError {
    pub problems: Vec<Problem>,
}

/// Activity-burn parameters, validated and materialized to length N.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityParams {
    pub fm_10hr: Vec<f64>,
    pub slope: Vec<f64>,
    pub windspeed: Vec<f64>,
    pub fm_type: Vec<FuelMoistureType>,
    pub days_since_rain: Vec<f64>,
    pub length_of_ignition: Vec<f64>,
}

/// Burn-type variant of a validated batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BurnParams {
    Natural,
    Activity(ActivityParams),
}

/// A validated scenario batch: every vector has length N, every value is in
/// range, and the canopy sentinel has been resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBatch {
    pub fuelbeds: Vec<FuelbedId>,
    pub area: Vec<f64>,
    pub ecoregion: Vec<Ecoregion>,
    pub fm_1000hr: Vec<f64>,
    pub fm_duff: Vec<f64>,
    pub canopy_consumption_pct: Vec<f64>,
    pub shrub_blackened_pct: Vec<f64>,
    pub pile_blackened_pct: Vec<f64>,
    pub units: ConsumptionUnit,
    pub burn: BurnParams,
}

impl ScenarioBatch {
    pub fn len(&self) -> usize {
        self.fuelbeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fuelbeds.is_empty()
    }

    pub fn burn_type(&self) -> BurnType {
        match self.burn {
            BurnParams::Natural => BurnType::Natural,
            BurnParams::Activity(_) => BurnType::Activity,
        }
    }

    /// New batch containing only the given rows, in the given order. Used by
    /// the deduplicator to form the compressed batch.
    pub(crate) fn select(&self, rows: &[usize]) -> ScenarioBatch {
        let pick_f = |v: &Vec<f64>| rows.iter().map(|&r| v[r]).collect::<Vec<f64>>();
        ScenarioBatch {
            fuelbeds: rows.iter().map(|&r| self.fuelbeds[r].clone()).collect(),
            area: pick_f(&self.area),
            ecoregion: rows.iter().map(|&r| self.ecoregion[r]).collect(),
            fm_1000hr: pick_f(&self.fm_1000hr),
            fm_duff: pick_f(&self.fm_duff),
            canopy_consumption_pct: pick_f(&self.canopy_consumption_pct),
            shrub_blackened_pct: pick_f(&self.shrub_blackened_pct),
            pile_blackened_pct: pick_f(&self.pile_blackened_pct),
            units: self.units,
            burn: match &self.burn {
                BurnParams::Natural => BurnParams::Natural,
                BurnParams::Activity(a) => BurnParams::Activity(ActivityParams {
                    fm_10hr: pick_f(&a.fm_10hr),
                    slope: pick_f(&a.slope),
                    windspeed: pick_f(&a.windspeed),
                    fm_type: rows.iter().map(|&r| a.fm_type[r]).collect(),
                    days_since_rain: pick_f(&a.days_since_rain),
                    length_of_ignition: pick_f(&a.length_of_ignition),
                }),
            },
        }
    }
}

fn check_range(
    parameter: &'static str,
    values: &[f64],
    min: f64,
    max: f64,
    problems: &mut Vec<Problem>,
) {
    for (position, &value) in values.iter().enumerate() {
        // NaN comparisons are false, so NaN is always rejected here
        if !(min..=max).contains(&value) {
            problems.push(Problem::OutOfRange {
                parameter,
                position,
                value,
                min,
                max,
            });
        }
    }
}

impl ScenarioInput {
    /// Validate and materialize the batch.
    ///
    /// `loadings` must be aligned with `fuelbeds`; it supplies the per-fuelbed
    /// default substituted for the canopy-consumption `-1` sentinel before
    /// range checking.
    pub fn validate(&self, loadings: &[FuelLoading]) -> Result<ScenarioBatch, ValidationError> {
        let n = self.fuelbeds.len();
        let mut problems = Vec::new();
        if n == 0 {
            return Err(ValidationError {
                problems: vec![Problem::EmptyBatch],
            });
        }
        debug_assert_eq!(loadings.len(), n, "loadings not aligned with fuelbeds");

        let area = self.area.materialize(n, "area", &mut problems);
        let ecoregion = self.ecoregion.materialize(n, "ecoregion", &mut problems);
        let fm_1000hr = self.fm_1000hr.materialize(n, "fm_1000hr", &mut problems);
        let fm_duff = self.fm_duff.materialize(n, "fm_duff", &mut problems);
        let mut canopy = self
            .canopy_consumption_pct
            .materialize(n, "canopy_consumption_pct", &mut problems);
        let shrub_black = self
            .shrub_blackened_pct
            .materialize(n, "shrub_blackened_pct", &mut problems);
        let pile_black = self
            .pile_blackened_pct
            .materialize(n, "pile_blackened_pct", &mut problems);

        // Resolve the canopy default sentinel before range checking so a
        // bad default in the reference data is still caught.
        let mut substituted = 0usize;
        for (value, ld) in canopy.iter_mut().zip(loadings) {
            if *value == CANOPY_DEFAULT_SENTINEL {
                *value = ld.canopy_consumption_pct_default;
                substituted += 1;
            }
        }
        if substituted > 0 {
            debug!(substituted, "canopy consumption resolved from fuelbed defaults");
        }

        check_range("area", &area, f64::MIN_POSITIVE, 1_000_000.0, &mut problems);
        check_range("fm_1000hr", &fm_1000hr, 0.0, 140.0, &mut problems);
        check_range("fm_duff", &fm_duff, 0.0, 400.0, &mut problems);
        check_range("canopy_consumption_pct", &canopy, 0.0, 100.0, &mut problems);
        check_range("shrub_blackened_pct", &shrub_black, 0.0, 100.0, &mut problems);
        check_range("pile_blackened_pct", &pile_black, 0.0, 100.0, &mut problems);

        let burn = match &self.burn {
            BurnInput::Natural => BurnParams::Natural,
            BurnInput::Activity(a) => {
                let fm_10hr = a.fm_10hr.materialize(n, "fm_10hr", &mut problems);
                let slope = a.slope.materialize(n, "slope", &mut problems);
                let windspeed = a.windspeed.materialize(n, "windspeed", &mut problems);
                let fm_type = a.fm_type.materialize(n, "fm_type", &mut problems);
                let days_since_rain =
                    a.days_since_rain.materialize(n, "days_since_rain", &mut problems);
                let length_of_ignition =
                    a.length_of_ignition
                        .materialize(n, "length_of_ignition", &mut problems);

                check_range("fm_10hr", &fm_10hr, 0.0, 100.0, &mut problems);
                check_range("slope", &slope, 0.0, 100.0, &mut problems);
                check_range("windspeed", &windspeed, 0.0, 35.0, &mut problems);
                check_range("days_since_rain", &days_since_rain, 0.0, 365.0, &mut problems);
                check_range(
                    "length_of_ignition",
                    &length_of_ignition,
                    f64::MIN_POSITIVE,
                    10_000.0,
                    &mut problems,
                );

                BurnParams::Activity(ActivityParams {
                    fm_10hr,
                    slope,
                    windspeed,
                    fm_type,
                    days_since_rain,
                    length_of_ignition,
                })
            }
        };

        if problems.is_empty() {
            Ok(ScenarioBatch {
                fuelbeds: self.fuelbeds.clone(),
                area,
                ecoregion,
                fm_1000hr,
                fm_duff,
                canopy_consumption_pct: canopy,
                shrub_blackened_pct: shrub_black,
                pile_blackened_pct: pile_black,
                units: self.units,
                burn,
            })
        } else {
            Err(ValidationError { problems })
        }
    }
}
