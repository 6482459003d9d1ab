//! Result assembly: named hierarchy and the flat 3-axis array view
//!
//! Consumption results are reported category -> sub-item -> combustion
//! stage. Category 0 of the array view is always the grand total; the six
//! mid-level groups follow, then the leaf strata. Every aggregate is built
//! bottom-up by elementwise summation of its constituents, so the
//! stage-sum and aggregate-sum identities hold by construction.

use crate::consumption::shared::{FuelGroup, Stratum};
#[cfg(test)]
use crate::consumption::shared::StageQuad;
use crate::consumption::woody::PileMix;
use crate::core_types::{BurnType, CombustionStage, ConsumptionUnit, FuelbedId};
use serde::{Deserialize, Serialize};

/// Four stage vectors over the scenario axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageVec {
    pub flaming: Vec<f64>,
    pub smoldering: Vec<f64>,
    pub residual: Vec<f64>,
    pub total: Vec<f64>,
}

impl StageVec {
    pub fn zeros(n: usize) -> StageVec {
        StageVec {
            flaming: vec![0.0; n],
            smoldering: vec![0.0; n],
            residual: vec![0.0; n],
            total: vec![0.0; n],
        }
    }

    /// Build from per-scenario quads; `total` is derived, never stored
    /// separately by the equations.
    #[cfg(test)]
    pub(crate) fn from_quads(quads: &[StageQuad]) -> StageVec {
        StageVec {
            flaming: quads.iter().map(|q| q.flaming).collect(),
            smoldering: quads.iter().map(|q| q.smoldering).collect(),
            residual: quads.iter().map(|q| q.residual).collect(),
            total: quads.iter().map(StageQuad::total).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    pub fn stage(&self, stage: CombustionStage) -> &[f64] {
        match stage {
            CombustionStage::Flaming => &self.flaming,
            CombustionStage::Smoldering => &self.smoldering,
            CombustionStage::Residual => &self.residual,
            CombustionStage::Total => &self.total,
        }
    }

    pub(crate) fn add_assign(&mut self, other: &StageVec) {
        debug_assert_eq!(self.len(), other.len());
        for (a, b) in self.flaming.iter_mut().zip(&other.flaming) {
            *a += b;
        }
        for (a, b) in self.smoldering.iter_mut().zip(&other.smoldering) {
            *a += b;
        }
        for (a, b) in self.residual.iter_mut().zip(&other.residual) {
            *a += b;
        }
        for (a, b) in self.total.iter_mut().zip(&other.total) {
            *a += b;
        }
    }

    pub(crate) fn scaled(&self, factor: f64) -> StageVec {
        StageVec {
            flaming: self.flaming.iter().map(|v| v * factor).collect(),
            smoldering: self.smoldering.iter().map(|v| v * factor).collect(),
            residual: self.residual.iter().map(|v| v * factor).collect(),
            total: self.total.iter().map(|v| v * factor).collect(),
        }
    }
}

/// One leaf stratum's consumption over the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumResult {
    pub stratum: Stratum,
    pub stages: StageVec,
}

/// One mid-level group's consumption over the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    pub group: FuelGroup,
    pub stages: StageVec,
}

/// Batch consumption results in the requested output units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionResults {
    pub units: ConsumptionUnit,
    pub burn_type: BurnType,
    /// Fuelbed per scenario; the emissions core resolves factor groups
    /// through these.
    pub fuelbeds: Vec<FuelbedId>,
    /// Cover type per scenario, for cover-type factor resolution.
    pub cover_type: Vec<i32>,
    /// Burned area per scenario, acres; kept for unit re-derivation and
    /// emissions reporting.
    pub area: Vec<f64>,
    /// Grand total over all strata.
    pub summary: StageVec,
    pub groups: Vec<GroupResult>,
    pub strata: Vec<StratumResult>,
    /// Thermal energy released, BTU, per stage.
    pub heat_release: StageVec,
    /// Clean/dirty/very-dirty pile shares per scenario, for the emissions
    /// core's pile factor weighting.
    pub pile_mix: Vec<PileMix>,
}

impl ConsumptionResults {
    pub fn n_scenarios(&self) -> usize {
        self.summary.len()
    }

    pub fn stratum(&self, stratum: Stratum) -> &StageVec {
        &self
            .strata
            .iter()
            .find(|s| s.stratum == stratum)
            .expect("all strata are always present")
            .stages
    }

    pub fn group(&self, group: FuelGroup) -> &StageVec {
        &self
            .groups
            .iter()
            .find(|g| g.group == group)
            .expect("all groups are always present")
            .stages
    }

    /// Flat 3-axis view `[category][stage][scenario]`. Category 0 is the
    /// grand total, categories 1..=6 the groups in fixed order, the rest
    /// the leaf strata in fixed order.
    pub fn to_array(&self) -> Vec<Vec<Vec<f64>>> {
        let mut out = Vec::with_capacity(1 + self.groups.len() + self.strata.len());
        let push = |out: &mut Vec<Vec<Vec<f64>>>, sv: &StageVec| {
            out.push(
                CombustionStage::ALL
                    .iter()
                    .map(|&st| sv.stage(st).to_vec())
                    .collect(),
            );
        };
        push(&mut out, &self.summary);
        for g in &self.groups {
            push(&mut out, &g.stages);
        }
        for s in &self.strata {
            push(&mut out, &s.stages);
        }
        out
    }

    /// Category labels aligned with [`ConsumptionResults::to_array`].
    pub fn category_labels(&self) -> Vec<&'static str> {
        let mut labels = vec!["summary"];
        labels.extend(self.groups.iter().map(|g| g.group.label()));
        labels.extend(self.strata.iter().map(|s| s.stratum.label()));
        labels
    }
}

/// Build the hierarchy from finished (expanded, unit-converted) leaf
/// strata vectors.
pub(crate) fn assemble(
    units: ConsumptionUnit,
    burn_type: BurnType,
    fuelbeds: Vec<FuelbedId>,
    cover_type: Vec<i32>,
    area: Vec<f64>,
    strata: Vec<(Stratum, StageVec)>,
    pile_mix: Vec<PileMix>,
) -> ConsumptionResults {
    let n = strata.first().map_or(0, |(_, sv)| sv.len());

    let mut groups: Vec<GroupResult> = FuelGroup::ALL
        .iter()
        .map(|&group| GroupResult {
            group,
            stages: StageVec::zeros(n),
        })
        .collect();
    let mut summary = StageVec::zeros(n);
    for (stratum, stages) in &strata {
        let gi = FuelGroup::ALL
            .iter()
            .position(|&g| g == stratum.group())
            .expect("stratum group is one of the six");
        groups[gi].stages.add_assign(stages);
        summary.add_assign(stages);
    }

    let heat_release = summary.scaled(units.btu_per_unit());

    ConsumptionResults {
        units,
        burn_type,
        fuelbeds,
        cover_type,
        area,
        summary,
        groups,
        strata: strata
            .into_iter()
            .map(|(stratum, stages)| StratumResult { stratum, stages })
            .collect(),
        heat_release,
        pile_mix,
    }
}
