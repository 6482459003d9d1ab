//! Fuelbed loading records and the external loading-provider contract
//!
//! A fuelbed is a standardized description of the vegetation and ground fuel
//! present at a site. The engine never reads the reference database itself;
//! a [`FuelLoadingProvider`] implementation (XML reader, test fixture, ...)
//! hands it one immutable [`FuelLoading`] record per requested fuelbed.
//!
//! Loadings are tons/acre, depths are inches, covers and live fractions are
//! percents, unless noted otherwise.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a fuelbed in the reference database (e.g. `"52"`, `"210"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuelbedId(pub String);

impl FuelbedId {
    pub fn new(id: impl Into<String>) -> Self {
        FuelbedId(id.into())
    }
}

impl std::fmt::Display for FuelbedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a duff layer's loading was derived in the reference data.
///
/// Selects the bulk density used to turn consumed duff depth into mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuffDeriv {
    /// Derived from upper-duff field measurements.
    Upper,
    /// Derived from lower-duff field measurements.
    Lower,
    /// Derived from a combined upper/lower profile.
    UpperLower,
    /// No derivation recorded; a conservative default density applies.
    #[default]
    None,
}

/// Per-fuelbed loading record fetched once per batch from the provider.
///
/// Field groups mirror the strata of the consumption equations: canopy,
/// shrub, nonwoody, litter/lichen/moss, ground fuels, and woody fuels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelLoading {
    // Canopy (tons/acre)
    pub overstory: f64,
    pub midstory: f64,
    pub understory: f64,
    pub snag1_foliage: f64,
    pub snag1_wood: f64,
    pub snag1_no_foliage: f64,
    pub snag2: f64,
    pub snag3: f64,
    pub ladder_fuels: f64,

    // Shrub (tons/acre; pct_live in percent)
    pub shrub_primary: f64,
    pub shrub_primary_pct_live: f64,
    pub shrub_secondary: f64,
    pub shrub_secondary_pct_live: f64,

    // Nonwoody / herbaceous (tons/acre; pct_live in percent)
    pub nonwoody_primary: f64,
    pub nonwoody_primary_pct_live: f64,
    pub nonwoody_secondary: f64,
    pub nonwoody_secondary_pct_live: f64,

    // Litter (depth inches, cover percent, composition percents sum to ~100)
    pub litter_depth: f64,
    pub litter_pct_cover: f64,
    pub litter_short_needle_pct: f64,
    pub litter_long_needle_pct: f64,
    pub litter_other_conifer_pct: f64,
    pub litter_broadleaf_pct: f64,
    pub litter_palm_pct: f64,
    pub litter_grass_pct: f64,

    // Lichen and moss (depth inches, cover percent)
    pub lichen_depth: f64,
    pub lichen_pct_cover: f64,
    pub moss_depth: f64,
    pub moss_pct_cover: f64,

    // Duff (depth inches, cover percent, derivation code)
    pub duff_upper_depth: f64,
    pub duff_upper_pct_cover: f64,
    pub duff_upper_deriv: DuffDeriv,
    pub duff_lower_depth: f64,
    pub duff_lower_pct_cover: f64,
    pub duff_lower_deriv: DuffDeriv,

    // Basal accumulations and squirrel middens
    /// Mean accumulation depth at tree bases (inches).
    pub basal_accum_depth: f64,
    /// Stems per acre carrying basal accumulations.
    pub basal_accum_density: f64,
    /// Mean accumulation radius around a stem (feet).
    pub basal_accum_radius: f64,
    /// Mean midden depth (inches).
    pub sq_midden_depth: f64,
    /// Middens per acre.
    pub sq_midden_density: f64,
    /// Mean midden radius (feet).
    pub sq_midden_radius: f64,

    // Downed woody by size class (tons/acre)
    pub one_hr_sound: f64,
    pub ten_hr_sound: f64,
    pub hun_hr_sound: f64,
    pub onek_hr_sound: f64,
    pub tenk_hr_sound: f64,
    pub tnkp_hr_sound: f64,
    pub onek_hr_rotten: f64,
    pub tenk_hr_rotten: f64,
    pub tnkp_hr_rotten: f64,

    // Stumps (tons/acre)
    pub stump_sound: f64,
    pub stump_rotten: f64,
    pub stump_lightered: f64,

    // Piles by cleanliness (tons/acre)
    pub pile_clean: f64,
    pub pile_dirty: f64,
    pub pile_vdirty: f64,

    /// Fuelbed's own default canopy consumption percent, substituted when the
    /// scenario passes the `-1` sentinel.
    pub canopy_consumption_pct_default: f64,
    /// Emission factor group for natural burns.
    pub efg_natural: i32,
    /// Emission factor group for activity burns.
    pub efg_activity: i32,
    /// Cover type index for cover-type-based emission factor resolution.
    pub cover_type: i32,
}

impl FuelLoading {
    /// Set one numeric field by its canonical name. Used by the customized
    /// loadings override; unknown names are rejected, not ignored.
    pub fn set_field(&mut self, name: &str, value: f64) -> Result<(), LookupError> {
        let slot: &mut f64 = match name {
            "overstory" => &mut self.overstory,
            "midstory" => &mut self.midstory,
            "understory" => &mut self.understory,
            "snag1_foliage" => &mut self.snag1_foliage,
            "snag1_wood" => &mut self.snag1_wood,
            "snag1_no_foliage" => &mut self.snag1_no_foliage,
            "snag2" => &mut self.snag2,
            "snag3" => &mut self.snag3,
            "ladder_fuels" => &mut self.ladder_fuels,
            "shrub_primary" => &mut self.shrub_primary,
            "shrub_primary_pct_live" => &mut self.shrub_primary_pct_live,
            "shrub_secondary" => &mut self.shrub_secondary,
            "shrub_secondary_pct_live" => &mut self.shrub_secondary_pct_live,
            "nonwoody_primary" => &mut self.nonwoody_primary,
            "nonwoody_primary_pct_live" => &mut self.nonwoody_primary_pct_live,
            "nonwoody_secondary" => &mut self.nonwoody_secondary,
            "nonwoody_secondary_pct_live" => &mut self.nonwoody_secondary_pct_live,
            "litter_depth" => &mut self.litter_depth,
            "litter_pct_cover" => &mut self.litter_pct_cover,
            "lichen_depth" => &mut self.lichen_depth,
            "lichen_pct_cover" => &mut self.lichen_pct_cover,
            "moss_depth" => &mut self.moss_depth,
            "moss_pct_cover" => &mut self.moss_pct_cover,
            "duff_upper_depth" => &mut self.duff_upper_depth,
            "duff_upper_pct_cover" => &mut self.duff_upper_pct_cover,
            "duff_lower_depth" => &mut self.duff_lower_depth,
            "duff_lower_pct_cover" => &mut self.duff_lower_pct_cover,
            "basal_accum_depth" => &mut self.basal_accum_depth,
            "basal_accum_density" => &mut self.basal_accum_density,
            "basal_accum_radius" => &mut self.basal_accum_radius,
            "sq_midden_depth" => &mut self.sq_midden_depth,
            "sq_midden_density" => &mut self.sq_midden_density,
            "sq_midden_radius" => &mut self.sq_midden_radius,
            "one_hr_sound" => &mut self.one_hr_sound,
            "ten_hr_sound" => &mut self.ten_hr_sound,
            "hun_hr_sound" => &mut self.hun_hr_sound,
            "onek_hr_sound" => &mut self.onek_hr_sound,
            "tenk_hr_sound" => &mut self.tenk_hr_sound,
            "tnkp_hr_sound" => &mut self.tnkp_hr_sound,
            "onek_hr_rotten" => &mut self.onek_hr_rotten,
            "tenk_hr_rotten" => &mut self.tenk_hr_rotten,
            "tnkp_hr_rotten" => &mut self.tnkp_hr_rotten,
            "stump_sound" => &mut self.stump_sound,
            "stump_rotten" => &mut self.stump_rotten,
            "stump_lightered" => &mut self.stump_lightered,
            "pile_clean" => &mut self.pile_clean,
            "pile_dirty" => &mut self.pile_dirty,
            "pile_vdirty" => &mut self.pile_vdirty,
            _ => return Err(LookupError::UnknownLoadingField(name.to_string())),
        };
        *slot = value;
        Ok(())
    }

    /// Combined duff profile depth (inches).
    pub fn duff_depth(&self) -> f64 {
        self.duff_upper_depth + self.duff_lower_depth
    }

    /// Combined forest-floor depth: litter + lichen + moss + duff (inches).
    pub fn forest_floor_depth(&self) -> f64 {
        self.litter_depth + self.lichen_depth + self.moss_depth + self.duff_depth()
    }
}

/// A user-supplied loading customization, applied to the fetched record of
/// one scenario before any calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingOverride {
    /// Scenario position in the batch (0-based).
    pub scenario: usize,
    /// Canonical field name, as accepted by [`FuelLoading::set_field`].
    pub field: String,
    pub value: f64,
}

/// Failures of the external reference-data providers.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("unknown fuelbed id(s): {}", .0.join(", "))]
    UnknownFuelbed(Vec<String>),
    #[error("unknown emission factor group {0}")]
    UnknownFactorGroup(i32),
    #[error("unknown loading field `{0}`")]
    UnknownLoadingField(String),
    #[error("loading override targets scenario {scenario} but batch has {len} scenarios")]
    OverrideOutOfBounds { scenario: usize, len: usize },
}

/// External contract: resolve fuelbed ids to loading records, in order.
///
/// Implementations fail with [`LookupError::UnknownFuelbed`] listing every
/// unknown id rather than stopping at the first.
pub trait FuelLoadingProvider {
    fn lookup(&self, ids: &[FuelbedId]) -> Result<Vec<FuelLoading>, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_field_rejects_unknown_names() {
        let mut ld = FuelLoading::default();
        ld.set_field("shrub_primary", 2.5).unwrap();
        assert_eq!(ld.shrub_primary, 2.5);
        let err = ld.set_field("shrub_primry", 2.5).unwrap_err();
        assert!(matches!(err, LookupError::UnknownLoadingField(_)));
    }

    #[test]
    fn depth_helpers_sum_layers() {
        let ld = FuelLoading {
            litter_depth: 1.0,
            lichen_depth: 0.25,
            moss_depth: 0.5,
            duff_upper_depth: 1.5,
            duff_lower_depth: 2.0,
            ..FuelLoading::default()
        };
        assert_eq!(ld.duff_depth(), 3.5);
        assert_eq!(ld.forest_floor_depth(), 5.25);
    }
}
