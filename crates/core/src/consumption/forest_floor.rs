//! Forest-floor strata: litter, lichen, moss, duff, and the duff-derived
//! basal accumulations and squirrel middens
//!
//! One reduction budget (inches of consumable depth) is computed per
//! scenario from ecoregion and duff moisture, then spent stratum by stratum
//! in a fixed order: litter, lichen, moss, duff upper, duff lower. Each
//! stratum claims `min(own depth, remaining budget)` and only then converts
//! the claimed depth to mass through its bulk density and percent cover.
//! The order is load-bearing: later strata only ever see the remainder.
//!
//! Basal accumulations and squirrel middens do not claim from the budget;
//! their depth reduction scales proportionally with the duff reduction.

use crate::consumption::shared::{propcons, Csd, ScenarioConsumption, Stratum};
use crate::core_types::{DuffDeriv, Ecoregion, FuelLoading};

const LITTER_CSD: Csd = Csd(0.90, 0.10, 0.0);
const LICHEN_CSD: Csd = Csd(0.95, 0.05, 0.0);
const MOSS_CSD: Csd = Csd(0.95, 0.05, 0.0);
const DUFF_UPPER_CSD: Csd = Csd(0.10, 0.70, 0.20);
const DUFF_LOWER_CSD: Csd = Csd(0.0, 0.40, 0.60);
const BASAL_CSD: Csd = Csd(0.10, 0.40, 0.50);
const MIDDEN_CSD: Csd = Csd(0.05, 0.35, 0.60);

// Bulk densities, tons/acre per inch of depth.
const LICHEN_BULK_DENSITY: f64 = 0.5;
const MOSS_BULK_DENSITY: f64 = 0.9;
const BASAL_BULK_DENSITY: f64 = 8.0;
const MIDDEN_BULK_DENSITY: f64 = 5.5;
const SQ_FT_PER_ACRE: f64 = 43_560.0;

/// The per-scenario forest-floor reduction budget, consumed destructively.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FloorBudget {
    remaining: f64,
}

impl FloorBudget {
    pub fn new(inches: f64) -> FloorBudget {
        FloorBudget {
            remaining: inches.max(0.0),
        }
    }

    /// Claim up to `depth` inches; the claim never drives the budget
    /// negative and never exceeds the stratum's own depth.
    pub fn claim(&mut self, depth: f64) -> f64 {
        let claimed = depth.max(0.0).min(self.remaining);
        self.remaining -= claimed;
        claimed
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }
}

/// Total consumable forest-floor depth (inches) for a natural burn,
/// from the ecoregion-specific duff-moisture regression.
pub(crate) fn forest_floor_reduction(eco: Ecoregion, fm_duff: f64, ld: &FuelLoading) -> f64 {
    let ff_depth = ld.forest_floor_depth();
    if ff_depth <= 0.0 {
        return 0.0;
    }
    let reduction = match eco {
        Ecoregion::Boreal => ff_depth * propcons(1.2383 - 0.0114 * fm_duff),
        Ecoregion::Western => ff_depth * propcons(-0.8085 - 0.0213 * fm_duff + 1.0625 * ff_depth),
        Ecoregion::Southern => {
            let linear = -0.0061 * fm_duff + 0.6179 * ff_depth;
            if linear < 0.25 {
                // shallow/wet southern floors fall off an exponential tail
                // rather than going negative
                0.006181 * (0.398983 * (ff_depth - 0.00987 * fm_duff)).exp()
            } else {
                linear
            }
        }
    };
    reduction.clamp(0.0, ff_depth)
}

/// Depth claims of one scenario's successive reduction, kept for logging
/// and invariant checks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FloorClaims {
    pub budget: f64,
    pub litter: f64,
    pub lichen: f64,
    pub moss: f64,
    pub duff_upper: f64,
    pub duff_lower: f64,
    pub remaining: f64,
}

fn litter_bulk_density(ld: &FuelLoading) -> f64 {
    // Composition-weighted blend; falls back to a mixed-litter default when
    // the reference record carries no composition.
    let pairs = [
        (ld.litter_short_needle_pct, 0.9),
        (ld.litter_long_needle_pct, 1.2),
        (ld.litter_other_conifer_pct, 1.1),
        (ld.litter_broadleaf_pct, 0.8),
        (ld.litter_palm_pct, 0.7),
        (ld.litter_grass_pct, 0.5),
    ];
    let pct_sum: f64 = pairs.iter().map(|(p, _)| p).sum();
    if pct_sum <= 0.0 {
        return 1.0;
    }
    pairs.iter().map(|(p, bd)| p * bd).sum::<f64>() / pct_sum
}

fn duff_bulk_density(deriv: DuffDeriv) -> f64 {
    match deriv {
        DuffDeriv::Upper => 6.0,
        DuffDeriv::Lower => 8.8,
        DuffDeriv::UpperLower => 7.3,
        DuffDeriv::None => 5.5,
    }
}

/// Area fraction of the unit covered by per-stem circular features.
fn stem_area_fraction(density_per_acre: f64, radius_ft: f64) -> f64 {
    (density_per_acre * std::f64::consts::PI * radius_ft * radius_ft / SQ_FT_PER_ACRE).min(1.0)
}

/// Convert the claimed depths to consumed mass and fill the floor strata.
fn set_floor_masses(ld: &FuelLoading, claims: &FloorClaims, out: &mut ScenarioConsumption) {
    let cover = |pct: f64| (pct / 100.0).clamp(0.0, 1.0);

    out.set(
        Stratum::Litter,
        LITTER_CSD.distribute(claims.litter * litter_bulk_density(ld) * cover(ld.litter_pct_cover)),
    );
    out.set(
        Stratum::Lichen,
        LICHEN_CSD.distribute(claims.lichen * LICHEN_BULK_DENSITY * cover(ld.lichen_pct_cover)),
    );
    out.set(
        Stratum::Moss,
        MOSS_CSD.distribute(claims.moss * MOSS_BULK_DENSITY * cover(ld.moss_pct_cover)),
    );
    out.set(
        Stratum::DuffUpper,
        DUFF_UPPER_CSD.distribute(
            claims.duff_upper
                * duff_bulk_density(ld.duff_upper_deriv)
                * cover(ld.duff_upper_pct_cover),
        ),
    );
    out.set(
        Stratum::DuffLower,
        DUFF_LOWER_CSD.distribute(
            claims.duff_lower
                * duff_bulk_density(ld.duff_lower_deriv)
                * cover(ld.duff_lower_pct_cover),
        ),
    );

    // Basal accumulations and middens track the duff reduction fraction.
    let duff_depth = ld.duff_depth();
    let duff_frac = if duff_depth > 0.0 {
        (claims.duff_upper + claims.duff_lower) / duff_depth
    } else {
        0.0
    };
    let basal_red = duff_frac * ld.basal_accum_depth;
    out.set(
        Stratum::BasalAccumulation,
        BASAL_CSD.distribute(
            basal_red
                * BASAL_BULK_DENSITY
                * stem_area_fraction(ld.basal_accum_density, ld.basal_accum_radius),
        ),
    );
    let midden_red = duff_frac * ld.sq_midden_depth;
    out.set(
        Stratum::SquirrelMidden,
        MIDDEN_CSD.distribute(
            midden_red
                * MIDDEN_BULK_DENSITY
                * stem_area_fraction(ld.sq_midden_density, ld.sq_midden_radius),
        ),
    );
}

/// Natural-burn forest floor: spend the ecoregion budget in order.
///
/// Lichen and moss participate in the successive reduction in the western
/// and boreal ecoregions only; southern floors carry no appreciable lichen
/// or moss layer and skip straight to duff.
pub(crate) fn consume_forest_floor_natural(
    eco: Ecoregion,
    fm_duff: f64,
    ld: &FuelLoading,
    out: &mut ScenarioConsumption,
) -> FloorClaims {
    let budget = forest_floor_reduction(eco, fm_duff, ld);
    let mut b = FloorBudget::new(budget);
    let litter = b.claim(ld.litter_depth);
    let (lichen, moss) = if eco == Ecoregion::Southern {
        (0.0, 0.0)
    } else {
        (b.claim(ld.lichen_depth), b.claim(ld.moss_depth))
    };
    let duff_upper = b.claim(ld.duff_upper_depth);
    let duff_lower = b.claim(ld.duff_lower_depth);
    let claims = FloorClaims {
        budget,
        litter,
        lichen,
        moss,
        duff_upper,
        duff_lower,
        remaining: b.remaining(),
    };
    set_floor_masses(ld, &claims, out);
    claims
}

/// Activity-burn forest floor: the fine surface layers are consumed to
/// their full depth; duff reduction comes from the drying-period model
/// (computed upstream) and is allocated upper layer first.
pub(crate) fn consume_forest_floor_activity(
    eco: Ecoregion,
    duff_reduction: f64,
    ld: &FuelLoading,
    out: &mut ScenarioConsumption,
) -> FloorClaims {
    let litter = ld.litter_depth;
    let (lichen, moss) = if eco == Ecoregion::Southern {
        (0.0, 0.0)
    } else {
        (ld.lichen_depth, ld.moss_depth)
    };
    let duff_upper = duff_reduction.min(ld.duff_upper_depth);
    let duff_lower = (duff_reduction - duff_upper).min(ld.duff_lower_depth).max(0.0);
    let claims = FloorClaims {
        budget: litter + lichen + moss + duff_reduction,
        litter,
        lichen,
        moss,
        duff_upper,
        duff_lower,
        remaining: (duff_reduction - duff_upper - duff_lower).max(0.0),
    };
    set_floor_masses(ld, &claims, out);
    claims
}
