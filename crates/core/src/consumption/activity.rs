//! Activity-burn woody consumption: the diameter-reduction chain
//!
//! Activity burns estimate large-wood consumption through a chain of
//! corrections rather than flat percentages:
//!
//! 1. percent consumption of 100-hr fuels, from a heat-flux correction that
//!    shifts the measured 10-hr moisture and a piecewise curve;
//! 2. a diameter reduction (inches) for large wood, from spring/summer
//!    regressions blended across the 100-hr transition band, with
//!    high-moisture overrides and an intensity reduction factor;
//! 3. quadratic-mean-diameter volume reductions for the 1000-hr and
//!    10,000-hr classes, a moisture-band table for 10,000-hr+ fuels, and a
//!    flaming split from the 100-hr load intensity curve.
//!
//! Duff reduction under activity burns uses a drying-period model driven by
//! days since significant rainfall, implemented here and consumed by the
//! forest-floor module.

use crate::consumption::shared::{ScenarioConsumption, StageQuad, Stratum};
use crate::consumption::woody::{clamp_flaming, ONE_HR_CSD, TEN_HR_CSD};
use crate::core_types::{FuelLoading, FuelMoistureType};

/// Default 100-hr loading the heat-flux regression was calibrated against
/// (tons/acre).
const DEFAULT_HUN_HR_LOAD: f64 = 4.8;

/// Adjusted 10-hr moisture above which the percent curve turns cubic.
const ADJ_FM10_BREAK: f64 = 18.0;
/// Adjusted 10-hr moisture at which 100-hr consumption reaches zero.
const ADJ_FM10_EXTINCTION: f64 = 40.0;

/// Transition band of 100-hr percent consumption across which the spring
/// and summer diameter-reduction regressions are blended.
const SPRING_MAX: f64 = 0.75;
const SUMMER_MIN: f64 = 0.85;

// Quadratic mean diameters, inches, per size class and condition.
const QMD_ONEK_SOUND: f64 = 6.68;
const QMD_TENK_SOUND: f64 = 13.7;
const QMD_ONEK_ROTTEN: f64 = 5.2;
const QMD_TENK_ROTTEN: f64 = 10.8;

/// Per-scenario activity parameters after broadcast, one scenario's worth.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActivityEnv {
    pub area: f64,
    pub fm_10hr: f64,
    pub fm_1000hr: f64,
    pub slope: f64,
    pub windspeed: f64,
    pub fm_type: FuelMoistureType,
    pub days_since_rain: f64,
    pub length_of_ignition: f64,
}

/// Carried-forward outputs of the diameter-reduction step; the adjusted
/// 1000-hr moisture also keys the 10,000-hr+ band table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ActivityDiagnostics {
    pub adj_fm_1000hr: f64,
    pub diam_reduction: f64,
}

/// Percent (0..=1) of the 100-hr class consumed.
///
/// The heat-flux correction scales with how much heavier than default the
/// 100-hr bed is and with slope and wind, then shifts the measured 10-hr
/// moisture logarithmically. The shifted moisture maps through a curve that
/// is linear below [`ADJ_FM10_BREAK`] and cubic above it, clipped to [0, 1].
pub(crate) fn hundred_hr_pct(env: &ActivityEnv, ld: &FuelLoading) -> f64 {
    let heat_flux = (ld.hun_hr_sound / DEFAULT_HUN_HR_LOAD)
        * (1.0 + (env.slope - 20.0) / 60.0 + env.windspeed / 4.0);
    let correction = if heat_flux > 0.0 {
        3.0 * heat_flux.ln()
    } else {
        0.0
    };
    let adj_fm10 = env.fm_10hr - correction;

    let pct = if adj_fm10 < ADJ_FM10_BREAK {
        0.9 - 0.0535 * (adj_fm10 - 12.0)
    } else if adj_fm10 < ADJ_FM10_EXTINCTION {
        // cubic tail, continuous with the linear branch at the break point
        let span = ADJ_FM10_EXTINCTION - ADJ_FM10_BREAK;
        let at_break = 0.9 - 0.0535 * (ADJ_FM10_BREAK - 12.0);
        at_break * ((ADJ_FM10_EXTINCTION - adj_fm10) / span).powi(3)
    } else {
        0.0
    };
    pct.clamp(0.0, 1.0)
}

/// Spring and summer regression lines (slope, intercept) and the additive
/// 1000-hr moisture adjustment, per fuel-moisture type.
fn fm_type_coefficients(fm_type: FuelMoistureType) -> ((f64, f64), (f64, f64), f64) {
    match fm_type {
        FuelMoistureType::MeasTh => ((-0.097, 4.747), (-0.108, 5.68), 0.0),
        FuelMoistureType::AdjTh => ((-0.096, 4.6495), (-0.1053, 5.5104), 3.0),
        FuelMoistureType::NfdrsTh => ((-0.0762, 4.371), (-0.1228, 6.1056), 6.0),
    }
}

/// Intensity reduction factor from the three-tier burn classification.
///
/// A burn counts as mass ignition when the whole unit is lit in under a
/// quarter minute per acre. The tiers are evaluated in fixed priority order
/// and are mutually exclusive by construction of the chain.
pub(crate) fn intensity_reduction_factor(env: &ActivityEnv) -> f64 {
    let minutes_per_acre = env.length_of_ignition / env.area;
    let mass_ignition = minutes_per_acre <= 0.25;
    if mass_ignition && env.fm_10hr >= 15.0 && env.fm_1000hr >= 50.0 {
        2.0 / 3.0
    } else if mass_ignition && env.fm_10hr >= 15.0 {
        0.78
    } else if mass_ignition {
        0.89
    } else {
        1.0
    }
}

/// Diameter reduction (inches) for large woody fuels.
pub(crate) fn diameter_reduction(env: &ActivityEnv, pct_hun_hr: f64) -> ActivityDiagnostics {
    let ((m_spring, b_spring), (m_summer, b_summer), fm_adjust) =
        fm_type_coefficients(env.fm_type);
    let adj_fm_1000hr = env.fm_1000hr + fm_adjust;

    let spring = (m_spring * adj_fm_1000hr + b_spring).max(0.0);
    let summer = (m_summer * adj_fm_1000hr + b_summer).max(0.0);
    let blended = if pct_hun_hr <= SPRING_MAX {
        spring
    } else if pct_hun_hr >= SUMMER_MIN {
        summer
    } else {
        let t = (pct_hun_hr - SPRING_MAX) / (SUMMER_MIN - SPRING_MAX);
        spring + t * (summer - spring)
    };

    // High-moisture overrides supersede the seasonal blend entirely.
    let seasonal = if (44.0..60.0).contains(&adj_fm_1000hr) {
        -0.0178 * adj_fm_1000hr + 1.489
    } else if adj_fm_1000hr >= 60.0 {
        (-0.005 * adj_fm_1000hr + 0.731).max(0.0)
    } else {
        blended
    };

    let intensity_factor = intensity_reduction_factor(env);
    ActivityDiagnostics {
        adj_fm_1000hr,
        diam_reduction: (seasonal * intensity_factor).max(0.0),
    }
}

/// Percent volume consumed for a QMD class given a diameter reduction.
fn qmd_pct_volume(qmd: f64, diam_reduction: f64) -> f64 {
    let dr = diam_reduction.min(qmd);
    1.0 - ((qmd - dr) / qmd).powi(2)
}

/// 10,000-hr+ percent consumption from 1000-hr moisture bands.
fn tnkp_pct(adj_fm_1000hr: f64, rotten: bool) -> f64 {
    let sound: f64 = if adj_fm_1000hr < 31.0 {
        0.33
    } else if adj_fm_1000hr < 45.0 {
        0.20
    } else if adj_fm_1000hr < 60.0 {
        0.10
    } else {
        0.0
    };
    if rotten {
        (sound + 0.12).min(1.0)
    } else {
        sound
    }
}

/// Flaming share of consumed large wood: an exponential decay in total
/// 100-hr load (heavier beds burn longer past the flaming front).
pub(crate) fn flaming_fraction(hun_hr_load: f64) -> f64 {
    0.60 * (-hun_hr_load / 10.0).exp()
}

fn split_large_wood(consumed: f64, flaming_frac: f64, smold_share: f64) -> StageQuad {
    let flaming = consumed * flaming_frac;
    let rest = consumed - flaming;
    clamp_flaming(
        StageQuad {
            flaming,
            smoldering: rest * smold_share,
            residual: rest * (1.0 - smold_share),
        },
        consumed,
    )
}

/// Fill the woody strata for one activity-burn scenario (piles and stumps
/// are handled by the shared woody module).
pub(crate) fn consume_woody_activity(
    env: &ActivityEnv,
    ld: &FuelLoading,
    out: &mut ScenarioConsumption,
) -> ActivityDiagnostics {
    // Fine fuels in cured slash consume completely.
    out.set(Stratum::OneHr, ONE_HR_CSD.distribute(ld.one_hr_sound));
    out.set(Stratum::TenHr, TEN_HR_CSD.distribute(ld.ten_hr_sound));

    let pct_hun = hundred_hr_pct(env, ld);
    let diag = diameter_reduction(env, pct_hun);
    let g = flaming_fraction(ld.hun_hr_sound);

    // 100-hr: percent consumption from the moisture curve.
    out.set(
        Stratum::HunHr,
        split_large_wood(ld.hun_hr_sound * pct_hun, (g + 0.3).min(1.0), 0.70),
    );

    // 1000-hr and 10,000-hr: QMD volume reduction from diameter reduction.
    let dr = diag.diam_reduction;
    out.set(
        Stratum::OneKSound,
        split_large_wood(ld.onek_hr_sound * qmd_pct_volume(QMD_ONEK_SOUND, dr), g, 0.50),
    );
    out.set(
        Stratum::TenKSound,
        split_large_wood(ld.tenk_hr_sound * qmd_pct_volume(QMD_TENK_SOUND, dr), g, 0.50),
    );
    out.set(
        Stratum::OneKRotten,
        split_large_wood(
            ld.onek_hr_rotten * qmd_pct_volume(QMD_ONEK_ROTTEN, dr),
            g * 0.5,
            0.30,
        ),
    );
    out.set(
        Stratum::TenKRotten,
        split_large_wood(
            ld.tenk_hr_rotten * qmd_pct_volume(QMD_TENK_ROTTEN, dr),
            g * 0.5,
            0.30,
        ),
    );

    // 10,000-hr+: direct table lookup by 1000-hr moisture band.
    out.set(
        Stratum::TnkpSound,
        split_large_wood(
            ld.tnkp_hr_sound * tnkp_pct(diag.adj_fm_1000hr, false),
            g,
            0.40,
        ),
    );
    out.set(
        Stratum::TnkpRotten,
        split_large_wood(
            ld.tnkp_hr_rotten * tnkp_pct(diag.adj_fm_1000hr, true),
            g * 0.5,
            0.30,
        ),
    );
    diag
}

/// Duff reduction (inches) for activity burns: a drying-period model.
///
/// The duff profile dries from the top; the days-since-rain count is
/// compared against two depth-scaled thresholds. Reduction blends
/// continuously across the moist transition, then climbs linearly to the
/// dry regime. Shallow profiles (<= 0.5 in) reduce proportionally less and
/// the result never exceeds the total duff depth.
pub(crate) fn activity_duff_reduction(days_since_rain: f64, ld: &FuelLoading) -> f64 {
    let depth = ld.duff_depth();
    if depth <= 0.0 {
        return 0.0;
    }
    let days_to_moist = 21.0 * depth;
    let days_to_dry = 57.0 * depth;

    const WET_FRAC: f64 = 0.10;
    const MOIST_FRAC: f64 = 0.40;
    const DRY_FRAC: f64 = 0.70;

    let moist_lo = days_to_moist * 0.8;
    let moist_hi = days_to_moist * 1.2;
    let frac = if days_since_rain < moist_lo {
        WET_FRAC
    } else if days_since_rain <= moist_hi {
        let t = (days_since_rain - moist_lo) / (moist_hi - moist_lo);
        WET_FRAC + t * (MOIST_FRAC - WET_FRAC)
    } else if days_since_rain < days_to_dry {
        let t = (days_since_rain - moist_hi) / (days_to_dry - moist_hi);
        MOIST_FRAC + t * (DRY_FRAC - MOIST_FRAC)
    } else {
        DRY_FRAC
    };

    let mut reduction = frac * depth;
    if depth <= 0.5 {
        reduction *= depth / 0.5;
    }
    reduction.min(depth)
}
