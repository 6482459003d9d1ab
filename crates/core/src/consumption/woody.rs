//! Woody strata under the natural equation family, stumps, and piles
//!
//! Natural-burn woody consumption uses flat percentage-reduction constants,
//! ecoregion-selected for the 100-hr class and larger. There is no
//! cross-stratum interaction: each size class consumes its own percentage
//! of its own loading. Stumps and piles behave the same way under both
//! equation families.

use crate::consumption::shared::{Csd, ScenarioConsumption, StageQuad, Stratum};
use crate::core_types::{Ecoregion, FuelLoading};

pub(crate) const ONE_HR_CSD: Csd = Csd(0.95, 0.05, 0.0);
pub(crate) const TEN_HR_CSD: Csd = Csd(0.90, 0.10, 0.0);
pub(crate) const HUN_HR_CSD: Csd = Csd(0.85, 0.10, 0.05);
pub(crate) const ONEK_SOUND_CSD: Csd = Csd(0.60, 0.30, 0.10);
pub(crate) const TENK_SOUND_CSD: Csd = Csd(0.40, 0.40, 0.20);
pub(crate) const TNKP_SOUND_CSD: Csd = Csd(0.20, 0.40, 0.40);
pub(crate) const ONEK_ROTTEN_CSD: Csd = Csd(0.20, 0.30, 0.50);
pub(crate) const TENK_ROTTEN_CSD: Csd = Csd(0.10, 0.30, 0.60);
pub(crate) const TNKP_ROTTEN_CSD: Csd = Csd(0.10, 0.30, 0.60);
const STUMP_SOUND_CSD: Csd = Csd(0.10, 0.30, 0.60);
const STUMP_ROTTEN_CSD: Csd = Csd(0.10, 0.30, 0.60);
const STUMP_LIGHTERED_CSD: Csd = Csd(0.40, 0.30, 0.30);

/// Pile consumption splits 70/15/15 regardless of equation family.
pub(crate) const PILE_CSD: Csd = Csd(0.70, 0.15, 0.15);

// Pile consumable fractions by cleanliness: soil content shields mass.
const PILE_CLEAN_FRACTION: f64 = 0.90;
const PILE_DIRTY_FRACTION: f64 = 0.85;
const PILE_VDIRTY_FRACTION: f64 = 0.80;

/// Percent-reduction constant for a natural-burn woody class; southern
/// fuels run wetter and consume less in the larger classes.
fn natural_pct(eco: Ecoregion, stratum: Stratum) -> f64 {
    use Stratum::*;
    let southern = eco == Ecoregion::Southern;
    match stratum {
        OneHr => 0.93,
        TenHr => 0.87,
        HunHr => {
            if southern {
                0.61
            } else {
                0.75
            }
        }
        OneKSound => {
            if southern {
                0.40
            } else {
                0.52
            }
        }
        TenKSound => {
            if southern {
                0.33
            } else {
                0.42
            }
        }
        TnkpSound => {
            if southern {
                0.28
            } else {
                0.36
            }
        }
        OneKRotten => {
            if southern {
                0.55
            } else {
                0.70
            }
        }
        TenKRotten => {
            if southern {
                0.50
            } else {
                0.60
            }
        }
        TnkpRotten => {
            if southern {
                0.40
            } else {
                0.50
            }
        }
        StumpSound => 0.10,
        StumpRotten => 0.50,
        StumpLightered => 0.90,
        _ => unreachable!("non-woody stratum in natural percentage table"),
    }
}

pub(crate) fn consume_woody_natural(
    eco: Ecoregion,
    ld: &FuelLoading,
    out: &mut ScenarioConsumption,
) {
    let table: [(Stratum, f64, Csd); 12] = [
        (Stratum::OneHr, ld.one_hr_sound, ONE_HR_CSD),
        (Stratum::TenHr, ld.ten_hr_sound, TEN_HR_CSD),
        (Stratum::HunHr, ld.hun_hr_sound, HUN_HR_CSD),
        (Stratum::OneKSound, ld.onek_hr_sound, ONEK_SOUND_CSD),
        (Stratum::TenKSound, ld.tenk_hr_sound, TENK_SOUND_CSD),
        (Stratum::TnkpSound, ld.tnkp_hr_sound, TNKP_SOUND_CSD),
        (Stratum::OneKRotten, ld.onek_hr_rotten, ONEK_ROTTEN_CSD),
        (Stratum::TenKRotten, ld.tenk_hr_rotten, TENK_ROTTEN_CSD),
        (Stratum::TnkpRotten, ld.tnkp_hr_rotten, TNKP_ROTTEN_CSD),
        (Stratum::StumpSound, ld.stump_sound, STUMP_SOUND_CSD),
        (Stratum::StumpRotten, ld.stump_rotten, STUMP_ROTTEN_CSD),
        (Stratum::StumpLightered, ld.stump_lightered, STUMP_LIGHTERED_CSD),
    ];
    for (stratum, loading, csd) in table {
        out.set(stratum, csd.distribute(loading * natural_pct(eco, stratum)));
    }
}

/// Stumps consume identically under the activity family.
pub(crate) fn consume_stumps(eco: Ecoregion, ld: &FuelLoading, out: &mut ScenarioConsumption) {
    out.set(
        Stratum::StumpSound,
        STUMP_SOUND_CSD.distribute(ld.stump_sound * natural_pct(eco, Stratum::StumpSound)),
    );
    out.set(
        Stratum::StumpRotten,
        STUMP_ROTTEN_CSD.distribute(ld.stump_rotten * natural_pct(eco, Stratum::StumpRotten)),
    );
    out.set(
        Stratum::StumpLightered,
        STUMP_LIGHTERED_CSD
            .distribute(ld.stump_lightered * natural_pct(eco, Stratum::StumpLightered)),
    );
}

/// Piles: cleanliness-weighted consumable fraction scaled by the percent of
/// the pile footprint blackened.
pub(crate) fn consume_piles(
    pile_blackened_pct: f64,
    ld: &FuelLoading,
    out: &mut ScenarioConsumption,
) {
    let black = (pile_blackened_pct / 100.0).clamp(0.0, 1.0);
    let consumed = black
        * (ld.pile_clean * PILE_CLEAN_FRACTION
            + ld.pile_dirty * PILE_DIRTY_FRACTION
            + ld.pile_vdirty * PILE_VDIRTY_FRACTION);
    out.set(Stratum::Piles, PILE_CSD.distribute(consumed));
}

/// Clean/dirty/very-dirty share of the pile loading, needed downstream by
/// the emissions core's pile factor weighting.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct PileMix {
    pub clean: f64,
    pub dirty: f64,
    pub vdirty: f64,
}

impl PileMix {
    pub fn from_loading(ld: &FuelLoading) -> PileMix {
        let total = ld.pile_clean + ld.pile_dirty + ld.pile_vdirty;
        if total <= 0.0 {
            // convention: an absent pile is treated as clean for weighting
            return PileMix {
                clean: 1.0,
                dirty: 0.0,
                vdirty: 0.0,
            };
        }
        PileMix {
            clean: ld.pile_clean / total,
            dirty: ld.pile_dirty / total,
            vdirty: ld.pile_vdirty / total,
        }
    }
}

/// Clamp a quad so its flaming share never exceeds the class total, pushing
/// overflow into smoldering. Activity flaming splits are derived from an
/// intensity curve and can momentarily overshoot on sparse loadings.
pub(crate) fn clamp_flaming(quad: StageQuad, total: f64) -> StageQuad {
    if quad.flaming <= total {
        return quad;
    }
    StageQuad {
        flaming: total,
        smoldering: quad.smoldering + (quad.flaming - total),
        residual: quad.residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn natural_woody_is_percentage_of_loading() {
        let ld = FuelLoading {
            one_hr_sound: 1.0,
            ten_hr_sound: 2.0,
            onek_hr_sound: 10.0,
            ..FuelLoading::default()
        };
        let mut out = ScenarioConsumption::new();
        consume_woody_natural(Ecoregion::Western, &ld, &mut out);
        assert_relative_eq!(out.get(Stratum::OneHr).total(), 0.93);
        assert_relative_eq!(out.get(Stratum::TenHr).total(), 1.74);
        assert_relative_eq!(out.get(Stratum::OneKSound).total(), 5.2);
    }

    #[test]
    fn southern_large_wood_consumes_less() {
        let ld = FuelLoading {
            onek_hr_sound: 10.0,
            onek_hr_rotten: 10.0,
            ..FuelLoading::default()
        };
        let mut west = ScenarioConsumption::new();
        let mut south = ScenarioConsumption::new();
        consume_woody_natural(Ecoregion::Western, &ld, &mut west);
        consume_woody_natural(Ecoregion::Southern, &ld, &mut south);
        assert!(west.get(Stratum::OneKSound).total() > south.get(Stratum::OneKSound).total());
        assert!(west.get(Stratum::OneKRotten).total() > south.get(Stratum::OneKRotten).total());
    }

    #[test]
    fn rotten_wood_runs_to_residual() {
        let ld = FuelLoading {
            tenk_hr_rotten: 10.0,
            ..FuelLoading::default()
        };
        let mut out = ScenarioConsumption::new();
        consume_woody_natural(Ecoregion::Boreal, &ld, &mut out);
        let q = out.get(Stratum::TenKRotten);
        assert!(q.residual > q.flaming);
    }

    #[test]
    fn piles_weight_by_cleanliness() {
        let ld = FuelLoading {
            pile_clean: 10.0,
            pile_dirty: 10.0,
            pile_vdirty: 10.0,
            ..FuelLoading::default()
        };
        let mut out = ScenarioConsumption::new();
        consume_piles(100.0, &ld, &mut out);
        let q = out.get(Stratum::Piles);
        assert_relative_eq!(q.total(), 10.0 * (0.90 + 0.85 + 0.80));
        assert_relative_eq!(q.flaming, q.total() * 0.70);
        assert_relative_eq!(q.smoldering, q.total() * 0.15);
    }

    #[test]
    fn pile_mix_shares_sum_to_one() {
        let ld = FuelLoading {
            pile_clean: 6.0,
            pile_dirty: 3.0,
            pile_vdirty: 1.0,
            ..FuelLoading::default()
        };
        let mix = PileMix::from_loading(&ld);
        assert_relative_eq!(mix.clean + mix.dirty + mix.vdirty, 1.0);
        assert_relative_eq!(mix.clean, 0.6);
    }

    #[test]
    fn clamp_flaming_preserves_total() {
        let q = StageQuad {
            flaming: 5.0,
            smoldering: 1.0,
            residual: 1.0,
        };
        let clamped = clamp_flaming(q, 4.0);
        assert_relative_eq!(clamped.flaming, 4.0);
        assert_relative_eq!(clamped.total(), q.total());
    }
}
