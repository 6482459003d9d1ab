//! Shrub and nonwoody (herbaceous) strata
//!
//! Both use an empirical logistic regression of total layer loading and the
//! percent of the layer blackened by the fire. The consumed mass is shared
//! between primary and secondary layers by loading, then split into live and
//! dead components by the fuelbed's percent-live, each component with its
//! own combustion-stage distribution. A zero total loading short-circuits to
//! zero consumption; the regression is never evaluated on an empty layer.

use crate::consumption::shared::{propcons, Csd, ScenarioConsumption, StageQuad, Stratum};
use crate::core_types::FuelLoading;

const SHRUB_LIVE_CSD: Csd = Csd(0.95, 0.05, 0.0);
const SHRUB_DEAD_CSD: Csd = Csd(0.90, 0.10, 0.0);
const NONWOODY_LIVE_CSD: Csd = Csd(0.95, 0.05, 0.0);
const NONWOODY_DEAD_CSD: Csd = Csd(0.95, 0.05, 0.0);

/// Split one layer's consumed mass into live/dead stage quads.
fn split_live_dead(
    consumed: f64,
    pct_live: f64,
    live_csd: Csd,
    dead_csd: Csd,
) -> (StageQuad, StageQuad) {
    let live_frac = (pct_live / 100.0).clamp(0.0, 1.0);
    (
        live_csd.distribute(consumed * live_frac),
        dead_csd.distribute(consumed * (1.0 - live_frac)),
    )
}

pub(crate) fn consume_shrub(
    shrub_blackened_pct: f64,
    ld: &FuelLoading,
    out: &mut ScenarioConsumption,
) {
    let total = ld.shrub_primary + ld.shrub_secondary;
    if total <= 0.0 {
        // explicit guard: zero loading means zero consumption, not NaN
        return;
    }
    // Logistic consumption proportion from total loading and blackening.
    let z = -2.6573 + 0.0956 * total + 0.0473 * shrub_blackened_pct;
    let consumed = total * propcons(z);

    let primary_share = ld.shrub_primary / total;
    let (prim_live, prim_dead) = split_live_dead(
        consumed * primary_share,
        ld.shrub_primary_pct_live,
        SHRUB_LIVE_CSD,
        SHRUB_DEAD_CSD,
    );
    let (seco_live, seco_dead) = split_live_dead(
        consumed * (1.0 - primary_share),
        ld.shrub_secondary_pct_live,
        SHRUB_LIVE_CSD,
        SHRUB_DEAD_CSD,
    );
    out.set(Stratum::ShrubPrimaryLive, prim_live);
    out.set(Stratum::ShrubPrimaryDead, prim_dead);
    out.set(Stratum::ShrubSecondaryLive, seco_live);
    out.set(Stratum::ShrubSecondaryDead, seco_dead);
}

pub(crate) fn consume_nonwoody(ld: &FuelLoading, out: &mut ScenarioConsumption) {
    let total = ld.nonwoody_primary + ld.nonwoody_secondary;
    if total <= 0.0 {
        return;
    }
    // Herbaceous fuels burn nearly completely once carried; the logistic
    // saturates quickly with loading.
    let z = 1.8021 + 0.3328 * total;
    let consumed = total * propcons(z);

    let primary_share = ld.nonwoody_primary / total;
    let (prim_live, prim_dead) = split_live_dead(
        consumed * primary_share,
        ld.nonwoody_primary_pct_live,
        NONWOODY_LIVE_CSD,
        NONWOODY_DEAD_CSD,
    );
    let (seco_live, seco_dead) = split_live_dead(
        consumed * (1.0 - primary_share),
        ld.nonwoody_secondary_pct_live,
        NONWOODY_LIVE_CSD,
        NONWOODY_DEAD_CSD,
    );
    out.set(Stratum::NonwoodyPrimaryLive, prim_live);
    out.set(Stratum::NonwoodyPrimaryDead, prim_dead);
    out.set(Stratum::NonwoodySecondaryLive, seco_live);
    out.set(Stratum::NonwoodySecondaryDead, seco_dead);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn shrub_total(out: &ScenarioConsumption) -> f64 {
        out.get(Stratum::ShrubPrimaryLive).total()
            + out.get(Stratum::ShrubPrimaryDead).total()
            + out.get(Stratum::ShrubSecondaryLive).total()
            + out.get(Stratum::ShrubSecondaryDead).total()
    }

    #[test]
    fn zero_shrub_loading_yields_zero_not_nan() {
        let ld = FuelLoading::default();
        let mut out = ScenarioConsumption::new();
        consume_shrub(25.0, &ld, &mut out);
        let q = out.get(Stratum::ShrubPrimaryLive);
        assert_eq!(q.flaming, 0.0);
        assert_eq!(q.smoldering, 0.0);
        assert_eq!(q.residual, 0.0);
        assert!(!shrub_total(&out).is_nan());
    }

    #[test]
    fn consumption_never_exceeds_loading() {
        let ld = FuelLoading {
            shrub_primary: 3.0,
            shrub_primary_pct_live: 70.0,
            shrub_secondary: 1.0,
            shrub_secondary_pct_live: 40.0,
            ..FuelLoading::default()
        };
        let mut out = ScenarioConsumption::new();
        consume_shrub(100.0, &ld, &mut out);
        let total = shrub_total(&out);
        assert!(total > 0.0);
        assert!(total <= 4.0);
    }

    #[test]
    fn more_blackening_consumes_more() {
        let ld = FuelLoading {
            shrub_primary: 2.0,
            shrub_primary_pct_live: 50.0,
            ..FuelLoading::default()
        };
        let mut low = ScenarioConsumption::new();
        let mut high = ScenarioConsumption::new();
        consume_shrub(10.0, &ld, &mut low);
        consume_shrub(90.0, &ld, &mut high);
        assert!(shrub_total(&high) > shrub_total(&low));
    }

    #[test]
    fn live_dead_split_follows_pct_live() {
        let ld = FuelLoading {
            nonwoody_primary: 2.0,
            nonwoody_primary_pct_live: 75.0,
            ..FuelLoading::default()
        };
        let mut out = ScenarioConsumption::new();
        consume_nonwoody(&ld, &mut out);
        let live = out.get(Stratum::NonwoodyPrimaryLive).total();
        let dead = out.get(Stratum::NonwoodyPrimaryDead).total();
        assert!(live > 0.0);
        assert_relative_eq!(live / (live + dead), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn nonwoody_consumes_most_of_the_layer() {
        let ld = FuelLoading {
            nonwoody_primary: 1.5,
            nonwoody_primary_pct_live: 50.0,
            ..FuelLoading::default()
        };
        let mut out = ScenarioConsumption::new();
        consume_nonwoody(&ld, &mut out);
        let total = out.get(Stratum::NonwoodyPrimaryLive).total()
            + out.get(Stratum::NonwoodyPrimaryDead).total();
        assert!(total > 1.5 * 0.8 && total < 1.5);
    }
}
