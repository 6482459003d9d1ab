//! Canopy strata: overstory through snags and ladder fuels
//!
//! Canopy consumption is driven directly by the scenario's canopy
//! consumption percent (user supplied or the fuelbed default). Each stratum
//! consumes `loading x pct` and distributes the result with its own fixed
//! combustion-stage split; foliage burns almost entirely in the flaming
//! stage while large dead snags trail into smoldering and residual.

use crate::consumption::shared::{Csd, ScenarioConsumption, Stratum};
use crate::core_types::FuelLoading;

const CANOPY_CSD: [(Stratum, Csd); 9] = [
    (Stratum::Overstory, Csd(0.75, 0.20, 0.05)),
    (Stratum::Midstory, Csd(0.80, 0.15, 0.05)),
    (Stratum::Understory, Csd(0.85, 0.10, 0.05)),
    (Stratum::Snag1Foliage, Csd(0.80, 0.15, 0.05)),
    (Stratum::Snag1Wood, Csd(0.40, 0.30, 0.30)),
    (Stratum::Snag1NoFoliage, Csd(0.50, 0.30, 0.20)),
    (Stratum::Snag2, Csd(0.30, 0.40, 0.30)),
    (Stratum::Snag3, Csd(0.20, 0.40, 0.40)),
    (Stratum::LadderFuels, Csd(0.80, 0.15, 0.05)),
];

pub(crate) fn consume_canopy(
    canopy_consumption_pct: f64,
    ld: &FuelLoading,
    out: &mut ScenarioConsumption,
) {
    let pct = canopy_consumption_pct / 100.0;
    for (stratum, csd) in CANOPY_CSD {
        let loading = match stratum {
            Stratum::Overstory => ld.overstory,
            Stratum::Midstory => ld.midstory,
            Stratum::Understory => ld.understory,
            Stratum::Snag1Foliage => ld.snag1_foliage,
            Stratum::Snag1Wood => ld.snag1_wood,
            Stratum::Snag1NoFoliage => ld.snag1_no_foliage,
            Stratum::Snag2 => ld.snag2,
            Stratum::Snag3 => ld.snag3,
            Stratum::LadderFuels => ld.ladder_fuels,
            _ => unreachable!("non-canopy stratum in canopy table"),
        };
        out.set(stratum, csd.distribute(loading * pct));
    }
}
