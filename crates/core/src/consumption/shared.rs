//! Shared mechanics of the consumption equations
//!
//! Every stratum equation produces a [`StageQuad`]: consumed mass split into
//! flaming/smoldering/residual. The split is usually a fixed per-stratum
//! [`Csd`] 3-tuple; the activity woody equations instead derive the flaming
//! share from fire intensity and fill the remainder.

use serde::{Deserialize, Serialize};

/// The leaf fuel strata, in fixed presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stratum {
    // Canopy
    Overstory,
    Midstory,
    Understory,
    Snag1Foliage,
    Snag1Wood,
    Snag1NoFoliage,
    Snag2,
    Snag3,
    LadderFuels,
    // Shrub
    ShrubPrimaryLive,
    ShrubPrimaryDead,
    ShrubSecondaryLive,
    ShrubSecondaryDead,
    // Nonwoody
    NonwoodyPrimaryLive,
    NonwoodyPrimaryDead,
    NonwoodySecondaryLive,
    NonwoodySecondaryDead,
    // Litter-lichen-moss
    Litter,
    Lichen,
    Moss,
    // Ground fuels
    DuffUpper,
    DuffLower,
    BasalAccumulation,
    SquirrelMidden,
    // Woody fuels
    Piles,
    StumpSound,
    StumpRotten,
    StumpLightered,
    OneHr,
    TenHr,
    HunHr,
    OneKSound,
    TenKSound,
    TnkpSound,
    OneKRotten,
    TenKRotten,
    TnkpRotten,
}

/// Mid-level result groups; every stratum belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelGroup {
    Canopy,
    Shrub,
    Nonwoody,
    LitterLichenMoss,
    GroundFuels,
    WoodyFuels,
}

impl FuelGroup {
    pub const ALL: [FuelGroup; 6] = [
        FuelGroup::Canopy,
        FuelGroup::Shrub,
        FuelGroup::Nonwoody,
        FuelGroup::LitterLichenMoss,
        FuelGroup::GroundFuels,
        FuelGroup::WoodyFuels,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FuelGroup::Canopy => "canopy",
            FuelGroup::Shrub => "shrub",
            FuelGroup::Nonwoody => "nonwoody",
            FuelGroup::LitterLichenMoss => "litter-lichen-moss",
            FuelGroup::GroundFuels => "ground fuels",
            FuelGroup::WoodyFuels => "woody fuels",
        }
    }
}

impl Stratum {
    pub const COUNT: usize = 37;

    pub const ALL: [Stratum; Stratum::COUNT] = [
        Stratum::Overstory,
        Stratum::Midstory,
        Stratum::Understory,
        Stratum::Snag1Foliage,
        Stratum::Snag1Wood,
        Stratum::Snag1NoFoliage,
        Stratum::Snag2,
        Stratum::Snag3,
        Stratum::LadderFuels,
        Stratum::ShrubPrimaryLive,
        Stratum::ShrubPrimaryDead,
        Stratum::ShrubSecondaryLive,
        Stratum::ShrubSecondaryDead,
        Stratum::NonwoodyPrimaryLive,
        Stratum::NonwoodyPrimaryDead,
        Stratum::NonwoodySecondaryLive,
        Stratum::NonwoodySecondaryDead,
        Stratum::Litter,
        Stratum::Lichen,
        Stratum::Moss,
        Stratum::DuffUpper,
        Stratum::DuffLower,
        Stratum::BasalAccumulation,
        Stratum::SquirrelMidden,
        Stratum::Piles,
        Stratum::StumpSound,
        Stratum::StumpRotten,
        Stratum::StumpLightered,
        Stratum::OneHr,
        Stratum::TenHr,
        Stratum::HunHr,
        Stratum::OneKSound,
        Stratum::TenKSound,
        Stratum::TnkpSound,
        Stratum::OneKRotten,
        Stratum::TenKRotten,
        Stratum::TnkpRotten,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn group(self) -> FuelGroup {
        use Stratum::*;
        match self {
            Overstory | Midstory | Understory | Snag1Foliage | Snag1Wood | Snag1NoFoliage
            | Snag2 | Snag3 | LadderFuels => FuelGroup::Canopy,
            ShrubPrimaryLive | ShrubPrimaryDead | ShrubSecondaryLive | ShrubSecondaryDead => {
                FuelGroup::Shrub
            }
            NonwoodyPrimaryLive | NonwoodyPrimaryDead | NonwoodySecondaryLive
            | NonwoodySecondaryDead => FuelGroup::Nonwoody,
            Litter | Lichen | Moss => FuelGroup::LitterLichenMoss,
            DuffUpper | DuffLower | BasalAccumulation | SquirrelMidden => FuelGroup::GroundFuels,
            Piles | StumpSound | StumpRotten | StumpLightered | OneHr | TenHr | HunHr
            | OneKSound | TenKSound | TnkpSound | OneKRotten | TenKRotten | TnkpRotten => {
                FuelGroup::WoodyFuels
            }
        }
    }

    pub fn label(self) -> &'static str {
        use Stratum::*;
        match self {
            Overstory => "overstory",
            Midstory => "midstory",
            Understory => "understory",
            Snag1Foliage => "snags class 1 foliage",
            Snag1Wood => "snags class 1 wood",
            Snag1NoFoliage => "snags class 1 no foliage",
            Snag2 => "snags class 2",
            Snag3 => "snags class 3",
            LadderFuels => "ladder fuels",
            ShrubPrimaryLive => "shrub primary live",
            ShrubPrimaryDead => "shrub primary dead",
            ShrubSecondaryLive => "shrub secondary live",
            ShrubSecondaryDead => "shrub secondary dead",
            NonwoodyPrimaryLive => "nonwoody primary live",
            NonwoodyPrimaryDead => "nonwoody primary dead",
            NonwoodySecondaryLive => "nonwoody secondary live",
            NonwoodySecondaryDead => "nonwoody secondary dead",
            Litter => "litter",
            Lichen => "lichen",
            Moss => "moss",
            DuffUpper => "duff upper",
            DuffLower => "duff lower",
            BasalAccumulation => "basal accumulations",
            SquirrelMidden => "squirrel middens",
            Piles => "piles",
            StumpSound => "stumps sound",
            StumpRotten => "stumps rotten",
            StumpLightered => "stumps lightered",
            OneHr => "1-hr fuels",
            TenHr => "10-hr fuels",
            HunHr => "100-hr fuels",
            OneKSound => "1000-hr fuels sound",
            TenKSound => "10000-hr fuels sound",
            TnkpSound => "10000-hr+ fuels sound",
            OneKRotten => "1000-hr fuels rotten",
            TenKRotten => "10000-hr fuels rotten",
            TnkpRotten => "10000-hr+ fuels rotten",
        }
    }
}

/// Consumed mass of one stratum for one scenario, by combustion stage.
/// `total()` is always the sum of the three stages by construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageQuad {
    pub flaming: f64,
    pub smoldering: f64,
    pub residual: f64,
}

impl StageQuad {
    pub const ZERO: StageQuad = StageQuad {
        flaming: 0.0,
        smoldering: 0.0,
        residual: 0.0,
    };

    pub fn total(&self) -> f64 {
        self.flaming + self.smoldering + self.residual
    }

    pub fn add(&mut self, other: StageQuad) {
        self.flaming += other.flaming;
        self.smoldering += other.smoldering;
        self.residual += other.residual;
    }
}

/// Fixed combustion-stage distribution: the fractions of consumed mass
/// assigned to flaming, smoldering, and residual. Must sum to 1.
#[derive(Debug, Clone, Copy)]
pub struct Csd(pub f64, pub f64, pub f64);

impl Csd {
    pub fn distribute(self, consumed: f64) -> StageQuad {
        debug_assert!((self.0 + self.1 + self.2 - 1.0).abs() < 1e-9, "csd must sum to 1");
        StageQuad {
            flaming: consumed * self.0,
            smoldering: consumed * self.1,
            residual: consumed * self.2,
        }
    }
}

/// Logistic proportion-consumed transform used by several regressions.
pub(crate) fn propcons(y: f64) -> f64 {
    y.exp() / (1.0 + y.exp())
}

/// All strata of one scenario, filled in by the equation modules.
#[derive(Debug, Clone)]
pub(crate) struct ScenarioConsumption {
    strata: [StageQuad; Stratum::COUNT],
}

impl ScenarioConsumption {
    pub fn new() -> ScenarioConsumption {
        ScenarioConsumption {
            strata: [StageQuad::ZERO; Stratum::COUNT],
        }
    }

    pub fn set(&mut self, stratum: Stratum, quad: StageQuad) {
        self.strata[stratum.index()] = quad;
    }

    pub fn get(&self, stratum: Stratum) -> StageQuad {
        self.strata[stratum.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stratum_order_matches_indices() {
        for (i, s) in Stratum::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn every_stratum_has_a_group() {
        let mut counts = [0usize; 6];
        for s in Stratum::ALL {
            let g = FuelGroup::ALL.iter().position(|&g| g == s.group()).unwrap();
            counts[g] += 1;
        }
        assert_eq!(counts, [9, 4, 4, 3, 4, 13]);
    }

    #[test]
    fn csd_distribution_preserves_total() {
        let q = Csd(0.75, 0.2, 0.05).distribute(10.0);
        assert_relative_eq!(q.total(), 10.0);
        assert_relative_eq!(q.flaming, 7.5);
        assert_relative_eq!(q.residual, 0.5);
    }

    #[test]
    fn propcons_is_a_proportion() {
        assert_relative_eq!(propcons(0.0), 0.5);
        assert!(propcons(-20.0) > 0.0 && propcons(-20.0) < 1e-6);
        assert!(propcons(20.0) < 1.0 && propcons(20.0) > 1.0 - 1e-6);
    }
}
