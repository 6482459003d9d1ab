//! End-to-end validation of the emissions pipeline over real consumption
//! results.

use approx::assert_relative_eq;
use consume_core::{
    compute_emissions, BurnInput, BurnType, ConsumptionEngine, ConsumptionUnit, Ecoregion,
    EfGroupId, EmissionFactorProvider, EmissionFactorSet, FactorMode, FuelGroup, FuelLoading,
    FuelLoadingProvider, FuelbedId, InputVar, LookupError, PhaseFactors, Pollutant, ScenarioInput,
};

struct LoadingFixture;

impl FuelLoadingProvider for LoadingFixture {
    fn lookup(&self, ids: &[FuelbedId]) -> Result<Vec<FuelLoading>, LookupError> {
        Ok(ids
            .iter()
            .map(|id| {
                let mut ld = base_loading();
                if id.0 == "pine" {
                    ld.efg_natural = 2;
                    ld.cover_type = 7;
                }
                ld
            })
            .collect())
    }
}

fn base_loading() -> FuelLoading {
    FuelLoading {
        shrub_primary: 2.0,
        shrub_primary_pct_live: 60.0,
        nonwoody_primary: 1.0,
        nonwoody_primary_pct_live: 70.0,
        litter_depth: 1.0,
        litter_pct_cover: 90.0,
        litter_short_needle_pct: 100.0,
        duff_upper_depth: 1.0,
        duff_upper_pct_cover: 80.0,
        one_hr_sound: 0.8,
        ten_hr_sound: 1.6,
        hun_hr_sound: 2.0,
        onek_hr_sound: 3.0,
        pile_clean: 2.0,
        pile_dirty: 1.0,
        canopy_consumption_pct_default: 0.0,
        efg_natural: 1,
        efg_activity: 1,
        cover_type: 3,
        ..FuelLoading::default()
    }
}

struct FactorFixture;

fn factor_set(co2_flaming: f64, co2_sr: f64) -> EmissionFactorSet {
    let mut factors = [PhaseFactors {
        flaming: 10.0,
        smoldering_residual: 15.0,
    }; Pollutant::COUNT];
    let co2 = Pollutant::ALL
        .iter()
        .position(|&p| p == Pollutant::Co2)
        .unwrap();
    factors[co2] = PhaseFactors {
        flaming: co2_flaming,
        smoldering_residual: co2_sr,
    };
    EmissionFactorSet::new(factors)
}

impl EmissionFactorProvider for FactorFixture {
    fn group_for(&self, id: &FuelbedId, burn_type: BurnType) -> Result<EfGroupId, LookupError> {
        assert_eq!(burn_type, BurnType::Natural);
        Ok(if id.0 == "pine" { EfGroupId(2) } else { EfGroupId(1) })
    }

    fn group_for_cover_type(&self, cover_type: i32) -> Result<EfGroupId, LookupError> {
        match cover_type {
            3 => Ok(EfGroupId(1)),
            7 => Ok(EfGroupId(2)),
            other => Err(LookupError::UnknownFactorGroup(other)),
        }
    }

    fn factors(&self, group: EfGroupId) -> Result<EmissionFactorSet, LookupError> {
        match group.0 {
            1 => Ok(factor_set(3430.0, 3180.0)),
            2 => Ok(factor_set(3200.0, 3000.0)),
            _ => Err(LookupError::UnknownFactorGroup(group.0)),
        }
    }
}

fn scenario(fuelbeds: Vec<&str>) -> ScenarioInput {
    ScenarioInput {
        fuelbeds: fuelbeds.into_iter().map(FuelbedId::new).collect(),
        area: InputVar::Scalar(50.0),
        ecoregion: InputVar::Scalar(Ecoregion::Western),
        fm_1000hr: InputVar::Scalar(45.0),
        fm_duff: InputVar::Scalar(60.0),
        canopy_consumption_pct: InputVar::Scalar(0.0),
        shrub_blackened_pct: InputVar::Scalar(40.0),
        pile_blackened_pct: InputVar::Scalar(30.0),
        units: ConsumptionUnit::TonsPerAcre,
        burn: BurnInput::Natural,
    }
}

#[test]
fn co2_follows_the_two_phase_factors() {
    let consumption = ConsumptionEngine::new()
        .compute(&scenario(vec!["fir"]), &LoadingFixture, &[])
        .unwrap();
    let emissions =
        compute_emissions(&consumption, &FactorFixture, FactorMode::Static).unwrap();

    // litter-lichen-moss carries no piles; its emissions are a plain
    // per-stage multiply by the group 1 CO2 factors
    let cons = consumption.group(FuelGroup::LitterLichenMoss);
    let co2 = &emissions
        .pollutant(Pollutant::Co2)
        .groups
        .iter()
        .find(|g| g.group == FuelGroup::LitterLichenMoss)
        .unwrap()
        .stages;
    assert_relative_eq!(co2.flaming[0], cons.flaming[0] * 3430.0, epsilon = 1e-9);
    assert_relative_eq!(co2.smoldering[0], cons.smoldering[0] * 3180.0, epsilon = 1e-9);
    assert_relative_eq!(co2.residual[0], cons.residual[0] * 3180.0, epsilon = 1e-9);
    assert_relative_eq!(
        co2.total[0],
        cons.flaming[0] * 3430.0 + (cons.smoldering[0] + cons.residual[0]) * 3180.0,
        epsilon = 1e-9
    );
}

#[test]
fn pollutant_summary_equals_group_sum() {
    let consumption = ConsumptionEngine::new()
        .compute(&scenario(vec!["fir", "pine"]), &LoadingFixture, &[])
        .unwrap();
    let emissions =
        compute_emissions(&consumption, &FactorFixture, FactorMode::Static).unwrap();
    for pollutant in Pollutant::ALL {
        let p = emissions.pollutant(pollutant);
        for i in 0..2 {
            let group_sum: f64 = p.groups.iter().map(|g| g.stages.total[i]).sum();
            assert_relative_eq!(p.summary.total[i], group_sum, epsilon = 1e-6);
        }
    }
}

#[test]
fn pile_emissions_exceed_the_plain_multiply() {
    // a dirty pile mix weights factors above 1.0, so woody emissions must be
    // larger than consumption times the broadcast factors alone
    let consumption = ConsumptionEngine::new()
        .compute(&scenario(vec!["fir"]), &LoadingFixture, &[])
        .unwrap();
    let emissions =
        compute_emissions(&consumption, &FactorFixture, FactorMode::Static).unwrap();
    let woody_cons = consumption.group(FuelGroup::WoodyFuels);
    let woody_em = &emissions
        .pollutant(Pollutant::Pm)
        .groups
        .iter()
        .find(|g| g.group == FuelGroup::WoodyFuels)
        .unwrap()
        .stages;
    let plain = woody_cons.flaming[0] * 10.0
        + (woody_cons.smoldering[0] + woody_cons.residual[0]) * 15.0;
    assert!(woody_em.total[0] > plain);
}

#[test]
fn per_fuelbed_groups_resolve_independently() {
    let consumption = ConsumptionEngine::new()
        .compute(&scenario(vec!["fir", "pine"]), &LoadingFixture, &[])
        .unwrap();
    let emissions =
        compute_emissions(&consumption, &FactorFixture, FactorMode::Static).unwrap();
    let co2 = emissions.pollutant(Pollutant::Co2);
    // same consumption, lower factors for pine: pine's row must be smaller
    assert!(co2.summary.total[1] < co2.summary.total[0]);
}

#[test]
fn cover_type_mode_matches_static_when_groups_align() {
    let consumption = ConsumptionEngine::new()
        .compute(&scenario(vec!["fir", "pine"]), &LoadingFixture, &[])
        .unwrap();
    // cover types 3/7 resolve to the same groups as the static lookup
    let stat = compute_emissions(&consumption, &FactorFixture, FactorMode::Static).unwrap();
    let cover = compute_emissions(
        &consumption,
        &FactorFixture,
        FactorMode::CoverType { multiplier: 1.0 },
    )
    .unwrap();
    assert_eq!(stat.pollutants, cover.pollutants);

    let doubled = compute_emissions(
        &consumption,
        &FactorFixture,
        FactorMode::CoverType { multiplier: 2.0 },
    )
    .unwrap();
    assert_relative_eq!(
        doubled.pollutant(Pollutant::Co).summary.total[0],
        stat.pollutant(Pollutant::Co).summary.total[0] * 2.0,
        epsilon = 1e-9
    );
}

#[test]
fn absolute_unit_emissions_scale_with_area() {
    let mut abs_input = scenario(vec!["fir"]);
    abs_input.units = ConsumptionUnit::Tons;
    let per_acre = ConsumptionEngine::new()
        .compute(&scenario(vec!["fir"]), &LoadingFixture, &[])
        .unwrap();
    let absolute = ConsumptionEngine::new()
        .compute(&abs_input, &LoadingFixture, &[])
        .unwrap();
    let em_pa = compute_emissions(&per_acre, &FactorFixture, FactorMode::Static).unwrap();
    let em_abs = compute_emissions(&absolute, &FactorFixture, FactorMode::Static).unwrap();
    // area is 50 acres: absolute lbs = lbs/acre x 50
    assert_relative_eq!(
        em_abs.pollutant(Pollutant::Ch4).summary.total[0],
        em_pa.pollutant(Pollutant::Ch4).summary.total[0] * 50.0,
        epsilon = 1e-6
    );
}
