//! End-to-end validation of the natural-burn consumption pipeline.

use approx::assert_relative_eq;
use consume_core::{
    BurnInput, ConsumptionEngine, ConsumptionUnit, Ecoregion, EngineError, FuelGroup, FuelLoading,
    FuelLoadingProvider, FuelbedId, InputVar, LoadingOverride, LookupError, ScenarioInput,
    BTU_PER_TON,
};

struct FixtureProvider;

impl FuelLoadingProvider for FixtureProvider {
    fn lookup(&self, ids: &[FuelbedId]) -> Result<Vec<FuelLoading>, LookupError> {
        let unknown: Vec<String> = ids
            .iter()
            .filter(|id| id.0 != "52")
            .map(|id| id.0.clone())
            .collect();
        if !unknown.is_empty() {
            return Err(LookupError::UnknownFuelbed(unknown));
        }
        Ok(ids.iter().map(|_| conifer_loading()).collect())
    }
}

fn conifer_loading() -> FuelLoading {
    FuelLoading {
        overstory: 5.0,
        midstory: 2.0,
        understory: 1.0,
        snag1_wood: 0.5,
        snag2: 0.5,
        snag3: 0.2,
        ladder_fuels: 0.3,
        shrub_primary: 3.0,
        shrub_primary_pct_live: 70.0,
        shrub_secondary: 1.0,
        shrub_secondary_pct_live: 50.0,
        nonwoody_primary: 2.0,
        nonwoody_primary_pct_live: 80.0,
        litter_depth: 1.2,
        litter_pct_cover: 90.0,
        litter_short_needle_pct: 60.0,
        litter_long_needle_pct: 40.0,
        lichen_depth: 0.1,
        lichen_pct_cover: 20.0,
        moss_depth: 0.3,
        moss_pct_cover: 40.0,
        duff_upper_depth: 1.5,
        duff_upper_pct_cover: 80.0,
        duff_lower_depth: 1.0,
        duff_lower_pct_cover: 80.0,
        basal_accum_depth: 2.0,
        basal_accum_density: 30.0,
        basal_accum_radius: 2.0,
        sq_midden_depth: 4.0,
        sq_midden_density: 2.0,
        sq_midden_radius: 3.0,
        one_hr_sound: 0.5,
        ten_hr_sound: 1.5,
        hun_hr_sound: 2.5,
        onek_hr_sound: 4.0,
        tenk_hr_sound: 6.0,
        tnkp_hr_sound: 3.0,
        onek_hr_rotten: 2.0,
        tenk_hr_rotten: 3.0,
        tnkp_hr_rotten: 1.0,
        stump_sound: 0.3,
        stump_rotten: 0.4,
        stump_lightered: 0.1,
        pile_clean: 1.0,
        canopy_consumption_pct_default: 60.0,
        efg_natural: 1,
        efg_activity: 2,
        cover_type: 118,
        ..FuelLoading::default()
    }
}

fn natural_input(n: usize) -> ScenarioInput {
    ScenarioInput {
        fuelbeds: vec![FuelbedId::new("52"); n],
        area: InputVar::Scalar(100.0),
        ecoregion: InputVar::Scalar(Ecoregion::Western),
        fm_1000hr: InputVar::Scalar(50.0),
        fm_duff: InputVar::Scalar(50.0),
        canopy_consumption_pct: InputVar::Scalar(25.0),
        shrub_blackened_pct: InputVar::Scalar(25.0),
        pile_blackened_pct: InputVar::Scalar(50.0),
        units: ConsumptionUnit::TonsPerAcre,
        burn: BurnInput::Natural,
    }
}

#[test]
fn reference_natural_scenario_consumes_and_balances() {
    let engine = ConsumptionEngine::new();
    let results = engine
        .compute(&natural_input(1), &FixtureProvider, &[])
        .unwrap();

    let total = results.summary.total[0];
    assert!(total > 0.0);

    let group_sum: f64 = results.groups.iter().map(|g| g.stages.total[0]).sum();
    assert_relative_eq!(total, group_sum, epsilon = 1e-9);

    // tons/acre output: the BTU constant applies directly
    assert_relative_eq!(
        results.heat_release.total[0],
        total * BTU_PER_TON,
        epsilon = 1e-3
    );
}

#[test]
fn every_category_satisfies_the_stage_identity() {
    let engine = ConsumptionEngine::new();
    let results = engine
        .compute(&natural_input(2), &FixtureProvider, &[])
        .unwrap();
    for sr in &results.strata {
        for i in 0..2 {
            assert_relative_eq!(
                sr.stages.total[i],
                sr.stages.flaming[i] + sr.stages.smoldering[i] + sr.stages.residual[i],
                epsilon = 1e-12
            );
        }
    }
    for g in &results.groups {
        let leaf_sum: f64 = results
            .strata
            .iter()
            .filter(|s| s.stratum.group() == g.group)
            .map(|s| s.stages.total[0])
            .sum();
        assert_relative_eq!(g.stages.total[0], leaf_sum, epsilon = 1e-9);
    }
}

#[test]
fn dedup_is_transparent() {
    // rows 0 and 2 identical, row 1 differs
    let mut input = natural_input(3);
    input.fm_duff = InputVar::Vector(vec![50.0, 80.0, 50.0]);

    let with = ConsumptionEngine::new()
        .compute(&input, &FixtureProvider, &[])
        .unwrap();
    let without = ConsumptionEngine::without_dedup()
        .compute(&input, &FixtureProvider, &[])
        .unwrap();
    assert_eq!(with, without);

    // row 1's wetter duff must consume less ground fuel than rows 0/2
    let ground = with.group(FuelGroup::GroundFuels);
    assert_eq!(ground.total[0].to_bits(), ground.total[2].to_bits());
    assert!(ground.total[1] < ground.total[0]);
}

#[test]
fn zero_shrub_loading_yields_zero_not_nan() {
    let mut input = natural_input(1);
    input.shrub_blackened_pct = InputVar::Scalar(80.0);
    let ld = FuelLoading {
        shrub_primary: 0.0,
        shrub_secondary: 0.0,
        ..conifer_loading()
    };
    struct Bare(FuelLoading);
    impl FuelLoadingProvider for Bare {
        fn lookup(&self, ids: &[FuelbedId]) -> Result<Vec<FuelLoading>, LookupError> {
            Ok(vec![self.0.clone(); ids.len()])
        }
    }
    let results = ConsumptionEngine::new()
        .compute(&input, &Bare(ld), &[])
        .unwrap();
    let shrub = results.group(FuelGroup::Shrub);
    for stage in [&shrub.flaming, &shrub.smoldering, &shrub.residual, &shrub.total] {
        assert_eq!(stage[0], 0.0);
        assert!(!stage[0].is_nan());
    }
}

#[test]
fn unknown_fuelbeds_are_reported_by_id() {
    let mut input = natural_input(3);
    input.fuelbeds = vec![
        FuelbedId::new("52"),
        FuelbedId::new("999"),
        FuelbedId::new("998"),
    ];
    let err = ConsumptionEngine::new()
        .compute(&input, &FixtureProvider, &[])
        .unwrap_err();
    match err {
        EngineError::Lookup(LookupError::UnknownFuelbed(ids)) => {
            assert_eq!(ids, vec!["999".to_string(), "998".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn out_of_range_parameters_fail_before_computing() {
    let mut input = natural_input(2);
    input.fm_duff = InputVar::Vector(vec![50.0, 500.0]);
    let err = ConsumptionEngine::new()
        .compute(&input, &FixtureProvider, &[])
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(err.to_string().contains("fm_duff[1] = 500"));
}

#[test]
fn loading_overrides_change_one_row_only() {
    let input = natural_input(3);
    let overrides = [LoadingOverride {
        scenario: 1,
        field: "litter_depth".to_string(),
        value: 0.0,
    }];
    let results = ConsumptionEngine::new()
        .compute(&input, &FixtureProvider, &overrides)
        .unwrap();
    let litter = results.group(FuelGroup::LitterLichenMoss);
    assert!(litter.total[0] > 0.0);
    assert!(litter.total[1] < litter.total[0]);
    assert_eq!(litter.total[2].to_bits(), litter.total[0].to_bits());
}

#[test]
fn absolute_units_scale_with_area() {
    let mut per_area = natural_input(1);
    per_area.units = ConsumptionUnit::TonsPerAcre;
    let mut absolute = natural_input(1);
    absolute.units = ConsumptionUnit::Tons;

    let engine = ConsumptionEngine::new();
    let pa = engine.compute(&per_area, &FixtureProvider, &[]).unwrap();
    let abs = engine.compute(&absolute, &FixtureProvider, &[]).unwrap();
    // area is 100 acres
    assert_relative_eq!(abs.summary.total[0], pa.summary.total[0] * 100.0, epsilon = 1e-6);
}
