//! Batch deduplication of identical scenario tuples
//!
//! Reference databases are coarse: a thousand-row scenario file routinely
//! contains a handful of distinct (fuelbed, moisture, ...) tuples. The
//! deduplicator collapses the validated batch to its unique tuples, the
//! equations run once per unique tuple, and the results are replayed back
//! into original order. Disabling it must produce bit-identical results;
//! it is an optimization, never a semantic change.

use crate::settings::{BurnParams, ScenarioBatch};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Hashable fingerprint of one scenario's varying parameters.
///
/// Only parameters that actually vary across the batch enter the key;
/// batch-constant parameters cannot distinguish rows. Floats are compared
/// by bit pattern, which is exact for values that came from the same input.
#[derive(Clone, PartialEq, Eq, Hash)]
struct RunKey {
    fuelbed: Option<String>,
    bits: Vec<u64>,
    /// Set for rows carrying a loading override; such rows never merge.
    forced: Option<usize>,
}

fn varies<T: PartialEq>(values: &[T]) -> bool {
    values.windows(2).any(|w| w[0] != w[1])
}

/// Mapping from original scenario positions onto unique-run positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueRunIndex {
    /// `map[original] == unique` position whose result row applies.
    map: Vec<usize>,
    /// Original row chosen as representative of each unique position.
    representatives: Vec<usize>,
}

impl UniqueRunIndex {
    /// Fingerprint every row of the batch and group identical tuples.
    ///
    /// `forced_unique` lists original positions that must stay singletons
    /// (rows whose loadings were customized away from the fuelbed record).
    pub fn build(batch: &ScenarioBatch, forced_unique: &[usize]) -> UniqueRunIndex {
        let n = batch.len();

        // Collect the extractors for every parameter that varies.
        let mut float_fields: Vec<&[f64]> = Vec::new();
        for field in [
            &batch.area,
            &batch.fm_1000hr,
            &batch.fm_duff,
            &batch.canopy_consumption_pct,
            &batch.shrub_blackened_pct,
            &batch.pile_blackened_pct,
        ] {
            if varies(field) {
                float_fields.push(field);
            }
        }
        let mut enum_fields: Vec<Vec<u64>> = Vec::new();
        if varies(&batch.ecoregion) {
            enum_fields.push(batch.ecoregion.iter().map(|e| *e as u64).collect());
        }
        if let BurnParams::Activity(a) = &batch.burn {
            for field in [
                &a.fm_10hr,
                &a.slope,
                &a.windspeed,
                &a.days_since_rain,
                &a.length_of_ignition,
            ] {
                if varies(field) {
                    float_fields.push(field);
                }
            }
            if varies(&a.fm_type) {
                enum_fields.push(a.fm_type.iter().map(|t| *t as u64).collect());
            }
        }
        let id_varies = varies(&batch.fuelbeds);

        let mut slots: FxHashMap<RunKey, usize> = FxHashMap::default();
        let mut map = Vec::with_capacity(n);
        let mut representatives = Vec::new();
        for i in 0..n {
            let mut bits: Vec<u64> =
                float_fields.iter().map(|f| f[i].to_bits()).collect();
            bits.extend(enum_fields.iter().map(|f| f[i]));
            let key = RunKey {
                fuelbed: id_varies.then(|| batch.fuelbeds[i].0.clone()),
                bits,
                forced: forced_unique.contains(&i).then_some(i),
            };
            let next = representatives.len();
            let slot = *slots.entry(key).or_insert_with(|| {
                representatives.push(i);
                next
            });
            map.push(slot);
        }

        debug!(
            original = n,
            unique = representatives.len(),
            "scenario batch deduplicated"
        );
        UniqueRunIndex { map, representatives }
    }

    /// Identity index: every row is its own unique run (dedup disabled).
    pub fn identity(n: usize) -> UniqueRunIndex {
        UniqueRunIndex {
            map: (0..n).collect(),
            representatives: (0..n).collect(),
        }
    }

    pub fn unique_count(&self) -> usize {
        self.representatives.len()
    }

    pub fn original_count(&self) -> usize {
        self.map.len()
    }

    /// Original row indices representing each unique run, for compressing
    /// the batch (and its aligned loadings) before computation.
    pub fn representatives(&self) -> &[usize] {
        &self.representatives
    }

    /// Replay a unique-run vector back to original order and length.
    pub fn expand(&self, unique_values: &[f64]) -> Vec<f64> {
        debug_assert_eq!(unique_values.len(), self.unique_count());
        self.map.iter().map(|&u| unique_values[u]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{ConsumptionUnit, Ecoregion, FuelbedId};
    use crate::settings::ScenarioBatch;

    fn batch(fm_duff: Vec<f64>, ids: Vec<&str>) -> ScenarioBatch {
        let n = ids.len();
        ScenarioBatch {
            fuelbeds: ids.into_iter().map(FuelbedId::new).collect(),
            area: vec![100.0; n],
            ecoregion: vec![Ecoregion::Western; n],
            fm_1000hr: vec![50.0; n],
            fm_duff,
            canopy_consumption_pct: vec![25.0; n],
            shrub_blackened_pct: vec![25.0; n],
            pile_blackened_pct: vec![0.0; n],
            units: ConsumptionUnit::TonsPerAcre,
            burn: crate::settings::BurnParams::Natural,
        }
    }

    #[test]
    fn identical_rows_collapse() {
        let b = batch(vec![40.0, 50.0, 40.0], vec!["1", "1", "1"]);
        let idx = UniqueRunIndex::build(&b, &[]);
        assert_eq!(idx.unique_count(), 2);
        assert_eq!(idx.original_count(), 3);
        // rows 0 and 2 share a slot
        let expanded = idx.expand(&[1.5, 2.5]);
        assert_eq!(expanded, vec![1.5, 2.5, 1.5]);
    }

    #[test]
    fn fully_constant_batch_is_one_run() {
        let b = batch(vec![50.0; 4], vec!["7", "7", "7", "7"]);
        let idx = UniqueRunIndex::build(&b, &[]);
        assert_eq!(idx.unique_count(), 1);
        assert_eq!(idx.expand(&[9.0]), vec![9.0; 4]);
    }

    #[test]
    fn differing_fuelbeds_do_not_merge() {
        let b = batch(vec![50.0; 3], vec!["1", "2", "1"]);
        let idx = UniqueRunIndex::build(&b, &[]);
        assert_eq!(idx.unique_count(), 2);
        assert_eq!(idx.representatives(), &[0, 1]);
    }

    #[test]
    fn forced_unique_rows_stay_singletons() {
        let b = batch(vec![50.0; 3], vec!["1", "1", "1"]);
        let idx = UniqueRunIndex::build(&b, &[1]);
        // row 1 carries an override: it must not share row 0's run
        assert_eq!(idx.unique_count(), 2);
        let expanded = idx.expand(&[3.0, 4.0]);
        assert_eq!(expanded, vec![3.0, 4.0, 3.0]);
    }

    #[test]
    fn identity_index_is_transparent() {
        let idx = UniqueRunIndex::identity(3);
        assert_eq!(idx.unique_count(), 3);
        assert_eq!(idx.expand(&[1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0]);
    }
}
