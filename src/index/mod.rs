//! The in-memory seed index: a radix-sorted seed array plus a hash from
//! seed key to the `[start, end)` run of its occurrences.
//!
//! Built once over the target seeds, then shared read-only across any
//! number of concurrent mapping calls.

pub mod radix;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::mapper::seed_hit::SeedHit;
use crate::seeddb::index_cache::SeedDBIndexCache;
use crate::seeddb::seed::{Seed, SeedRaw};

/// Frequency statistics over the non-empty hash buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrequencyStats {
    pub max: i64,
    pub avg: f64,
    pub median: f64,
    /// Bucket-size cutoff at the requested percentile rank.
    pub cutoff: i64,
}

pub struct SeedIndex {
    cache: Arc<SeedDBIndexCache>,
    seeds: Vec<SeedRaw>,
    hash: FxHashMap<u64, (i64, i64)>,
}

impl SeedIndex {
    /// Takes ownership of the seed array, sorts it in place by the full
    /// packed word and records each maximal equal-key run into the hash.
    pub fn new(cache: Arc<SeedDBIndexCache>, mut seeds: Vec<SeedRaw>) -> SeedIndex {
        let mut hash = FxHashMap::default();
        if !seeds.is_empty() {
            radix::radix_sort(&mut seeds);
            // The seed count is an upper bound on the number of distinct keys.
            hash.reserve(seeds.len());
            let mut run_start = 0usize;
            for i in 1..=seeds.len() {
                if i == seeds.len()
                    || Seed::decode_key(seeds[i]) != Seed::decode_key(seeds[run_start])
                {
                    hash.insert(
                        Seed::decode_key(seeds[run_start]),
                        (run_start as i64, i as i64),
                    );
                    run_start = i;
                }
            }
            debug!(
                seeds = seeds.len(),
                keys = hash.len(),
                "built seed index"
            );
        }
        SeedIndex { cache, seeds, hash }
    }

    pub fn cache(&self) -> &Arc<SeedDBIndexCache> {
        &self.cache
    }

    pub fn num_seeds(&self) -> usize {
        self.seeds.len()
    }

    /// All raw seeds carrying `key`; empty when the key is not indexed.
    pub fn get_seeds(&self, key: u64) -> &[SeedRaw] {
        match self.hash.get(&key) {
            Some(&(start, end)) => &self.seeds[start as usize..end as usize],
            None => &[],
        }
    }

    /// Collects one [`SeedHit`] per indexed occurrence of each query seed's
    /// key. Buckets larger than `freq_cutoff` are skipped entirely;
    /// `freq_cutoff = 0` disables the filter.
    ///
    /// When the query and target seeds disagree on strand, the hit is
    /// flagged reverse and the target position is reflected onto the
    /// forward strand using the sequence length and the seed span.
    pub fn collect_hits(&self, query_seeds: &[SeedRaw], freq_cutoff: i64) -> Result<Vec<SeedHit>> {
        let span = self.cache.params.seed_span();
        let mut hits = Vec::new();
        for &raw in query_seeds {
            let query = Seed::from_raw(raw);
            let Some(&(start, end)) = self.hash.get(&query.key) else {
                continue;
            };
            if freq_cutoff > 0 && (end - start) > freq_cutoff {
                continue;
            }
            for i in start..end {
                let target = Seed::from_raw(self.seeds[i as usize]);
                let mut target_pos = target.pos;
                let mut is_rev = false;
                if query.rev != target.rev {
                    is_rev = true;
                    let sl = self.cache.seeds_line(target.seq_id)?;
                    target_pos = sl.num_bases - (target.pos + span);
                }
                hits.push(SeedHit::new(target.seq_id, is_rev, target_pos, query.pos));
            }
        }
        Ok(hits)
    }

    /// Max, mean, median and percentile-rank cutoff over the non-empty
    /// bucket sizes. The percentile must lie in `[0, 1]`; an empty index
    /// yields all zeros.
    pub fn compute_frequency_stats(&self, percentile_cutoff: f64) -> Result<FrequencyStats> {
        if !(0.0..=1.0).contains(&percentile_cutoff) {
            return Err(Error::InvalidArgument(format!(
                "percentile cutoff must be in [0.0, 1.0], got {}",
                percentile_cutoff
            )));
        }
        if self.hash.is_empty() {
            return Ok(FrequencyStats::default());
        }

        let mut freqs: Vec<i64> = Vec::with_capacity(self.hash.len());
        let mut sum = 0.0f64;
        for &(start, end) in self.hash.values() {
            let span = end - start;
            if span == 0 {
                continue;
            }
            freqs.push(span);
            sum += span as f64;
        }
        freqs.sort_unstable();

        let n = freqs.len();
        let cutoff_id = (((n as f64) * (1.0 - percentile_cutoff)).floor() as usize).min(n - 1);
        Ok(FrequencyStats {
            max: freqs[n - 1],
            avg: sum / n as f64,
            median: (freqs[n / 2] + freqs[(n - 1) / 2]) as f64 / 2.0,
            cutoff: freqs[cutoff_id],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeddb::index_cache::{SeedDBSeedsLine, SeedParams};

    /// Cache with `n` sequences of the given lengths; seeds-file fields
    /// are irrelevant for in-memory index tests.
    fn cache_with_lengths(lengths: &[i32], kmer_size: i32) -> Arc<SeedDBIndexCache> {
        let mut cache = SeedDBIndexCache {
            version: "0.1.0".to_string(),
            params: SeedParams {
                kmer_size,
                ..SeedParams::default()
            },
            ..SeedDBIndexCache::default()
        };
        for (i, &len) in lengths.iter().enumerate() {
            cache.seeds_lines.push(SeedDBSeedsLine {
                seq_id: i as i32,
                header: format!("seq-{}", i),
                num_bases: len,
                ..SeedDBSeedsLine::default()
            });
        }
        Arc::new(cache)
    }

    #[test]
    fn test_empty_seed_array() {
        let index = SeedIndex::new(cache_with_lengths(&[100], 30), Vec::new());
        assert_eq!(index.num_seeds(), 0);
        assert!(index.get_seeds(12345).is_empty());
        assert_eq!(
            index.compute_frequency_stats(0.5).unwrap(),
            FrequencyStats::default()
        );
        assert!(index.collect_hits(&[Seed::encode(1, 0, 0, false)], 0).unwrap().is_empty());
    }

    #[test]
    fn test_get_seeds_all_share_key() {
        let seeds = vec![
            Seed::encode(7, 0, 10, false),
            Seed::encode(3, 0, 20, false),
            Seed::encode(7, 1, 30, false),
            Seed::encode(9, 0, 40, false),
            Seed::encode(7, 2, 50, true),
        ];
        let index = SeedIndex::new(cache_with_lengths(&[100, 100, 100], 30), seeds);
        let bucket = index.get_seeds(7);
        assert_eq!(bucket.len(), 3);
        for &raw in bucket {
            assert_eq!(Seed::decode_key(raw), 7);
        }
        assert_eq!(index.get_seeds(3).len(), 1);
        assert!(index.get_seeds(1000).is_empty());
    }

    #[test]
    fn test_collect_hits_forward() {
        let seeds = vec![Seed::encode(11, 0, 25, false)];
        let index = SeedIndex::new(cache_with_lengths(&[100], 30), seeds);
        let hits = index
            .collect_hits(&[Seed::encode(11, 0, 5, false)], 0)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target_id, 0);
        assert!(!hits[0].target_rev);
        assert_eq!(hits[0].target_pos, 25);
        assert_eq!(hits[0].query_pos, 5);
    }

    #[test]
    fn test_collect_hits_strand_reflection() {
        // Query (key=K, pos=10, fwd) against target seed (key=K, seqId=4,
        // pos=20, rev) in a 100-base sequence with k=30 reflects the
        // target position to 100 - (20 + 30) = 50.
        let seeds = vec![Seed::encode(99, 4, 20, true)];
        let index = SeedIndex::new(cache_with_lengths(&[50, 50, 50, 50, 100], 30), seeds);
        let hits = index
            .collect_hits(&[Seed::encode(99, 0, 10, false)], 0)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target_id, 4);
        assert!(hits[0].target_rev);
        assert_eq!(hits[0].target_pos, 50);
        assert_eq!(hits[0].query_pos, 10);
    }

    #[test]
    fn test_collect_hits_frequency_filter() {
        let seeds = vec![
            Seed::encode(5, 0, 0, false),
            Seed::encode(5, 0, 10, false),
            Seed::encode(5, 0, 20, false),
            Seed::encode(8, 0, 30, false),
        ];
        let index = SeedIndex::new(cache_with_lengths(&[100], 30), seeds);
        let query = [Seed::encode(5, 0, 1, false), Seed::encode(8, 0, 2, false)];
        // Cutoff of 2 drops the size-3 bucket.
        assert_eq!(index.collect_hits(&query, 2).unwrap().len(), 1);
        // Cutoff of 0 disables the filter.
        assert_eq!(index.collect_hits(&query, 0).unwrap().len(), 4);
    }

    #[test]
    fn test_frequency_stats() {
        // Bucket sizes: key 1 -> 1, key 2 -> 2, key 3 -> 3, key 4 -> 4.
        let mut seeds = Vec::new();
        for key in 1..=4u64 {
            for occ in 0..key {
                seeds.push(Seed::encode(key, 0, occ as i32, false));
            }
        }
        let index = SeedIndex::new(cache_with_lengths(&[100], 30), seeds);
        let stats = index.compute_frequency_stats(0.25).unwrap();
        assert_eq!(stats.max, 4);
        assert!((stats.avg - 2.5).abs() < 1e-9);
        assert!((stats.median - 2.5).abs() < 1e-9);
        // floor(4 * 0.75) = 3 -> ascending rank 3 -> bucket size 4.
        assert_eq!(stats.cutoff, 4);
    }

    #[test]
    fn test_frequency_stats_invalid_percentile() {
        let index = SeedIndex::new(
            cache_with_lengths(&[100], 30),
            vec![Seed::encode(1, 0, 0, false)],
        );
        assert!(matches!(
            index.compute_frequency_stats(-0.1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            index.compute_frequency_stats(1.5),
            Err(Error::InvalidArgument(_))
        ));
    }
}
