//! The mapper: collects seed hits for one query against the seed index,
//! chains them along diagonals, filters and aligns the candidates.
//!
//! A [`Mapper`] is stateless apart from its settings; `map` may be invoked
//! concurrently for distinct queries sharing one index and target store.

pub mod alignment;
pub mod chaining;
pub mod filtering;
pub mod seed_hit;

pub use seed_hit::SeedHit;

use tracing::trace;

use crate::common::Overlap;
use crate::config::OverlapSettings;
use crate::error::Result;
use crate::index::SeedIndex;
use crate::seeddb::seed::SeedRaw;
use crate::sequence::{Sequence, SequenceStore};

#[derive(Debug, Default)]
pub struct MapperResult {
    pub overlaps: Vec<Overlap>,
}

pub struct Mapper {
    settings: OverlapSettings,
}

impl Mapper {
    pub fn new(settings: OverlapSettings) -> Mapper {
        Mapper { settings }
    }

    pub fn settings(&self) -> &OverlapSettings {
        &self.settings
    }

    /// Maps one query against the indexed target set.
    ///
    /// Queries shorter than `min_query_len` return an empty result without
    /// touching the index or the store. Buckets larger than `freq_cutoff`
    /// are skipped during hit collection (`0` disables the filter).
    pub fn map<S: SequenceStore>(
        &self,
        targets: &S,
        index: &SeedIndex,
        query: &Sequence,
        query_seeds: &[SeedRaw],
        freq_cutoff: i64,
    ) -> Result<MapperResult> {
        if (query.len() as i64) < self.settings.min_query_len as i64 {
            return Ok(MapperResult::default());
        }

        let mut hits = index.collect_hits(query_seeds, freq_cutoff)?;
        hits.sort_unstable_by_key(|hit| hit.packed());

        let overlaps = chaining::form_diagonal_anchors(
            &hits,
            query,
            index.cache(),
            self.settings.chain_bandwidth,
            self.settings.min_num_seeds,
            self.settings.min_chain_span,
            self.settings.skip_self_hits,
            self.settings.skip_symmetric_overlaps,
        )?;
        trace!(query = %query.name, hits = hits.len(), anchors = overlaps.len(), "chained");

        let overlaps = if self.settings.one_hit_per_target {
            filtering::filter_tandem_overlaps(overlaps)
        } else {
            overlaps
        };

        let overlaps = alignment::align_overlaps(
            targets,
            query,
            overlaps,
            self.settings.align_bandwidth,
            self.settings.align_max_diff,
        )?;

        let overlaps = filtering::filter_overlaps(
            overlaps,
            self.settings.min_num_seeds,
            self.settings.min_identity,
            self.settings.min_mapped_len,
            self.settings.min_query_len,
            self.settings.min_target_len,
        );

        Ok(MapperResult { overlaps })
    }
}
