//! Greedy diagonal banded chaining.
//!
//! Input hits must be in hit-sort order (see [`SeedHit::packed`]): all hits
//! of one `(target_id, target_rev)` pair contiguous, diagonals monotone
//! within the group. A single left-to-right sweep then segments the list
//! into candidate overlaps.

use crate::common::Overlap;
use crate::error::{Error, Result};
use crate::mapper::seed_hit::SeedHit;
use crate::seeddb::index_cache::SeedDBIndexCache;
use crate::sequence::Sequence;

/// Packs `(target_pos, query_pos)` into one word so the min/max endpoint
/// trackers reduce to plain integer comparisons.
#[inline]
fn pos_combo(hit: &SeedHit) -> u64 {
    (((hit.target_pos as u32) as u64) << 32) | ((hit.query_pos as u32) as u64)
}

/// Builds a candidate overlap from the hit group `[begin_id, end_id)` whose
/// extreme positions sit at `min_pos_id` / `max_pos_id`.
fn make_overlap(
    sorted_hits: &[SeedHit],
    query: &Sequence,
    cache: &SeedDBIndexCache,
    begin_id: usize,
    end_id: usize,
    min_pos_id: usize,
    max_pos_id: usize,
) -> Result<Overlap> {
    let begin_hit = &sorted_hits[min_pos_id];
    let end_hit = &sorted_hits[max_pos_id];

    if end_hit.target_id != begin_hit.target_id {
        return Err(Error::InvariantViolation(format!(
            "the targetId of the first and last hit of a chain does not match: {} vs {}",
            begin_hit.target_id, end_hit.target_id
        )));
    }

    let num_seeds = (end_id - begin_id) as i32;
    let target_len = cache.seeds_line(begin_hit.target_id)?.num_bases;

    Ok(Overlap::new(
        query.id,
        begin_hit.target_id,
        num_seeds as f32,
        0.0,
        false,
        begin_hit.query_pos,
        end_hit.query_pos,
        query.len() as i32,
        begin_hit.target_rev,
        begin_hit.target_pos,
        end_hit.target_pos,
        target_len,
        -1,
        num_seeds,
    ))
}

fn admit(
    ovl: &Overlap,
    min_num_seeds: i32,
    min_chain_span: i32,
    skip_self_hits: bool,
    skip_symmetric_overlaps: bool,
) -> bool {
    ovl.num_seeds >= min_num_seeds
        && ovl.a_span() > min_chain_span
        && ovl.b_span() > min_chain_span
        && (!skip_self_hits || ovl.b_id != ovl.a_id)
        && (!skip_symmetric_overlaps || ovl.b_id < ovl.a_id)
}

#[allow(clippy::too_many_arguments)]
pub fn form_diagonal_anchors(
    sorted_hits: &[SeedHit],
    query: &Sequence,
    cache: &SeedDBIndexCache,
    chain_bandwidth: i32,
    min_num_seeds: i32,
    min_chain_span: i32,
    skip_self_hits: bool,
    skip_symmetric_overlaps: bool,
) -> Result<Vec<Overlap>> {
    if sorted_hits.is_empty() {
        return Ok(Vec::new());
    }

    let mut overlaps = Vec::new();
    let num_hits = sorted_hits.len();

    let mut begin_id = 0usize;
    let mut begin_diag = sorted_hits[0].diagonal();
    let mut min_combo = pos_combo(&sorted_hits[0]);
    let mut max_combo = min_combo;
    let mut min_pos_id = 0usize;
    let mut max_pos_id = 0usize;

    for i in 0..num_hits {
        let first_hit = &sorted_hits[begin_id];
        let curr_hit = &sorted_hits[i];
        let curr_diag = curr_hit.diagonal();
        let diag_diff = (curr_diag - begin_diag).abs();
        let curr_combo = pos_combo(curr_hit);

        if curr_hit.target_id != first_hit.target_id
            || curr_hit.target_rev != first_hit.target_rev
            || diag_diff > chain_bandwidth
        {
            let ovl = make_overlap(sorted_hits, query, cache, begin_id, i, min_pos_id, max_pos_id)?;
            begin_id = i;
            begin_diag = curr_diag;
            if admit(
                &ovl,
                min_num_seeds,
                min_chain_span,
                skip_self_hits,
                skip_symmetric_overlaps,
            ) {
                overlaps.push(ovl);
            }
            min_pos_id = i;
            max_pos_id = i;
            min_combo = curr_combo;
            max_combo = curr_combo;
        }

        if curr_combo < min_combo {
            min_pos_id = i;
            min_combo = curr_combo;
        }
        if curr_combo > max_combo {
            max_pos_id = i;
            max_combo = curr_combo;
        }
    }

    // The sweep always leaves one open group behind.
    let ovl = make_overlap(
        sorted_hits,
        query,
        cache,
        begin_id,
        num_hits,
        min_pos_id,
        max_pos_id,
    )?;
    if admit(
        &ovl,
        min_num_seeds,
        min_chain_span,
        skip_self_hits,
        skip_symmetric_overlaps,
    ) {
        overlaps.push(ovl);
    }

    Ok(overlaps)
}
