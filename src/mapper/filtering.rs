//! Overlap filters: the tandem-repeat dedup and the final threshold pass.

use crate::common::Overlap;

/// Keeps one overlap per distinct target: the one with the largest
/// `max(a_span, b_span)`. Multiple chains against the same target are the
/// signature of tandem repeats.
pub fn filter_tandem_overlaps(overlaps: Vec<Overlap>) -> Vec<Overlap> {
    if overlaps.is_empty() {
        return overlaps;
    }

    let mut sorted = overlaps;
    sorted.sort_by(|a, b| {
        a.b_id.cmp(&b.b_id).then_with(|| {
            b.a_span()
                .max(b.b_span())
                .cmp(&a.a_span().max(a.b_span()))
        })
    });

    let mut ret: Vec<Overlap> = Vec::new();
    for ovl in sorted {
        if ret.last().map_or(true, |kept| kept.b_id != ovl.b_id) {
            ret.push(ovl);
        }
    }
    ret
}

/// Final quality and length thresholds; input order is preserved.
pub fn filter_overlaps(
    overlaps: Vec<Overlap>,
    min_num_seeds: i32,
    min_identity: f32,
    min_mapped_span: i32,
    min_query_len: i32,
    min_target_len: i32,
) -> Vec<Overlap> {
    overlaps
        .into_iter()
        .filter(|ovl| {
            ovl.identity >= min_identity
                && ovl.a_span() >= min_mapped_span
                && ovl.b_span() >= min_mapped_span
                && ovl.num_seeds >= min_num_seeds
                && ovl.a_len >= min_query_len
                && ovl.b_len >= min_target_len
        })
        .collect()
}
