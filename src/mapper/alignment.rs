//! Two-pass banded extension around the chained anchor.
//!
//! Each candidate is first extended rightwards from `(a_start, b_start)`,
//! then leftwards using a reverse-complemented copy of the query, so both
//! passes run the same forward-only SES primitive. Reverse-strand target
//! windows rely on the fact that a leftward walk on one strand is a
//! complemented rightward walk on the other.

use crate::align::ses_banded::ses_distance_banded;
use crate::common::Overlap;
use crate::error::{Error, Result};
use crate::sequence::{reverse_complement, Sequence, SequenceStore};

/// Copies `[start, end)` of the target, reverse complemented on request.
/// An empty range yields an empty sequence; inconsistent bounds are an
/// error.
pub fn fetch_target_subsequence(
    target: &Sequence,
    start: i32,
    end: i32,
    rev_cmp: bool,
) -> Result<Vec<u8>> {
    let len = target.len() as i32;
    if start == end {
        return Ok(Vec::new());
    }
    if start < 0 || end < 0 || start > len || end > len || end < start {
        return Err(Error::InvalidRange { start, end, len });
    }
    let sub = &target.bases[start as usize..end as usize];
    Ok(if rev_cmp {
        reverse_complement(sub)
    } else {
        sub.to_vec()
    })
}

/// Refines one candidate's endpoints, edit distance, score and identity.
pub fn align_overlap(
    target: &Sequence,
    query: &Sequence,
    rev_query: &[u8],
    ovl: &Overlap,
    align_bandwidth: f64,
    align_max_diff: f64,
) -> Result<Overlap> {
    let mut ret = ovl.clone();
    let d_max_total = (ovl.a_len as f64 * align_max_diff) as i32;
    let bandwidth = (ovl.a_len.min(ovl.b_len) as f64 * align_bandwidth) as i32;

    // Forward pass: (a_start, b_start) towards (a_len, b_len).
    let diffs_right = {
        let q_start = ovl.a_start as usize;
        let q_span = (ovl.a_len - ovl.a_start) as usize;
        let t_seq = if ovl.b_rev {
            // Window [b_start, b_len) in reverse-strand coordinates.
            fetch_target_subsequence(target, 0, ovl.b_len - ovl.b_start, true)?
        } else {
            fetch_target_subsequence(target, ovl.b_start, ovl.b_len, false)?
        };
        let res = ses_distance_banded(
            &query.bases[q_start..q_start + q_span],
            &t_seq,
            d_max_total,
            bandwidth,
        );
        ret.a_end = ovl.a_start + res.last_query_pos;
        ret.b_end = ovl.b_start + res.last_target_pos;
        ret.edit_distance = res.diffs;
        ret.score = -(ret.a_span().max(ret.b_span()) as f32);
        res.diffs
    };

    // Reverse pass: leftwards from the original (a_start, b_start), on the
    // reverse-complemented query with whatever diff budget remains.
    {
        let q_start = (ret.a_len - ovl.a_start) as usize;
        let q_span = ovl.a_start as usize;
        let t_seq = if ovl.b_rev {
            fetch_target_subsequence(target, ovl.b_len - ovl.b_start, ovl.b_len, false)?
        } else {
            fetch_target_subsequence(target, 0, ovl.b_start, true)?
        };
        let d_max = d_max_total - diffs_right;
        let res = ses_distance_banded(
            &rev_query[q_start..q_start + q_span],
            &t_seq,
            d_max,
            bandwidth,
        );
        ret.a_start = ovl.a_start - res.last_query_pos;
        ret.b_start = ovl.b_start - res.last_target_pos;
        ret.edit_distance = diffs_right + res.diffs;
    }

    let span = ret.a_span().max(ret.b_span());
    ret.score = -(span as f32);
    ret.identity = if span > 0 {
        100.0 * (span - ret.edit_distance) as f32 / span as f32
    } else {
        -2.0
    };
    Ok(ret)
}

/// Aligns every candidate against target bases fetched from the store.
pub fn align_overlaps<S: SequenceStore>(
    targets: &S,
    query: &Sequence,
    overlaps: Vec<Overlap>,
    align_bandwidth: f64,
    align_max_diff: f64,
) -> Result<Vec<Overlap>> {
    let rev_query = reverse_complement(&query.bases);
    overlaps
        .iter()
        .map(|ovl| {
            let target = targets.get_sequence(ovl.b_id)?;
            align_overlap(target, query, &rev_query, ovl, align_bandwidth, align_max_diff)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(id: i32, bases: &[u8]) -> Sequence {
        Sequence {
            id,
            name: format!("s{}", id),
            bases: bases.to_vec(),
        }
    }

    /// Deterministic 1000-base sequence with all four letters.
    fn noisy_bases(n: usize) -> Vec<u8> {
        let mut state: u64 = 12345;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                b"ACGT"[(state >> 33) as usize % 4]
            })
            .collect()
    }

    #[test]
    fn test_fetch_subsequence_bounds() {
        let target = seq(0, b"ACGTACGT");
        assert_eq!(fetch_target_subsequence(&target, 2, 6, false).unwrap(), b"GTAC");
        assert_eq!(fetch_target_subsequence(&target, 2, 6, true).unwrap(), b"GTAC");
        assert!(fetch_target_subsequence(&target, 3, 3, false).unwrap().is_empty());
        assert!(matches!(
            fetch_target_subsequence(&target, -1, 3, false),
            Err(Error::InvalidRange { .. })
        ));
        assert!(matches!(
            fetch_target_subsequence(&target, 0, 9, false),
            Err(Error::InvalidRange { .. })
        ));
        assert!(matches!(
            fetch_target_subsequence(&target, 5, 2, false),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_identical_sequences_align_end_to_end() {
        let bases = noisy_bases(1000);
        let query = seq(0, &bases);
        let target = seq(1, &bases);
        let rev_query = reverse_complement(&query.bases);
        // Anchor somewhere in the middle, as a chain would provide.
        let anchor = Overlap::new(
            0, 1, 4.0, 0.0, false, 300, 700, 1000, false, 300, 700, 1000, -1, 4,
        );
        let aligned = align_overlap(&target, &query, &rev_query, &anchor, 0.01, 0.03).unwrap();
        assert_eq!((aligned.a_start, aligned.a_end), (0, 1000));
        assert_eq!((aligned.b_start, aligned.b_end), (0, 1000));
        assert_eq!(aligned.edit_distance, 0);
        assert_eq!(aligned.identity, 100.0);
        assert_eq!(aligned.score, -1000.0);
    }

    #[test]
    fn test_identity_reflects_edit_distance() {
        // Ten substitutions across 1000 bases: identity 99.0, score -1000.
        let bases = noisy_bases(1000);
        let mut mutated = bases.clone();
        for i in 0..10 {
            let pos = 50 + i * 90;
            mutated[pos] = match mutated[pos] {
                b'A' => b'C',
                b'C' => b'G',
                b'G' => b'T',
                _ => b'A',
            };
        }
        let query = seq(0, &bases);
        let target = seq(1, &mutated);
        let rev_query = reverse_complement(&query.bases);
        let anchor = Overlap::new(
            0, 1, 4.0, 0.0, false, 0, 900, 1000, false, 0, 900, 1000, -1, 4,
        );
        let aligned = align_overlap(&target, &query, &rev_query, &anchor, 0.05, 0.05).unwrap();
        assert_eq!(aligned.edit_distance, 10);
        assert_eq!((aligned.a_start, aligned.a_end), (0, 1000));
        assert_eq!(aligned.identity, 99.0);
        assert_eq!(aligned.score, -1000.0);
    }

    #[test]
    fn test_reverse_strand_alignment() {
        // Query equals the reverse complement of the target; the chain
        // anchor carries reflected target coordinates.
        let bases = noisy_bases(600);
        let target = seq(1, &bases);
        let query = seq(0, &reverse_complement(&bases));
        let rev_query = reverse_complement(&query.bases);
        let anchor = Overlap::new(
            0, 1, 4.0, 0.0, false, 200, 400, 600, true, 200, 400, 600, -1, 4,
        );
        let aligned = align_overlap(&target, &query, &rev_query, &anchor, 0.02, 0.03).unwrap();
        assert_eq!((aligned.a_start, aligned.a_end), (0, 600));
        assert_eq!((aligned.b_start, aligned.b_end), (0, 600));
        assert_eq!(aligned.edit_distance, 0);
        assert_eq!(aligned.identity, 100.0);
    }
}
