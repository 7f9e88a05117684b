//! The overlap record shared by the chainer, aligner and filters, plus the
//! tabular M4 output writer.

use std::io::Write;

use crate::error::Result;

/// One candidate or final overlap between a query (A) and a target (B).
///
/// Created by the chainer with seed-span endpoints, refined exactly once by
/// the aligner, then treated as immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub a_id: i32,
    pub b_id: i32,
    /// Seed count at chain time, `-max(a_span, b_span)` after alignment.
    pub score: f32,
    /// Percent identity; `0` until the aligner fills it in.
    pub identity: f32,
    pub a_rev: bool,
    pub a_start: i32,
    pub a_end: i32,
    pub a_len: i32,
    pub b_rev: bool,
    /// B coordinates are in strand space: when `b_rev` they count from the
    /// end of the forward target.
    pub b_start: i32,
    pub b_end: i32,
    pub b_len: i32,
    /// `-1` until the aligner fills it in.
    pub edit_distance: i32,
    pub num_seeds: i32,
}

impl Overlap {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        a_id: i32,
        b_id: i32,
        score: f32,
        identity: f32,
        a_rev: bool,
        a_start: i32,
        a_end: i32,
        a_len: i32,
        b_rev: bool,
        b_start: i32,
        b_end: i32,
        b_len: i32,
        edit_distance: i32,
        num_seeds: i32,
    ) -> Overlap {
        debug_assert!(0 <= a_start && a_start <= a_end && a_end <= a_len);
        debug_assert!(0 <= b_start && b_start <= b_end && b_end <= b_len);
        Overlap {
            a_id,
            b_id,
            score,
            identity,
            a_rev,
            a_start,
            a_end,
            a_len,
            b_rev,
            b_start,
            b_end,
            b_len,
            edit_distance,
            num_seeds,
        }
    }

    pub fn a_span(&self) -> i32 {
        self.a_end - self.a_start
    }

    pub fn b_span(&self) -> i32 {
        self.b_end - self.b_start
    }
}

/// Writes one overlap as an M4 line:
/// `Aname Bname score identity Arev Astart Aend Alen Brev Bstart Bend Blen`.
/// B coordinates are reported on the forward strand.
pub fn write_m4<W: Write>(
    writer: &mut W,
    ovl: &Overlap,
    a_name: &str,
    b_name: &str,
) -> Result<()> {
    let (b_start, b_end) = if ovl.b_rev {
        (ovl.b_len - ovl.b_end, ovl.b_len - ovl.b_start)
    } else {
        (ovl.b_start, ovl.b_end)
    };
    writeln!(
        writer,
        "{} {} {} {:.2} {} {} {} {} {} {} {} {}",
        a_name,
        b_name,
        ovl.score as i64,
        ovl.identity,
        ovl.a_rev as i32,
        ovl.a_start,
        ovl.a_end,
        ovl.a_len,
        ovl.b_rev as i32,
        b_start,
        b_end,
        ovl.b_len,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlap() -> Overlap {
        Overlap::new(
            7, 3, -900.0, 99.5, false, 10, 910, 1000, true, 50, 900, 1000, 5, 40,
        )
    }

    #[test]
    fn test_spans() {
        let ovl = overlap();
        assert_eq!(ovl.a_span(), 900);
        assert_eq!(ovl.b_span(), 850);
    }

    #[test]
    fn test_m4_reflects_reverse_coordinates() {
        let mut out = Vec::new();
        write_m4(&mut out, &overlap(), "qry", "tgt").unwrap();
        let line = String::from_utf8(out).unwrap();
        assert_eq!(
            line.trim(),
            "qry tgt -900 99.50 0 10 910 1000 1 100 950 1000"
        );
    }
}
