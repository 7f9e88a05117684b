//! Parser, in-memory model and serializer of the SeedDB text index.
//!
//! The index is line oriented; the first character of each line selects the
//! record type:
//!
//! ```text
//! V <version>
//! P k=<int>,w=<int>,hpc=<0|1>,hpc_len=<int>,rc=<0|1>
//! F <file_id> <filename> <num_sequences> <num_bytes>
//! S <seq_id> <header> <file_id> <file_offset> <num_bytes> <num_bases> <num_seeds>
//! B <block_id> <start_seq_id> <end_seq_id> <num_bytes>
//! ```
//!
//! The cache exclusively owns the parsed tables. It is loaded once and then
//! shared read-only with the seed index and the mapper.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};

/// Describes one `.seeds` data file accompanying the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedDBFileLine {
    pub file_id: i32,
    pub filename: String,
    pub num_sequences: i32,
    pub num_bytes: i64,
}

/// Locator and counts for one sequence's span of seeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedDBSeedsLine {
    pub seq_id: i32,
    pub header: String,
    pub file_id: i32,
    pub file_offset: i64,
    pub num_bytes: i64,
    pub num_bases: i32,
    pub num_seeds: i32,
}

/// A contiguous span of sequences forming one block of the seed universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedDBBlockLine {
    pub block_id: i32,
    pub start_seq_id: i32,
    pub end_seq_id: i32,
    pub num_bytes: i64,
}

impl SeedDBBlockLine {
    pub fn span(&self) -> i32 {
        self.end_seq_id - self.start_seq_id
    }
}

impl Default for SeedDBBlockLine {
    fn default() -> Self {
        SeedDBBlockLine {
            block_id: 0,
            start_seq_id: -1,
            end_seq_id: -1,
            num_bytes: 0,
        }
    }
}

/// Parameters the seeds were computed with. Consumed as metadata only; the
/// overlap core never modifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedParams {
    pub kmer_size: i32,
    pub minimizer_window: i32,
    pub use_hpc: bool,
    pub max_hpc_len: i32,
    pub use_rc: bool,
}

impl Default for SeedParams {
    fn default() -> Self {
        SeedParams {
            kmer_size: 30,
            minimizer_window: 80,
            use_hpc: false,
            max_hpc_len: 10,
            use_rc: true,
        }
    }
}

impl SeedParams {
    /// Number of target bases one seed covers, used to reflect a hit onto
    /// the forward strand. With homopolymer compression the true span
    /// varies per seed and is not recoverable from the parameters alone;
    /// callers that know the real span should use it instead of this value.
    pub fn seed_span(&self) -> i32 {
        self.kmer_size
    }
}

/// The parsed SeedDB index: header plus three parallel tables.
#[derive(Debug, Clone, Default)]
pub struct SeedDBIndexCache {
    pub version: String,
    pub params: SeedParams,
    pub file_lines: Vec<SeedDBFileLine>,
    pub seeds_lines: Vec<SeedDBSeedsLine>,
    pub block_lines: Vec<SeedDBBlockLine>,
}

fn parse_field<T: FromStr>(tok: Option<&str>, line: &str) -> Result<T> {
    tok.and_then(|t| t.parse::<T>().ok())
        .ok_or_else(|| Error::Parse(line.to_string()))
}

fn parse_params(body: &str, line: &str) -> Result<SeedParams> {
    let mut params = SeedParams::default();
    for clause in body.split(',') {
        if clause.is_empty() {
            continue;
        }
        let (name, value) = clause
            .split_once('=')
            .ok_or_else(|| Error::Parse(line.to_string()))?;
        match name {
            "k" => params.kmer_size = parse_field(Some(value), line)?,
            "w" => params.minimizer_window = parse_field(Some(value), line)?,
            "hpc" => params.use_hpc = parse_field::<i32>(Some(value), line)? != 0,
            "hpc_len" => params.max_hpc_len = parse_field(Some(value), line)?,
            "rc" => params.use_rc = parse_field::<i32>(Some(value), line)? != 0,
            // Unknown parameter names are ignored.
            _ => {}
        }
    }
    Ok(params)
}

impl SeedDBIndexCache {
    pub fn load(path: &Path) -> Result<SeedDBIndexCache> {
        let file = File::open(path)?;
        Self::load_from_reader(BufReader::new(file))
    }

    /// Parses the text index from any buffered reader. Blank lines are
    /// skipped; an unknown record type or a malformed record raises
    /// [`Error::Parse`] naming the offending line.
    pub fn load_from_reader<R: BufRead>(reader: R) -> Result<SeedDBIndexCache> {
        let mut cache = SeedDBIndexCache::default();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let token = line.as_bytes()[0];
            let body = &line[1..];
            let mut fields = body.split_whitespace();
            match token {
                b'V' => {
                    cache.version = parse_field(fields.next(), &line)?;
                }
                b'P' => {
                    // The whole remainder of the line is the parameter
                    // string; the parse stays line based so that it cannot
                    // truncate at embedded whitespace.
                    cache.params = parse_params(body.trim(), &line)?;
                }
                b'F' => {
                    cache.file_lines.push(SeedDBFileLine {
                        file_id: parse_field(fields.next(), &line)?,
                        filename: parse_field(fields.next(), &line)?,
                        num_sequences: parse_field(fields.next(), &line)?,
                        num_bytes: parse_field(fields.next(), &line)?,
                    });
                }
                b'S' => {
                    let sl = SeedDBSeedsLine {
                        seq_id: parse_field(fields.next(), &line)?,
                        header: parse_field(fields.next(), &line)?,
                        file_id: parse_field(fields.next(), &line)?,
                        file_offset: parse_field(fields.next(), &line)?,
                        num_bytes: parse_field(fields.next(), &line)?,
                        num_bases: parse_field(fields.next(), &line)?,
                        num_seeds: parse_field(fields.next(), &line)?,
                    };
                    // Each sequence record has to land at its own ordinal.
                    if sl.seq_id != cache.seeds_lines.len() as i32 {
                        return Err(Error::Parse(line.to_string()));
                    }
                    cache.seeds_lines.push(sl);
                }
                b'B' => {
                    cache.block_lines.push(SeedDBBlockLine {
                        block_id: parse_field(fields.next(), &line)?,
                        start_seq_id: parse_field(fields.next(), &line)?,
                        end_seq_id: parse_field(fields.next(), &line)?,
                        num_bytes: parse_field(fields.next(), &line)?,
                    });
                }
                _ => return Err(Error::Parse(line.to_string())),
            }
        }

        if cache.seeds_lines.is_empty() {
            return Err(Error::EmptyIndex);
        }

        debug!(
            files = cache.file_lines.len(),
            sequences = cache.seeds_lines.len(),
            blocks = cache.block_lines.len(),
            "loaded SeedDB index"
        );
        Ok(cache)
    }

    /// Writes the index back out in canonical form: `V`, one `P` line with
    /// the keys in `k,w,hpc,hpc_len,rc` order, then all `F`, `S` and `B`
    /// records, fields tab separated.
    pub fn emit<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "V\t{}", self.version)?;
        writeln!(
            writer,
            "P\tk={},w={},hpc={},hpc_len={},rc={}",
            self.params.kmer_size,
            self.params.minimizer_window,
            self.params.use_hpc as i32,
            self.params.max_hpc_len,
            self.params.use_rc as i32,
        )?;
        for fl in &self.file_lines {
            writeln!(
                writer,
                "F\t{}\t{}\t{}\t{}",
                fl.file_id, fl.filename, fl.num_sequences, fl.num_bytes
            )?;
        }
        for sl in &self.seeds_lines {
            writeln!(
                writer,
                "S\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                sl.seq_id,
                sl.header,
                sl.file_id,
                sl.file_offset,
                sl.num_bytes,
                sl.num_bases,
                sl.num_seeds
            )?;
        }
        for bl in &self.block_lines {
            writeln!(
                writer,
                "B\t{}\t{}\t{}\t{}",
                bl.block_id, bl.start_seq_id, bl.end_seq_id, bl.num_bytes
            )?;
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.emit(&mut writer)
    }

    pub fn seeds_line(&self, seq_id: i32) -> Result<&SeedDBSeedsLine> {
        usize::try_from(seq_id)
            .ok()
            .and_then(|i| self.seeds_lines.get(i))
            .ok_or(Error::IndexOutOfRange {
                what: "seq_id",
                id: seq_id,
                len: self.seeds_lines.len(),
            })
    }

    pub fn block_line(&self, block_id: i32) -> Result<&SeedDBBlockLine> {
        usize::try_from(block_id)
            .ok()
            .and_then(|i| self.block_lines.get(i))
            .ok_or(Error::IndexOutOfRange {
                what: "block_id",
                id: block_id,
                len: self.block_lines.len(),
            })
    }

    pub fn file_line(&self, file_id: i32) -> Result<&SeedDBFileLine> {
        usize::try_from(file_id)
            .ok()
            .and_then(|i| self.file_lines.get(i))
            .ok_or(Error::IndexOutOfRange {
                what: "file_id",
                id: file_id,
                len: self.file_lines.len(),
            })
    }

    /// Maps each sequence header to its ordinal, computed on demand.
    pub fn header_to_ordinal(&self) -> FxHashMap<String, i32> {
        let mut lookup = FxHashMap::default();
        lookup.reserve(self.seeds_lines.len());
        for sl in &self.seeds_lines {
            lookup.insert(sl.header.clone(), sl.seq_id);
        }
        lookup
    }

    /// Strict-mode cross-reference checks, beyond what `load` enforces:
    /// every sequence's `file_id` resolves, blocks are ordinal-numbered,
    /// non-empty, in range and contiguous.
    pub fn validate(&self) -> Result<()> {
        let num_seqs = self.seeds_lines.len() as i32;
        for sl in &self.seeds_lines {
            if sl.file_id < 0 || sl.file_id as usize >= self.file_lines.len() {
                return Err(Error::InvariantViolation(format!(
                    "seq {} references unknown file {}",
                    sl.seq_id, sl.file_id
                )));
            }
        }
        let mut prev_end = 0;
        for (ordinal, bl) in self.block_lines.iter().enumerate() {
            if bl.block_id != ordinal as i32 {
                return Err(Error::InvariantViolation(format!(
                    "block at ordinal {} carries id {}",
                    ordinal, bl.block_id
                )));
            }
            if bl.start_seq_id < 0 || bl.end_seq_id > num_seqs || bl.span() <= 0 {
                return Err(Error::InvariantViolation(format!(
                    "block {} spans [{}, {}) over {} sequences",
                    bl.block_id, bl.start_seq_id, bl.end_seq_id, num_seqs
                )));
            }
            if bl.start_seq_id != prev_end {
                return Err(Error::InvariantViolation(format!(
                    "block {} starts at {} but the previous block ended at {}",
                    bl.block_id, bl.start_seq_id, prev_end
                )));
            }
            prev_end = bl.end_seq_id;
        }
        Ok(())
    }
}
