//! Reads packed seeds out of the binary `.seeds` data files.
//!
//! Each sequence's seeds are located through its `S` record: the file, the
//! byte offset and the byte count. Words are 128 bits, little endian.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Error, Result};
use crate::seeddb::index_cache::SeedDBIndexCache;
use crate::seeddb::seed::SeedRaw;

const SEED_BYTES: i64 = 16;

fn read_span(
    file: &mut File,
    filename: &str,
    offset: i64,
    num_bytes: i64,
    num_seeds: i32,
    out: &mut Vec<SeedRaw>,
) -> Result<()> {
    if num_bytes != num_seeds as i64 * SEED_BYTES {
        return Err(Error::Parse(format!(
            "{}: span of {} bytes cannot hold {} seeds",
            filename, num_bytes, num_seeds
        )));
    }
    file.seek(SeekFrom::Start(offset as u64))?;
    let mut buf = vec![0u8; num_bytes as usize];
    file.read_exact(&mut buf)?;
    out.reserve(num_seeds as usize);
    for chunk in buf.chunks_exact(SEED_BYTES as usize) {
        let mut word = [0u8; 16];
        word.copy_from_slice(chunk);
        out.push(u128::from_le_bytes(word));
    }
    Ok(())
}

/// Loads the seeds of a single sequence.
pub fn load_seeds_for_sequence(
    cache: &SeedDBIndexCache,
    dir: &Path,
    seq_id: i32,
) -> Result<Vec<SeedRaw>> {
    let sl = cache.seeds_line(seq_id)?;
    let fl = cache.file_line(sl.file_id)?;
    let mut file = File::open(dir.join(&fl.filename))?;
    let mut seeds = Vec::new();
    read_span(
        &mut file,
        &fl.filename,
        sl.file_offset,
        sl.num_bytes,
        sl.num_seeds,
        &mut seeds,
    )?;
    Ok(seeds)
}

/// Loads the seeds of every sequence in a block, in sequence order.
pub fn load_seeds_for_block(
    cache: &SeedDBIndexCache,
    dir: &Path,
    block_id: i32,
) -> Result<Vec<SeedRaw>> {
    let bl = cache.block_line(block_id)?;
    load_range(cache, dir, bl.start_seq_id, bl.end_seq_id)
}

/// Loads the seeds of the entire database, in sequence order.
pub fn load_all_seeds(cache: &SeedDBIndexCache, dir: &Path) -> Result<Vec<SeedRaw>> {
    load_range(cache, dir, 0, cache.seeds_lines.len() as i32)
}

fn load_range(
    cache: &SeedDBIndexCache,
    dir: &Path,
    start_seq_id: i32,
    end_seq_id: i32,
) -> Result<Vec<SeedRaw>> {
    let mut seeds = Vec::new();
    // One open file at a time; consecutive sequences share their data file.
    let mut open: Option<(i32, File)> = None;
    for seq_id in start_seq_id..end_seq_id {
        let sl = cache.seeds_line(seq_id)?;
        let fl = cache.file_line(sl.file_id)?;
        match &mut open {
            Some((id, file)) if *id == sl.file_id => {
                read_span(file, &fl.filename, sl.file_offset, sl.num_bytes, sl.num_seeds, &mut seeds)?;
            }
            _ => {
                let mut file = File::open(dir.join(&fl.filename))?;
                read_span(&mut file, &fl.filename, sl.file_offset, sl.num_bytes, sl.num_seeds, &mut seeds)?;
                open = Some((sl.file_id, file));
            }
        }
    }
    Ok(seeds)
}
