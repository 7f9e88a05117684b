//! The sequence store the mapper pulls target bases from, and strand
//! utilities.

use std::path::Path;

use bio::io::fasta;

use crate::error::{Error, Result};
use crate::seeddb::index_cache::SeedDBIndexCache;

/// One sequence with its SeedDB ordinal.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub id: i32,
    pub name: String,
    pub bases: Vec<u8>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

/// Random access over sequences by SeedDB ordinal. The mapper only ever
/// reads through this interface.
pub trait SequenceStore {
    fn get_sequence(&self, id: i32) -> Result<&Sequence>;
}

/// An in-memory store backed by a FASTA file, ordered to match the
/// ordinals of a SeedDB index.
pub struct FastaSequenceStore {
    sequences: Vec<Sequence>,
}

impl FastaSequenceStore {
    /// Reads `path` and arranges the records in index-cache order. Every
    /// header in the cache must be present in the FASTA file.
    pub fn from_fasta(path: &Path, cache: &SeedDBIndexCache) -> Result<FastaSequenceStore> {
        let reader = fasta::Reader::from_file(path).map_err(|e| {
            Error::InvalidArgument(format!("cannot open FASTA {}: {}", path.display(), e))
        })?;
        let mut by_header = rustc_hash::FxHashMap::default();
        for record in reader.records().filter_map(|r| r.ok()) {
            by_header.insert(record.id().to_string(), record.seq().to_vec());
        }
        let mut sequences = Vec::with_capacity(cache.seeds_lines.len());
        for sl in &cache.seeds_lines {
            let bases = by_header.remove(&sl.header).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "sequence '{}' from the index is missing in {}",
                    sl.header,
                    path.display()
                ))
            })?;
            sequences.push(Sequence {
                id: sl.seq_id,
                name: sl.header.clone(),
                bases,
            });
        }
        Ok(FastaSequenceStore { sequences })
    }

    pub fn from_sequences(sequences: Vec<Sequence>) -> FastaSequenceStore {
        FastaSequenceStore { sequences }
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl SequenceStore for FastaSequenceStore {
    fn get_sequence(&self, id: i32) -> Result<&Sequence> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.sequences.get(i))
            .ok_or(Error::IndexOutOfRange {
                what: "sequence id",
                id,
                len: self.sequences.len(),
            })
    }
}

/// Reverse complement of a DNA sequence; ambiguous bases become `N`.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&b| match b {
            b'A' | b'a' => b'T',
            b'T' | b't' | b'U' | b'u' => b'A',
            b'G' | b'g' => b'C',
            b'C' | b'c' => b'G',
            _ => b'N',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"ACGT"), b"ACGT".to_vec());
        assert_eq!(reverse_complement(b"AACG"), b"CGTT".to_vec());
        assert_eq!(reverse_complement(b"acgn"), b"NCGT".to_vec());
    }

    #[test]
    fn test_store_lookup() {
        let store = FastaSequenceStore::from_sequences(vec![Sequence {
            id: 0,
            name: "a".to_string(),
            bases: b"ACGT".to_vec(),
        }]);
        assert_eq!(store.get_sequence(0).unwrap().name, "a");
        assert!(matches!(
            store.get_sequence(1),
            Err(Error::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            store.get_sequence(-1),
            Err(Error::IndexOutOfRange { .. })
        ));
    }
}
