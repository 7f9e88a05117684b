//! Writes a SeedDB: the binary `.seeds` data files plus the text index.
//!
//! Seeds are appended per sequence with [`SeedDBWriter::write_seeds`];
//! [`SeedDBWriter::mark_block_end`] closes the current block (and, with
//! `split_blocks`, rolls over to a fresh data file); [`SeedDBWriter::write_index`]
//! emits `<prefix>.seeddb`. Output files are owned by the writer and live no
//! longer than it does.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::seeddb::index_cache::{
    SeedDBBlockLine, SeedDBFileLine, SeedDBIndexCache, SeedDBSeedsLine, SeedParams,
};
use crate::seeddb::seed::SeedRaw;

const SEEDDB_VERSION: &str = "0.1.0";

pub struct SeedDBWriter {
    parent: PathBuf,
    basename: String,
    split_blocks: bool,
    params: SeedParams,
    file_lines: Vec<SeedDBFileLine>,
    seeds_lines: Vec<SeedDBSeedsLine>,
    block_lines: Vec<SeedDBBlockLine>,
    current_block: SeedDBBlockLine,
    open_new_file_on_write: bool,
    out_seeds: Option<BufWriter<File>>,
}

impl SeedDBWriter {
    pub fn new(prefix: &Path, split_blocks: bool, params: SeedParams) -> SeedDBWriter {
        let parent = prefix
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let basename = prefix
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        SeedDBWriter {
            parent,
            basename,
            split_blocks,
            params,
            file_lines: Vec::new(),
            seeds_lines: Vec::new(),
            block_lines: Vec::new(),
            current_block: SeedDBBlockLine::default(),
            open_new_file_on_write: true,
            out_seeds: None,
        }
    }

    fn open_new_seeds_file(&mut self) -> Result<()> {
        let file_id = self.file_lines.len() as i32;
        let filename = format!("{}.{}.seeds", self.basename, file_id);
        let file = File::create(self.parent.join(&filename))?;
        self.out_seeds = Some(BufWriter::new(file));
        self.file_lines.push(SeedDBFileLine {
            file_id,
            filename,
            num_sequences: 0,
            num_bytes: 0,
        });
        Ok(())
    }

    /// Appends one sequence's seeds to the current data file and records
    /// its locator line.
    pub fn write_seeds(
        &mut self,
        header: &str,
        seq_id: i32,
        num_bases: i32,
        seeds: &[SeedRaw],
    ) -> Result<()> {
        if self.open_new_file_on_write {
            self.open_new_seeds_file()?;
            self.open_new_file_on_write = false;
        }
        let out = self
            .out_seeds
            .as_mut()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "seeds file not open"))?;
        for &word in seeds {
            out.write_all(&word.to_le_bytes())?;
        }
        let num_bytes = (seeds.len() * 16) as i64;

        let fl = self
            .file_lines
            .last_mut()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "no open seeds file line"))?;
        let file_offset = fl.num_bytes;
        fl.num_bytes += num_bytes;
        fl.num_sequences += 1;

        self.seeds_lines.push(SeedDBSeedsLine {
            seq_id,
            header: header.to_string(),
            file_id: fl.file_id,
            file_offset,
            num_bytes,
            num_bases,
            num_seeds: seeds.len() as i32,
        });

        if self.current_block.start_seq_id < 0 {
            self.current_block.start_seq_id = seq_id;
        }
        self.current_block.end_seq_id = seq_id + 1;
        self.current_block.num_bytes += num_bytes;
        Ok(())
    }

    /// Closes the current block. With `split_blocks` the next write goes
    /// to a fresh `.seeds` file.
    pub fn mark_block_end(&mut self) {
        if self.current_block.start_seq_id >= 0 {
            self.current_block.block_id = self.block_lines.len() as i32;
            self.block_lines.push(self.current_block.clone());
        }
        self.current_block = SeedDBBlockLine::default();
        if self.split_blocks {
            self.open_new_file_on_write = true;
        }
    }

    /// Flushes the data files and emits the `<prefix>.seeddb` index. An
    /// unterminated trailing block is closed first.
    pub fn write_index(&mut self) -> Result<()> {
        self.mark_block_end();
        if let Some(out) = &mut self.out_seeds {
            out.flush()?;
        }
        let cache = SeedDBIndexCache {
            version: SEEDDB_VERSION.to_string(),
            params: self.params,
            file_lines: self.file_lines.clone(),
            seeds_lines: self.seeds_lines.clone(),
            block_lines: self.block_lines.clone(),
        };
        cache.save(&self.parent.join(format!("{}.seeddb", self.basename)))
    }
}
