//! The `ovl` subcommand: map a set of queries against an indexed target
//! set and print the overlaps in M4 format.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

use crate::common::write_m4;
use crate::config::OverlapSettings;
use crate::index::SeedIndex;
use crate::mapper::{Mapper, MapperResult};
use crate::seeddb::index_cache::SeedDBIndexCache;
use crate::seeddb::reader;
use crate::sequence::{FastaSequenceStore, SequenceStore};

#[derive(Args, Debug)]
pub struct OvlArgs {
    /// Target FASTA backing the target SeedDB
    #[arg(long)]
    pub target: PathBuf,
    /// Target SeedDB prefix (expects <prefix>.seeddb and <prefix>.<n>.seeds)
    #[arg(long)]
    pub target_seeddb: PathBuf,
    /// Query FASTA
    #[arg(long)]
    pub query: PathBuf,
    /// Query SeedDB prefix
    #[arg(long)]
    pub query_seeddb: PathBuf,
    /// Map only the queries of this block of the query SeedDB
    #[arg(long)]
    pub block: Option<i32>,
    #[arg(short = 'n', long, default_value_t = 0)]
    pub num_threads: usize,
    #[arg(long, default_value_t = 50)]
    pub min_qlen: i32,
    #[arg(long, default_value_t = 50)]
    pub min_tlen: i32,
    #[arg(long, default_value_t = 3)]
    pub min_num_seeds: i32,
    #[arg(long, default_value_t = 1000)]
    pub min_chain_span: i32,
    #[arg(long, default_value_t = 100)]
    pub chain_bandwidth: i32,
    /// Fraction of min(query len, target len) used as the alignment band
    #[arg(long, default_value_t = 0.01)]
    pub aln_bandwidth: f64,
    /// Fraction of the query length used as the alignment diff budget
    #[arg(long, default_value_t = 0.03)]
    pub aln_max_diff: f64,
    #[arg(long, default_value_t = 98.0)]
    pub min_identity: f32,
    #[arg(long, default_value_t = 1000)]
    pub min_map_len: i32,
    /// Keep only the longest overlap per target
    #[arg(long, default_value_t = false)]
    pub one_hit_per_target: bool,
    /// Keep overlaps of a query with itself
    #[arg(long, default_value_t = false)]
    pub keep_self_hits: bool,
    /// Emit only overlaps with target id below the query id
    #[arg(long, default_value_t = false)]
    pub skip_symmetric: bool,
    /// Percentile of most frequent seed keys to suppress (0 keeps all)
    #[arg(long, default_value_t = 0.0002)]
    pub freq_percentile: f64,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl OvlArgs {
    fn settings(&self) -> OverlapSettings {
        OverlapSettings {
            min_query_len: self.min_qlen,
            min_target_len: self.min_tlen,
            min_num_seeds: self.min_num_seeds,
            min_chain_span: self.min_chain_span,
            chain_bandwidth: self.chain_bandwidth,
            align_bandwidth: self.aln_bandwidth,
            align_max_diff: self.aln_max_diff,
            min_identity: self.min_identity,
            min_mapped_len: self.min_map_len,
            one_hit_per_target: self.one_hit_per_target,
            skip_self_hits: !self.keep_self_hits,
            skip_symmetric_overlaps: self.skip_symmetric,
            freq_percentile: self.freq_percentile,
        }
    }
}

fn seeddb_paths(prefix: &Path) -> (PathBuf, PathBuf) {
    let index_path = PathBuf::from(format!("{}.seeddb", prefix.display()));
    let dir = prefix
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    (index_path, dir)
}

pub fn run(args: OvlArgs) -> Result<()> {
    let num_threads = if args.num_threads == 0 {
        num_cpus::get()
    } else {
        args.num_threads
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("failed to build thread pool")?;

    let settings = args.settings();

    // Target side: index cache, seeds, sequence store.
    let (target_index_path, target_dir) = seeddb_paths(&args.target_seeddb);
    let target_cache = Arc::new(
        SeedDBIndexCache::load(&target_index_path)
            .with_context(|| format!("loading {}", target_index_path.display()))?,
    );
    target_cache.validate()?;
    let target_seeds = reader::load_all_seeds(&target_cache, &target_dir)?;
    info!(seeds = target_seeds.len(), "loaded target seeds");
    let index = SeedIndex::new(target_cache.clone(), target_seeds);

    let stats = index.compute_frequency_stats(settings.freq_percentile)?;
    let freq_cutoff = if settings.freq_percentile > 0.0 {
        stats.cutoff
    } else {
        0
    };
    info!(
        max = stats.max,
        avg = stats.avg,
        median = stats.median,
        cutoff = freq_cutoff,
        "seed frequency statistics"
    );

    let targets = FastaSequenceStore::from_fasta(&args.target, &target_cache)?;

    // Query side.
    let (query_index_path, query_dir) = seeddb_paths(&args.query_seeddb);
    let query_cache = SeedDBIndexCache::load(&query_index_path)
        .with_context(|| format!("loading {}", query_index_path.display()))?;
    query_cache.validate()?;
    let queries = FastaSequenceStore::from_fasta(&args.query, &query_cache)?;

    let (query_begin, query_end) = match args.block {
        Some(block_id) => {
            let bl = query_cache.block_line(block_id)?;
            (bl.start_seq_id, bl.end_seq_id)
        }
        None => (0, queries.len() as i32),
    };

    let mapper = Mapper::new(settings);
    let progress = ProgressBar::new((query_end - query_begin) as u64).with_style(
        ProgressStyle::with_template("{msg} {bar:40} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.set_message("mapping");

    let results: Vec<MapperResult> = (query_begin..query_end)
        .into_par_iter()
        .map(|seq_id| {
            let query = queries.get_sequence(seq_id)?;
            let query_seeds = reader::load_seeds_for_sequence(&query_cache, &query_dir, seq_id)?;
            let result = mapper.map(&targets, &index, query, &query_seeds, freq_cutoff);
            progress.inc(1);
            result
        })
        .collect::<crate::Result<Vec<_>>>()?;
    progress.finish_and_clear();

    let mut writer: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut num_overlaps = 0usize;
    for (offset, result) in results.iter().enumerate() {
        let query = queries.get_sequence(query_begin + offset as i32)?;
        for ovl in &result.overlaps {
            let b_name = &target_cache.seeds_line(ovl.b_id)?.header;
            write_m4(&mut writer, ovl, &query.name, b_name)?;
            num_overlaps += 1;
        }
    }
    writer.flush()?;
    info!(
        queries = (query_end - query_begin),
        overlaps = num_overlaps,
        "done"
    );
    Ok(())
}
