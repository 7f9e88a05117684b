//! The `dbinfo` subcommand: summarize a SeedDB index, optionally with
//! seed frequency statistics.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::index::SeedIndex;
use crate::seeddb::index_cache::SeedDBIndexCache;
use crate::seeddb::reader;

#[derive(Args, Debug)]
pub struct DbinfoArgs {
    /// SeedDB prefix (expects <prefix>.seeddb and <prefix>.<n>.seeds)
    pub seeddb: PathBuf,
    /// Also load the seeds and report frequency statistics
    #[arg(long, default_value_t = false)]
    pub stats: bool,
    #[arg(long, default_value_t = 0.0002)]
    pub freq_percentile: f64,
}

pub fn run(args: DbinfoArgs) -> Result<()> {
    let index_path = PathBuf::from(format!("{}.seeddb", args.seeddb.display()));
    let cache = SeedDBIndexCache::load(&index_path)
        .with_context(|| format!("loading {}", index_path.display()))?;

    println!("version:\t{}", cache.version);
    println!(
        "params:\tk={}, w={}, hpc={}, hpc_len={}, rc={}",
        cache.params.kmer_size,
        cache.params.minimizer_window,
        cache.params.use_hpc as i32,
        cache.params.max_hpc_len,
        cache.params.use_rc as i32
    );
    println!("files:\t{}", cache.file_lines.len());
    println!("sequences:\t{}", cache.seeds_lines.len());
    println!("blocks:\t{}", cache.block_lines.len());
    let total_bases: i64 = cache.seeds_lines.iter().map(|sl| sl.num_bases as i64).sum();
    let total_seeds: i64 = cache.seeds_lines.iter().map(|sl| sl.num_seeds as i64).sum();
    println!("total bases:\t{}", total_bases);
    println!("total seeds:\t{}", total_seeds);

    if args.stats {
        let dir = args
            .seeddb
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(std::path::Path::new("."))
            .to_path_buf();
        let seeds = reader::load_all_seeds(&cache, &dir)?;
        let index = SeedIndex::new(Arc::new(cache), seeds);
        let stats = index.compute_frequency_stats(args.freq_percentile)?;
        println!("freq max:\t{}", stats.max);
        println!("freq avg:\t{:.2}", stats.avg);
        println!("freq median:\t{:.2}", stats.median);
        println!("freq cutoff:\t{}", stats.cutoff);
    }
    Ok(())
}
