//! Mapping thresholds and knobs, with the defaults used by the CLI.

#[derive(Debug, Clone)]
pub struct OverlapSettings {
    /// Queries shorter than this are not mapped at all.
    pub min_query_len: i32,
    /// Targets shorter than this are dropped by the final filter.
    pub min_target_len: i32,
    /// Minimum number of seed hits in an admitted chain.
    pub min_num_seeds: i32,
    /// Minimum query and target span of an admitted chain.
    pub min_chain_span: i32,
    /// Maximum diagonal deviation within one chain, in positions.
    pub chain_bandwidth: i32,
    /// Fraction of `min(a_len, b_len)` used as the alignment band.
    pub align_bandwidth: f64,
    /// Fraction of `a_len` used as the alignment diff budget.
    pub align_max_diff: f64,
    /// Post-alignment identity threshold, in percent.
    pub min_identity: f32,
    /// Post-alignment span threshold for both sequences.
    pub min_mapped_len: i32,
    /// Keep only the longest overlap per target.
    pub one_hit_per_target: bool,
    /// Drop overlaps of a query with itself.
    pub skip_self_hits: bool,
    /// Emit only overlaps with `b_id < a_id`.
    pub skip_symmetric_overlaps: bool,
    /// Percentile of most frequent seed keys to suppress; `0` keeps all.
    pub freq_percentile: f64,
}

impl Default for OverlapSettings {
    fn default() -> Self {
        OverlapSettings {
            min_query_len: 50,
            min_target_len: 50,
            min_num_seeds: 3,
            min_chain_span: 1000,
            chain_bandwidth: 100,
            align_bandwidth: 0.01,
            align_max_diff: 0.03,
            min_identity: 98.0,
            min_mapped_len: 1000,
            one_hit_per_target: false,
            skip_self_hits: true,
            skip_symmetric_overlaps: false,
            freq_percentile: 0.0002,
        }
    }
}
