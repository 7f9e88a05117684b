//! The SeedDB: packed seed codec, text index cache, and the binary seed
//! data files that accompany it.
//!
//! A SeedDB consists of a metadata file `<prefix>.seeddb` (see
//! [`index_cache`]) and one or more binary files `<prefix>.<file_id>.seeds`
//! holding concatenated 128-bit seed words, little-endian, no framing.

pub mod index_cache;
pub mod reader;
pub mod seed;
pub mod writer;

pub use index_cache::{
    SeedDBBlockLine, SeedDBFileLine, SeedDBIndexCache, SeedDBSeedsLine, SeedParams,
};
pub use seed::{Seed, SeedRaw};
pub use writer::SeedDBWriter;
