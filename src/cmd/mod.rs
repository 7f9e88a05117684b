//! CLI subcommands: argument structs and their drivers.

pub mod dbinfo;
pub mod ovl;

pub use dbinfo::DbinfoArgs;
pub use ovl::OvlArgs;
