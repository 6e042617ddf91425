//! Structural parsing and strategy-driven resolution of merge conflicts.
//!
//! The parser finds every conflict region in a file's raw text; the
//! resolver isolates the version-bearing lines inside each region and
//! rewrites the file according to a resolution strategy.

pub mod parser;
pub mod resolver;

pub use parser::{parse_conflicts, MergeConflict};
pub use resolver::{resolve_file_conflicts, ResolvedStrategy, VersionFile};
