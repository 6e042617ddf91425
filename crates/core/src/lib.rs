//! verguard core library.
//!
//! Locates version identifiers embedded as raw text inside repository
//! files at specific commits, verifies monotonic semantic-version
//! progression between a base and current revision, and automatically
//! resolves version-only merge conflicts using a configurable strategy.

pub mod bump;
pub mod check;
pub mod config;
pub mod conflict;
pub mod errors;
pub mod git;
pub mod hooks;
pub mod merge;
pub mod paths;
pub mod version;

// Re-exports for convenience.
pub use check::{run_check, CheckOutcome};
pub use config::{VersionConfig, VersionSpec};
pub use errors::CoreError;
pub use git::GitClient;
pub use merge::{run_merge, MergeOutcome, MergeStrategy};
pub use paths::RepoPath;
