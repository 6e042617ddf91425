//! Git operations for verguard.

pub mod client;

pub use client::{CommitRef, GitClient};
