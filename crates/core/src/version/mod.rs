//! Version extraction and comparison.
//!
//! The locator finds a version substring inside opaque file content; the
//! comparator enforces semantic-versioning monotonicity between two
//! extracted version strings.

pub mod compare;
pub mod locate;

pub use compare::compare_versions;
pub use locate::{line_matches, search_content};

use std::path::Path;

use tracing::{info, warn};

use crate::errors::{CheckError, GitError};
use crate::git::CommitRef;

/// Extract the old and new version text for one file across two commits.
///
/// The file must exist at `current`. If it is absent at `base` the old
/// version is the empty string (brand-new file policy); otherwise both
/// sides are extracted with the locator and any miss is an error.
pub fn versions_from_commits(
    base: &CommitRef<'_>,
    current: &CommitRef<'_>,
    repo_path: &Path,
    pattern: &str,
) -> Result<(String, String), CheckError> {
    if !current.exists(repo_path) {
        return Err(CheckError::GitError(GitError::FileNotFound {
            path: repo_path.display().to_string(),
            commit: current.id(),
        }));
    }

    if !base.exists(repo_path) {
        warn!(
            path = %repo_path.display(),
            commit = %base.id(),
            "file not found in base commit, assuming new file"
        );
        let new = search_commit_file(current, repo_path, pattern)?;
        return Ok((String::new(), new));
    }

    let old = search_commit_file(base, repo_path, pattern)?;
    let new = search_commit_file(current, repo_path, pattern)?;
    info!(path = %repo_path.display(), "parsed versions from base and current commits");
    Ok((old, new))
}

/// Locate `pattern` inside the content of `repo_path` at one commit.
pub fn search_commit_file(
    commit: &CommitRef<'_>,
    repo_path: &Path,
    pattern: &str,
) -> Result<String, CheckError> {
    let content = commit.content(repo_path)?;
    search_content(&content, pattern, &repo_path.display().to_string())
}
