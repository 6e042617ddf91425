//! The version-bump check.
//!
//! A linear pipeline over one base/current commit pair: verify the primary
//! version file shows a real semantic-version increment, then verify every
//! synchronized file carries the primary's new version. No backtracking —
//! the first primary-side failure is terminal, while sync-file failures
//! are collected and reported in one batch.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::VersionSpec;
use crate::errors::CheckError;
use crate::git::{CommitRef, GitClient};
use crate::version::{compare_versions, search_commit_file, versions_from_commits};

/// Successful check results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The scoped diff between base and current was empty; nothing to
    /// verify. Deliberate escape hatch for partial-repository invocations
    /// (e.g. CI running per-subdirectory).
    NoChangesInScope,

    /// The primary file was bumped to `version` and all synchronized
    /// files carry it.
    Passed { version: String },
}

/// Run the full check between two commits.
///
/// `specs` is ordered: index 0 is the primary version file, the rest are
/// synchronized files. `scope` restricts the change detection to a
/// repo-relative path prefix (`None` means the whole tree).
pub fn run_check(
    client: &GitClient,
    base: &CommitRef<'_>,
    current: &CommitRef<'_>,
    specs: &[VersionSpec],
    scope: Option<&Path>,
) -> Result<CheckOutcome, CheckError> {
    let Some((primary, sync_specs)) = specs.split_first() else {
        return Err(CheckError::MissingInput);
    };

    if let Some(scope) = scope {
        info!(scope = %scope.display(), "checking for changes within path");
    }
    let changed = client.diff_paths(base, current, scope)?;
    if changed.is_empty() {
        info!("no changes detected between current commit and base commit");
        return Ok(CheckOutcome::NoChangesInScope);
    }

    let (old_version, new_version) =
        versions_from_commits(base, current, &primary.path.repo_path(), &primary.pattern)?;
    compare_versions(&old_version, &new_version)?;

    if sync_specs.is_empty() {
        warn!(primary = %primary.path, "no extra file checking inputted, only verified the primary file");
    }

    let mut mismatched: Vec<PathBuf> = Vec::new();
    for spec in sync_specs {
        // Non-fatal lookup: a missing file or pattern counts as a mismatch
        // rather than aborting the batch.
        let text = match search_commit_file(current, &spec.path.repo_path(), &spec.pattern) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %spec.path, %err, "version lookup failed");
                String::new()
            }
        };

        if text.contains(&new_version) {
            debug!(path = %spec.path, text, "file matches the new version");
        } else {
            warn!(path = %spec.path, primary = %primary.path, "file needs to match the primary version file");
            mismatched.push(spec.path.cwd_path());
        }
    }

    if !mismatched.is_empty() {
        return Err(CheckError::SyncMismatch {
            version: new_version,
            count: mismatched.len(),
            files: mismatched,
        });
    }

    info!(version = %new_version, "all files matched the correct version");
    Ok(CheckOutcome::Passed {
        version: new_version,
    })
}
