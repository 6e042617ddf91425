//! Merge orchestration: resolve version-only conflicts across every
//! tracked file of an in-progress merge.
//!
//! The `higher`/`lower` strategies are decided once, from the primary
//! file's two versions, and that single decision is applied uniformly to
//! every conflicted file — per-file disagreement is deliberately not
//! detected.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::config::VersionSpec;
use crate::conflict::{resolve_file_conflicts, ResolvedStrategy, VersionFile};
use crate::errors::MergeError;
use crate::git::GitClient;
use crate::version::{compare_versions, versions_from_commits};

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// User-selectable resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Keep the current side of each version conflict.
    Current,
    /// Keep the incoming side of each version conflict.
    Incoming,
    /// Keep both sides, current first.
    Both,
    /// Drop both sides.
    Neither,
    /// Keep whichever side holds the larger primary version.
    Higher,
    /// Keep whichever side holds the smaller primary version.
    Lower,
}

impl MergeStrategy {
    pub const ALL: &'static [&'static str] =
        &["current", "incoming", "both", "neither", "higher", "lower"];
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "current" => Ok(Self::Current),
            "incoming" => Ok(Self::Incoming),
            "both" => Ok(Self::Both),
            "neither" => Ok(Self::Neither),
            "higher" => Ok(Self::Higher),
            "lower" => Ok(Self::Lower),
            other => Err(format!(
                "unknown merge strategy '{other}' (expected one of: {})",
                Self::ALL.join(", ")
            )),
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Current => "current",
            Self::Incoming => "incoming",
            Self::Both => "both",
            Self::Neither => "neither",
            Self::Higher => "higher",
            Self::Lower => "lower",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Result of one merge resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The repository has no unmerged files.
    NoConflicts,

    /// Resolution ran over the conflicted tracked files. Files with
    /// remaining conflicts are left for manual resolution — auto
    /// resolution is best-effort, never guaranteed complete.
    Completed {
        resolved: Vec<PathBuf>,
        unresolved: Vec<PathBuf>,
    },
}

/// Resolve version conflicts across the tracked files of an in-progress
/// merge.
///
/// `current` is the commit being merged into (HEAD); the incoming commit
/// is resolved from `MERGE_HEAD`. `specs` is ordered with the primary
/// version file first. Per-file failures are warned about and skipped;
/// they never abort the run.
pub fn run_merge(
    client: &GitClient,
    current_ref: &str,
    specs: &[VersionSpec],
    strategy: MergeStrategy,
) -> Result<MergeOutcome, MergeError> {
    let unmerged = client.unmerged_paths()?;
    if unmerged.is_empty() {
        info!("no merge conflicts detected");
        return Ok(MergeOutcome::NoConflicts);
    }

    let Some(primary) = specs.first() else {
        return Err(MergeError::MissingInput);
    };

    let current_commit = client.commit(current_ref).map_err(MergeError::GitError)?;
    let incoming_commit = client.merge_head()?;

    // Old/new in check terms map to incoming/current here: the incoming
    // side plays the base.
    let (incoming_version, current_version) = versions_from_commits(
        &incoming_commit,
        &current_commit,
        &primary.path.repo_path(),
        &primary.pattern,
    )?;

    let resolved_strategy = resolve_strategy(strategy, &incoming_version, &current_version);
    info!(strategy = %strategy, resolved = ?resolved_strategy, "resolving version conflicts");

    let conflicted_files: Vec<VersionFile> = specs
        .iter()
        .filter(|spec| unmerged.contains(&spec.path.repo_path()))
        .map(|spec| VersionFile {
            path: spec.path.clone(),
            current_regex: spec.pattern.clone(),
            incoming_regex: spec
                .pattern
                .replacen(&current_version, &incoming_version, 1),
        })
        .collect();
    debug!(count = conflicted_files.len(), "tracked files in the unmerged set");

    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();
    for file in &conflicted_files {
        match resolve_file_conflicts(file, resolved_strategy, client) {
            Ok(true) => resolved.push(file.path.cwd_path()),
            Ok(false) => unresolved.push(file.path.cwd_path()),
            Err(err) => {
                warn!(path = %file.path, %err, "could not resolve version file");
                unresolved.push(file.path.cwd_path());
            }
        }
    }

    info!(
        "resolved all version merge conflicts that could be auto-resolved; verify changes for errors or failed resolutions before committing"
    );
    Ok(MergeOutcome::Completed {
        resolved,
        unresolved,
    })
}

/// Degrade `higher`/`lower` to a concrete side by comparing the primary
/// file's two versions; pass the static strategies through unchanged.
fn resolve_strategy(
    strategy: MergeStrategy,
    incoming_version: &str,
    current_version: &str,
) -> ResolvedStrategy {
    match strategy {
        MergeStrategy::Current => ResolvedStrategy::Current,
        MergeStrategy::Incoming => ResolvedStrategy::Incoming,
        MergeStrategy::Both => ResolvedStrategy::Both,
        MergeStrategy::Neither => ResolvedStrategy::Neither,
        MergeStrategy::Higher | MergeStrategy::Lower => {
            let current_is_bigger = compare_versions(incoming_version, current_version).is_ok();
            let keep_current = (current_is_bigger && strategy == MergeStrategy::Higher)
                || (!current_is_bigger && strategy == MergeStrategy::Lower);
            if keep_current {
                ResolvedStrategy::Current
            } else {
                ResolvedStrategy::Incoming
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VersionSpec;
    use crate::paths::RepoPath;

    #[test]
    fn test_strategy_round_trips_through_strings() {
        for name in MergeStrategy::ALL {
            let strategy: MergeStrategy = name.parse().unwrap();
            assert_eq!(strategy.to_string(), *name);
        }
        assert!("sideways".parse::<MergeStrategy>().is_err());
    }

    #[test]
    fn test_resolve_strategy_static_passthrough() {
        assert_eq!(
            resolve_strategy(MergeStrategy::Current, "1.0.0", "2.0.0"),
            ResolvedStrategy::Current
        );
        assert_eq!(
            resolve_strategy(MergeStrategy::Neither, "1.0.0", "2.0.0"),
            ResolvedStrategy::Neither
        );
    }

    #[test]
    fn test_higher_picks_the_larger_side() {
        // Current side larger.
        assert_eq!(
            resolve_strategy(MergeStrategy::Higher, "1.0.0", "2.0.0"),
            ResolvedStrategy::Current
        );
        // Incoming side larger.
        assert_eq!(
            resolve_strategy(MergeStrategy::Higher, "2.0.0", "1.0.0"),
            ResolvedStrategy::Incoming
        );
    }

    #[test]
    fn test_lower_picks_the_smaller_side() {
        assert_eq!(
            resolve_strategy(MergeStrategy::Lower, "1.0.0", "2.0.0"),
            ResolvedStrategy::Incoming
        );
        assert_eq!(
            resolve_strategy(MergeStrategy::Lower, "2.0.0", "1.0.0"),
            ResolvedStrategy::Current
        );
    }

    #[test]
    fn test_unparsable_current_falls_back_to_incoming_for_higher() {
        assert_eq!(
            resolve_strategy(MergeStrategy::Higher, "1.0.0", "garbage"),
            ResolvedStrategy::Incoming
        );
    }

    #[test]
    fn test_clean_repo_reports_no_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();

        // One commit so HEAD exists.
        std::fs::write(dir.path().join("f.txt"), "x\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new("f.txt")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("Test", "test@test.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();

        let client = GitClient::discover(dir.path()).unwrap();
        let specs = vec![VersionSpec {
            path: RepoPath::new(dir.path(), dir.path().join("f.txt")),
            pattern: r"(\d+\.?){3}".into(),
        }];

        let outcome = run_merge(&client, "HEAD", &specs, MergeStrategy::Higher).unwrap();
        assert_eq!(outcome, MergeOutcome::NoConflicts);
    }
}
