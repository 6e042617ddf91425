//! Strategy-driven resolution of version conflicts within one file.
//!
//! For each conflict region the resolver pairs up the version-bearing
//! lines from the `current` and `incoming` bodies, splits the region
//! around them, resolves each pair per the strategy, and re-wraps any
//! surrounding non-version text in fresh conflict markers. Regions are
//! processed last-to-first so earlier byte offsets stay valid while later
//! regions are rewritten.

use tracing::{debug, info, warn};

use crate::conflict::parser::{is_partial_line, parse_conflicts, MergeConflict};
use crate::errors::MergeError;
use crate::git::GitClient;
use crate::paths::RepoPath;
use crate::version::line_matches;

/// A concrete, per-pair resolution rule.
///
/// The dynamic `higher`/`lower` strategies are resolved to `Current` /
/// `Incoming` before the textual merge step runs, so they cannot appear
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedStrategy {
    /// Keep the current side's line only.
    Current,
    /// Keep the incoming side's line only.
    Incoming,
    /// Keep both lines, current first.
    Both,
    /// Drop both lines.
    Neither,
}

/// One conflicted file and the patterns locating its version text on each
/// side. The incoming regex is the current one with the incoming version
/// string substituted for the current version string.
#[derive(Debug, Clone)]
pub struct VersionFile {
    pub path: RepoPath,
    pub current_regex: String,
    pub incoming_regex: String,
}

/// Resolve the version conflicts in one working-tree file.
///
/// Reads the file, rewrites every conflict region that contains version
/// lines, writes the file back, and re-parses. A file left with zero
/// conflicts is staged for commit; otherwise it stays put for manual
/// resolution. Returns whether the file ended up fully resolved.
pub fn resolve_file_conflicts(
    file: &VersionFile,
    strategy: ResolvedStrategy,
    client: &GitClient,
) -> Result<bool, MergeError> {
    let abs = file.path.abs_path();
    if !abs.is_file() {
        return Err(MergeError::FileMissing(file.path.cwd_path()));
    }

    info!(path = %file.path, "resolving conflicts for version file");

    let mut file_text = std::fs::read_to_string(abs).map_err(|source| MergeError::IoError {
        path: file.path.cwd_path(),
        source,
    })?;

    // Last-to-first: earlier offsets stay valid as later regions change.
    let conflicts = parse_conflicts(&file_text);
    for conflict in conflicts.iter().rev() {
        let pairs = version_conflict_lines(file, conflict);
        if pairs.is_empty() {
            continue;
        }
        let replacement = split_merge(conflict, &pairs, strategy);
        file_text = conflict.apply(&file_text, &replacement);
    }

    std::fs::write(abs, &file_text).map_err(|source| MergeError::IoError {
        path: file.path.cwd_path(),
        source,
    })?;

    if parse_conflicts(&file_text).is_empty() {
        debug!(path = %file.path, "all conflicts resolved, staging for merge commit");
        client.stage(&file.path.repo_path())?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Pair up the version-bearing lines of a conflict's two bodies.
///
/// Lines are matched with the regex-or-literal rule against the side's
/// respective pattern. Differing match counts are a documented best-effort
/// limitation: the extra lines are excluded with a warning and stay inside
/// a re-wrapped conflict.
pub fn version_conflict_lines(
    file: &VersionFile,
    conflict: &MergeConflict,
) -> Vec<(String, String)> {
    let current_lines: Vec<&str> = conflict
        .current
        .split_inclusive('\n')
        .filter(|line| line_matches(&file.current_regex, line))
        .collect();
    let incoming_lines: Vec<&str> = conflict
        .incoming
        .split_inclusive('\n')
        .filter(|line| line_matches(&file.incoming_regex, line))
        .collect();

    if current_lines.len() != incoming_lines.len() {
        warn!(
            current = current_lines.len(),
            incoming = incoming_lines.len(),
            "found different number of version matches in merge conflict for current vs incoming commit, defaulting to smaller length; verify changes before committing"
        );
    }

    current_lines
        .into_iter()
        .zip(incoming_lines)
        .map(|(c, i)| (c.to_string(), i.to_string()))
        .collect()
}

/// Compute the replacement text for one conflict, splitting it at each
/// paired version line.
///
/// Non-version text surrounding the pairs is preserved as-is, re-wrapped
/// in fresh conflict markers when either side is still non-empty. A split
/// that would not end at a line boundary leaves the original conflict
/// untouched.
pub fn split_merge(
    conflict: &MergeConflict,
    pairs: &[(String, String)],
    strategy: ResolvedStrategy,
) -> String {
    let mut result = String::new();
    let mut current = conflict.current.as_str();
    let mut incoming = conflict.incoming.as_str();

    for (current_line, incoming_line) in pairs {
        let Some((current_before, current_rest)) = current.split_once(current_line.as_str())
        else {
            warn!("unable to find given text within merge conflict, skipping conflict resolution");
            return conflict.text.clone();
        };
        let Some((incoming_before, incoming_rest)) = incoming.split_once(incoming_line.as_str())
        else {
            warn!("unable to find given text within merge conflict, skipping conflict resolution");
            return conflict.text.clone();
        };

        if is_partial_line(current_before)
            || is_partial_line(incoming_before)
            || is_partial_line(current_line)
            || is_partial_line(incoming_line)
        {
            warn!("given text does not break up merge conflict into complete lines, skipping conflict resolution");
            return conflict.text.clone();
        }

        result.push_str(&conflict.rewrap(current_before, incoming_before));
        result.push_str(&apply_strategy(current_line, incoming_line, strategy));

        current = current_rest;
        incoming = incoming_rest;
    }
    result.push_str(&conflict.rewrap(current, incoming));
    result
}

fn apply_strategy(current: &str, incoming: &str, strategy: ResolvedStrategy) -> String {
    match strategy {
        ResolvedStrategy::Current => current.to_string(),
        ResolvedStrategy::Incoming => incoming.to_string(),
        ResolvedStrategy::Both => format!("{current}{incoming}"),
        ResolvedStrategy::Neither => String::new(),
    }
}
