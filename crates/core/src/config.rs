//! TOML-based tracked-version configuration.
//!
//! A `.verguard.toml` file names the current version and the files that
//! carry it as raw text. Per-file `search` templates may reference
//! `{current_version}`, which is expanded before the template is used as a
//! search pattern. The expanded (path, pattern) pairs become the ordered
//! [`VersionSpec`] list consumed by the check and merge orchestrators —
//! there is no ambient global configuration anywhere.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::git::CommitRef;
use crate::paths::RepoPath;

/// Default config file name, looked up at the repository root.
pub const DEFAULT_CONFIG_FILE: &str = ".verguard.toml";

/// Default pattern used to extract a version from a file.
pub const DEFAULT_VERSION_REGEX: &str = r"([0-9]+\.?){3}";

/// Placeholder expanded inside `search` templates.
const CURRENT_VERSION_KEY: &str = "{current_version}";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One tracked file paired with the pattern that locates its version text.
///
/// A list of `VersionSpec` is always ordered: index 0 is the primary
/// version file whose bump is independently verified; indices >= 1 are
/// synchronized files validated against the primary's new version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpec {
    pub path: RepoPath,
    pub pattern: String,
}

/// Parsed `.verguard.toml` contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    /// The version string currently embedded in the tracked files.
    pub current_version: String,

    /// Tracked files, in order.
    #[serde(default, rename = "file")]
    pub files: Vec<FileEntry>,
}

/// One `[[file]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the config file's directory.
    pub path: PathBuf,

    /// Optional search template; `{current_version}` is expanded. Files
    /// without a template are searched for the bare current version.
    #[serde(default)]
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl VersionConfig {
    /// Load and parse a config file from the working tree.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, &path.display().to_string())
    }

    /// Load and parse a config file from a commit snapshot.
    ///
    /// The merge flow uses this so the tracked-file list reflects the
    /// commit being merged into, not a possibly-conflicted working tree.
    pub fn load_from_commit(
        commit: &CommitRef<'_>,
        repo_path: &Path,
    ) -> Result<Self, ConfigError> {
        let contents = commit
            .content(repo_path)
            .map_err(|_| ConfigError::FileNotFound(repo_path.display().to_string()))?;
        Self::parse(&contents, &repo_path.display().to_string())
    }

    fn parse(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: VersionConfig =
            toml::from_str(contents).map_err(|e| ConfigError::ParseError {
                path: origin.to_string(),
                detail: e.to_string(),
            })?;
        info!(path = origin, files = config.files.len(), "parsed config");
        Ok(config)
    }

    /// Expand the tracked files into an ordered `VersionSpec` list.
    ///
    /// `base_dir` is the directory holding the config file; entry paths
    /// are resolved against it.
    pub fn into_specs(self, repo_root: &Path, base_dir: &Path) -> Vec<VersionSpec> {
        self.files
            .iter()
            .map(|entry| {
                let pattern = self.expand_search(entry);
                debug!(path = %entry.path.display(), pattern, "tracked file");
                VersionSpec {
                    path: RepoPath::new(repo_root, base_dir.join(&entry.path)),
                    pattern,
                }
            })
            .collect()
    }

    /// The effective search pattern for one entry: the expanded template,
    /// or the bare current version when no template was given.
    fn expand_search(&self, entry: &FileEntry) -> String {
        match &entry.search {
            Some(template) => template.replace(CURRENT_VERSION_KEY, &self.current_version),
            None => self.current_version.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Regex list reconciliation
// ---------------------------------------------------------------------------

/// Resolve a mismatch between the tracked-file count and a regex list.
///
/// Too few regexes are padded with `default_regex`; extras are dropped.
/// Either way the caller is warned — the result always has exactly
/// `file_count` entries.
pub fn reconcile_regexes(
    file_count: usize,
    mut regexes: Vec<String>,
    default_regex: &str,
) -> Vec<String> {
    if regexes.len() < file_count {
        warn!(
            default = default_regex,
            "regex list smaller than file list, defaulting remaining files"
        );
        regexes.resize(file_count, default_regex.to_string());
    } else if regexes.len() > file_count {
        warn!("regex list larger than file list, ignoring extra regexes");
        regexes.truncate(file_count);
    }
    regexes
}

/// An example config suitable for pasting into `.verguard.toml`.
pub fn example_config() -> &'static str {
    r#"# verguard tracked-version configuration.
#
# The first file listed under [[file]] is the primary version file; every
# other file is checked for consistency against it. `search` templates may
# reference {current_version}.

current_version = "0.0.1"

[[file]]
path = "version.txt"

[[file]]
path = "openapi-spec.json"
search = "\"version\": \"{current_version}\""

[[file]]
path = "kustomize/base/service.yaml"
search = "app-version: {current_version}"
"#
}
