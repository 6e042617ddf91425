//! Repository-aware file paths.
//!
//! A [`RepoPath`] carries one canonical absolute path and derives the two
//! relative forms the tool needs: relative to the process working directory
//! (for display) and relative to the repository root (for git tree lookups).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};

/// A file identity inside a repository.
///
/// All derived forms are recomputed from one canonical absolute path;
/// equality and hashing consider the absolute path only. Immutable once
/// constructed.
#[derive(Debug, Clone)]
pub struct RepoPath {
    abs: PathBuf,
    repo_root: PathBuf,
}

impl RepoPath {
    /// Build a `RepoPath` from a repository root and a file path.
    ///
    /// Both inputs are absolutized against the current working directory;
    /// neither needs to exist on disk (paths may refer to files that only
    /// exist inside a commit).
    pub fn new<R: AsRef<Path>, P: AsRef<Path>>(repo_root: R, file_path: P) -> Self {
        Self {
            abs: absolutize(file_path.as_ref()),
            repo_root: absolutize(repo_root.as_ref()),
        }
    }

    /// The canonical absolute path of the file.
    pub fn abs_path(&self) -> &Path {
        &self.abs
    }

    /// The absolute path of the repository root.
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// The path relative to the process working directory.
    pub fn cwd_path(&self) -> PathBuf {
        match std::env::current_dir() {
            Ok(cwd) => relative_to(&self.abs, &absolutize(&cwd)),
            Err(_) => self.abs.clone(),
        }
    }

    /// The path relative to the repository root, as git trees address it.
    pub fn repo_path(&self) -> PathBuf {
        relative_to(&self.abs, &self.repo_root)
    }
}

impl PartialEq for RepoPath {
    fn eq(&self, other: &Self) -> bool {
        self.abs == other.abs
    }
}

impl Eq for RepoPath {}

impl Hash for RepoPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.abs.hash(state);
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cwd_path().display())
    }
}

/// Absolutize and lexically normalize a path without touching the
/// filesystem (no symlink resolution, the target may not exist).
fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Compute `path` relative to `base`, inserting `..` components where the
/// two diverge. Both inputs must be absolute and normalized.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path_components: Vec<Component> = path.components().collect();
    let base_components: Vec<Component> = base.components().collect();

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &path_components[common..] {
        relative.push(component);
    }

    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}
