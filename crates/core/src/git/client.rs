//! Local Git repository access via `git2`.
//!
//! [`GitClient`] wraps a `git2::Repository` and exposes the handful of
//! read-only operations the checker needs (content and existence of files
//! at commits, scoped tree diffs, unmerged-path enumeration) plus the one
//! write operation: staging a resolved file.

use std::path::{Path, PathBuf};

use git2::{DiffOptions, Repository};
use tracing::{debug, info, warn};

use crate::errors::GitError;

/// Base refs tried, in order, when no base is supplied.
pub const DEFAULT_BASES: &[&str] = &["origin/main", "origin/master"];

/// High-level Git client wrapping a `git2::Repository`.
pub struct GitClient {
    repo: Repository,
    workdir: PathBuf,
}

/// An opaque handle to one commit, exposing read-only tree access.
pub struct CommitRef<'repo> {
    repo: &'repo Repository,
    commit: git2::Commit<'repo>,
}

impl GitClient {
    /// Discover the repository containing `path`, searching parent
    /// directories the way `git` itself does.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path)
            .map_err(|_| GitError::RepositoryNotFound(path.display().to_string()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::RepositoryNotFound(path.display().to_string()))?
            .to_path_buf();
        debug!(workdir = %workdir.display(), "opened git repository");
        Ok(Self { repo, workdir })
    }

    /// The repository's working tree root.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Resolve a revspec (branch, tag, SHA, `HEAD`, ...) to a commit.
    pub fn commit(&self, refspec: &str) -> Result<CommitRef<'_>, GitError> {
        let object = self
            .repo
            .revparse_single(refspec)
            .map_err(|_| GitError::RefNotFound(refspec.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| GitError::RefNotFound(refspec.to_string()))?;
        Ok(CommitRef {
            repo: &self.repo,
            commit,
        })
    }

    /// Resolve the base commit to check against.
    ///
    /// With no input, tries each of [`DEFAULT_BASES`] in order and fails
    /// only when none of them resolves.
    pub fn base_commit(&self, base: Option<&str>) -> Result<CommitRef<'_>, GitError> {
        if let Some(base) = base {
            return self.commit(base);
        }

        info!(
            "no base provided, trying: {}",
            DEFAULT_BASES.join(", ")
        );
        for candidate in DEFAULT_BASES {
            match self.commit(candidate) {
                Ok(commit) => {
                    info!(base = candidate, "using default base");
                    return Ok(commit);
                }
                Err(_) => warn!(base = candidate, "default base not detected"),
            }
        }
        Err(GitError::NoValidBase(DEFAULT_BASES.join(", ")))
    }

    /// Resolve the incoming commit of an in-progress merge.
    pub fn merge_head(&self) -> Result<CommitRef<'_>, GitError> {
        self.commit("MERGE_HEAD")
            .map_err(|_| GitError::NoMergeHead)
    }

    /// List the repo-relative paths that differ between two commits,
    /// optionally restricted to a path prefix.
    ///
    /// A `scope` of `None`, the empty path, or `.` means the whole tree.
    pub fn diff_paths(
        &self,
        base: &CommitRef<'_>,
        current: &CommitRef<'_>,
        scope: Option<&Path>,
    ) -> Result<Vec<PathBuf>, GitError> {
        let mut opts = DiffOptions::new();
        if let Some(scope) = scope {
            if !scope.as_os_str().is_empty() && scope != Path::new(".") {
                opts.pathspec(scope);
            }
        }

        let diff = self.repo.diff_tree_to_tree(
            Some(&base.commit.tree()?),
            Some(&current.commit.tree()?),
            Some(&mut opts),
        )?;

        let mut paths = Vec::new();
        for delta in diff.deltas() {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path());
            if let Some(path) = path {
                paths.push(path.to_path_buf());
            }
        }
        debug!(count = paths.len(), "collected changed paths");
        Ok(paths)
    }

    /// Repo-relative paths currently in a conflicted (unmerged) index state.
    pub fn unmerged_paths(&self) -> Result<Vec<PathBuf>, GitError> {
        let index = self.repo.index()?;
        let mut paths = Vec::new();
        for conflict in index.conflicts()? {
            let conflict = conflict?;
            let entry = conflict
                .our
                .as_ref()
                .or(conflict.their.as_ref())
                .or(conflict.ancestor.as_ref());
            if let Some(entry) = entry {
                let path = PathBuf::from(String::from_utf8_lossy(&entry.path).into_owned());
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        Ok(paths)
    }

    /// Stage a working-tree file, clearing any conflict entries for it.
    ///
    /// Idempotent: staging an already-staged path is a no-op.
    pub fn stage(&self, repo_relative: &Path) -> Result<(), GitError> {
        let mut index = self.repo.index()?;
        index.add_path(repo_relative)?;
        index.write()?;
        debug!(path = %repo_relative.display(), "staged resolved file");
        Ok(())
    }
}

impl CommitRef<'_> {
    /// The full commit id as hex.
    pub fn id(&self) -> String {
        self.commit.id().to_string()
    }

    /// Whether `path` (repo-relative) exists in this commit's tree.
    pub fn exists(&self, path: &Path) -> bool {
        self.commit
            .tree()
            .map(|tree| tree.get_path(path).is_ok())
            .unwrap_or(false)
    }

    /// Read the UTF-8 content of `path` (repo-relative) at this commit.
    pub fn content(&self, path: &Path) -> Result<String, GitError> {
        let not_found = || GitError::FileNotFound {
            path: path.display().to_string(),
            commit: self.id(),
        };

        let tree = self.commit.tree()?;
        let entry = tree.get_path(path).map_err(|_| not_found())?;
        let object = entry.to_object(self.repo)?;
        let blob = object.as_blob().ok_or_else(not_found)?;
        let text = std::str::from_utf8(blob.content()).map_err(|_| GitError::NonUtf8Content {
            path: path.display().to_string(),
            commit: self.id(),
        })?;
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;

    fn init_repo(dir: &Path) -> Repository {
        Repository::init(dir).unwrap()
    }

    fn commit_file(repo: &Repository, path: &str, content: &str, message: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(workdir.join(parent)).unwrap();
        }
        std::fs::write(workdir.join(path), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
        let tree_oid = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_oid).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_discover_fails_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            GitClient::discover(dir.path()),
            Err(GitError::RepositoryNotFound(_))
        ));
    }

    #[test]
    fn test_content_and_exists() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_file(&repo, "version.txt", "0.0.1\n", "init");

        let client = GitClient::discover(dir.path()).unwrap();
        let head = client.commit("HEAD").unwrap();

        assert!(head.exists(Path::new("version.txt")));
        assert!(!head.exists(Path::new("missing.txt")));
        assert_eq!(head.content(Path::new("version.txt")).unwrap(), "0.0.1\n");
        assert!(matches!(
            head.content(Path::new("missing.txt")),
            Err(GitError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_diff_paths_scoped() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let base_oid = commit_file(&repo, "version.txt", "0.0.1\n", "init");
        commit_file(&repo, "docs/readme.md", "hello\n", "docs");

        let client = GitClient::discover(dir.path()).unwrap();
        let base = client.commit(&base_oid.to_string()).unwrap();
        let head = client.commit("HEAD").unwrap();

        let all = client.diff_paths(&base, &head, None).unwrap();
        assert_eq!(all, vec![PathBuf::from("docs/readme.md")]);

        let scoped = client
            .diff_paths(&base, &head, Some(Path::new("src")))
            .unwrap();
        assert!(scoped.is_empty());

        // "." scope means the whole tree.
        let dot = client
            .diff_paths(&base, &head, Some(Path::new(".")))
            .unwrap();
        assert_eq!(dot.len(), 1);
    }

    #[test]
    fn test_base_commit_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let oid = commit_file(&repo, "f.txt", "x\n", "init");

        let client = GitClient::discover(dir.path()).unwrap();
        // Explicit base resolves directly.
        assert!(client.base_commit(Some(&oid.to_string())).is_ok());
        // No origin/main or origin/master in a scratch repo.
        assert!(matches!(
            client.base_commit(None),
            Err(GitError::NoValidBase(_))
        ));
    }

    #[test]
    fn test_merge_head_outside_merge() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_file(&repo, "f.txt", "x\n", "init");

        let client = GitClient::discover(dir.path()).unwrap();
        assert!(matches!(client.merge_head(), Err(GitError::NoMergeHead)));
    }

    #[test]
    fn test_unmerged_paths_empty_when_clean() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_file(&repo, "f.txt", "x\n", "init");

        let client = GitClient::discover(dir.path()).unwrap();
        assert!(client.unmerged_paths().unwrap().is_empty());
    }
}
