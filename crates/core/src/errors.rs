//! Error types for the verguard core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.
//!
//! Check failures are fatal to the overall check; resolve failures are
//! file-scoped and non-fatal. Nothing in this library exits the process —
//! whether an error halts the pipeline is always the caller's decision.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Bump(#[from] BumpError),

    #[error(transparent)]
    Hook(#[from] HookError),
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from local Git (git2) operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The path is not inside a git repository.
    #[error("no git repository found at or above '{0}'")]
    RepositoryNotFound(String),

    /// A ref (branch, tag, SHA) could not be resolved.
    #[error("git ref not found: {0}")]
    RefNotFound(String),

    /// No base ref was given and none of the fallback refs resolved.
    #[error("no base ref provided, and none of the default bases ({0}) exist")]
    NoValidBase(String),

    /// `MERGE_HEAD` does not exist — the repository is not mid-merge.
    #[error("MERGE_HEAD not found, repository is not in a merge state")]
    NoMergeHead,

    /// A file was not present in a commit's tree.
    #[error("file '{path}' not found in commit {commit}")]
    FileNotFound { path: String, commit: String },

    /// A blob's content was not valid UTF-8.
    #[error("file '{path}' at commit {commit} is not valid UTF-8")]
    NonUtf8Content { path: String, commit: String },

    /// A `git2` library error.
    #[error("git2 error: {0}")]
    Git2Error(#[from] git2::Error),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found on disk.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error in '{path}': {detail}")]
    ParseError { path: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Check errors
// ---------------------------------------------------------------------------

/// Errors from the version check pipeline.
///
/// Any of these is terminal for the overall check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The tracked file / regex lists were empty.
    #[error("no files or regexes provided")]
    MissingInput,

    /// The search pattern matched nothing, neither as a regex nor as a
    /// literal substring.
    #[error("could not find \"{pattern}\" in '{path}'")]
    PatternNotFound { pattern: String, path: String },

    /// A version string failed to parse as a semantic version.
    #[error("version not detected: \"{text}\" is not a semantic version (see semver.org)")]
    VersionNotDetected { text: String },

    /// The new version is not strictly greater than the old one.
    #[error("new version {new} must be greater than old version {old} (see semver.org)")]
    VersionNotIncreasing { old: String, new: String },

    /// One or more synchronized files did not contain the primary version.
    #[error("{count} file(s) out of sync with the primary version {version}: {files:?}")]
    SyncMismatch {
        version: String,
        count: usize,
        files: Vec<PathBuf>,
    },

    /// Underlying git error during the check.
    #[error("check git error: {0}")]
    GitError(#[from] GitError),
}

// ---------------------------------------------------------------------------
// Merge errors
// ---------------------------------------------------------------------------

/// Errors from the merge conflict resolution pipeline.
///
/// Per-file variants are non-fatal: one unresolvable file does not block
/// resolution of the others.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The tracked file / regex lists were empty.
    #[error("no files or regexes provided")]
    MissingInput,

    /// A conflicted version file is missing from the working tree.
    #[error("version file '{0}' does not exist in the working tree")]
    FileMissing(PathBuf),

    /// I/O error reading or writing a conflicted file.
    #[error("I/O error on '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to extract versions from the primary file's two sides.
    #[error("merge version extraction failed: {0}")]
    CheckError(#[from] CheckError),

    /// Underlying git error during the merge.
    #[error("merge git error: {0}")]
    GitError(#[from] GitError),
}

// ---------------------------------------------------------------------------
// Bump tool errors
// ---------------------------------------------------------------------------

/// Errors from invoking the external version-bump command.
#[derive(Debug, Error)]
pub enum BumpError {
    /// The bump command exited with a non-zero status.
    #[error("bump command '{command}' failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// The bump command could not be spawned.
    #[error("failed to run bump command '{command}': {source}")]
    SpawnFailed {
        command: String,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Hook installation errors
// ---------------------------------------------------------------------------

/// Errors from git-hook installation.
#[derive(Debug, Error)]
pub enum HookError {
    /// A hook with the same name is already installed.
    #[error("git hook '{0}' already exists; remove it and re-try if further action is desired")]
    AlreadyInstalled(PathBuf),

    /// The running executable's path could not be determined.
    #[error("could not determine the verguard binary path: {0}")]
    BinaryNotFound(String),

    /// Symlinking the hook failed.
    #[error("failed to install hook at '{path}': {source}")]
    InstallFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}
