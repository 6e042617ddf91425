//! Git-hook installation.
//!
//! Installs the running binary as a git hook by symlinking it into
//! `.git/hooks/`. Never overwrites an existing hook.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::HookError;

/// Hooks the tool knows how to act as.
pub const SUPPORTED_HOOKS: &[&str] = &["pre-push"];

/// Symlink the current executable into `.git/hooks/<hook>`.
///
/// Returns the installed hook path. Fails if a hook of that name already
/// exists; remove it first if replacement is intended.
pub fn install_hook(repo_root: &Path, hook: &str) -> Result<PathBuf, HookError> {
    let binary = std::env::current_exe()
        .map_err(|e| HookError::BinaryNotFound(e.to_string()))?;

    let hook_path = repo_root.join(".git").join("hooks").join(hook);
    if hook_path.exists() || hook_path.is_symlink() {
        return Err(HookError::AlreadyInstalled(hook_path));
    }

    link_hook(&binary, &hook_path).map_err(|source| HookError::InstallFailed {
        path: hook_path.clone(),
        source,
    })?;

    info!(binary = %binary.display(), hook = %hook_path.display(), "installed git hook");
    Ok(hook_path)
}

#[cfg(unix)]
fn link_hook(binary: &Path, hook_path: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(binary, hook_path)
}

#[cfg(not(unix))]
fn link_hook(binary: &Path, hook_path: &Path) -> std::io::Result<()> {
    // No symlinks without elevated rights; a copy behaves the same.
    std::fs::copy(binary, hook_path).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hooks_dir(root: &Path) {
        std::fs::create_dir_all(root.join(".git").join("hooks")).unwrap();
    }

    #[test]
    fn test_install_creates_hook() {
        let dir = tempfile::tempdir().unwrap();
        hooks_dir(dir.path());

        let installed = install_hook(dir.path(), "pre-push").unwrap();
        assert!(installed.is_symlink() || installed.is_file());
    }

    #[test]
    fn test_install_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        hooks_dir(dir.path());
        let existing = dir.path().join(".git/hooks/pre-push");
        std::fs::write(&existing, "#!/bin/sh\nexit 0\n").unwrap();

        let result = install_hook(dir.path(), "pre-push");
        assert!(matches!(result, Err(HookError::AlreadyInstalled(_))));
    }
}
