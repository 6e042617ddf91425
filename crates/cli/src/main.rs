//! verguard command-line tool.
//!
//! Verifies that raw-text version files were bumped relative to a git
//! base revision, keeps secondary version-bearing files in sync with the
//! primary one, and auto-resolves version-only merge conflicts.
//!
//! Works best with a `.verguard.toml` at the repository root; see
//! `verguard example-config`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use verguard_core::bump::{run_bump, BumpPart};
use verguard_core::check::{run_check, CheckOutcome};
use verguard_core::config::{
    example_config, reconcile_regexes, VersionConfig, VersionSpec, DEFAULT_CONFIG_FILE,
    DEFAULT_VERSION_REGEX,
};
use verguard_core::git::GitClient;
use verguard_core::hooks;
use verguard_core::merge::{run_merge, MergeOutcome, MergeStrategy};
use verguard_core::paths::RepoPath;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Version file checker and version-only merge conflict resolver.
#[derive(Parser, Debug)]
#[command(
    name = "verguard",
    version,
    about = "Verify raw-text version files against a git base and auto-resolve version-only merge conflicts"
)]
struct Cli {
    /// Minimum log level: error, warn, info, debug, trace.
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: String,

    /// Config file path, relative to the repository root.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by the check and merge flows.
#[derive(Args, Debug)]
struct InputArgs {
    /// File to base all version checks against.
    #[arg(short = 'v', long, default_value = DEFAULT_CONFIG_FILE)]
    version_file: PathBuf,

    /// Regex to extract the version out of the version file.
    #[arg(short = 'r', long, default_value = DEFAULT_VERSION_REGEX)]
    version_regex: String,

    /// Extra files to check version numbers in (overrides the config).
    #[arg(short = 'f', long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Regexes for the extra files, matched positionally.
    #[arg(long, num_args = 1..)]
    file_regexes: Vec<String>,

    /// Git tag/branch/hash to verify.
    #[arg(short = 'c', long, default_value = "HEAD")]
    current: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify version files were bumped relative to a base revision.
    Check {
        /// Revision to check against; tries origin/main and origin/master
        /// when omitted.
        #[arg(short = 'b', long)]
        base: Option<String>,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Auto-resolve version-only merge conflicts in an in-progress merge.
    Merge {
        /// Resolution strategy: current, incoming, both, neither, higher,
        /// lower. Almost always choose higher.
        #[arg(default_value = "higher")]
        strategy: String,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Bump local version files via bump2version.
    Update {
        /// Version part to increment: major, minor or patch.
        part: String,
    },

    /// Install verguard as a git hook.
    InstallHook {
        /// Hook to install.
        #[arg(value_parser = clap::builder::PossibleValuesParser::new(hooks::SUPPORTED_HOOKS))]
        hook: String,
    },

    /// Print an example .verguard.toml to stdout.
    ExampleConfig,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config, command, ..
    } = cli;

    match command {
        Commands::ExampleConfig => {
            println!("{}", example_config());
            Ok(())
        }
        Commands::Update { part } => {
            let part: BumpPart = part.parse().map_err(|e: String| anyhow!(e))?;
            run_bump(part).context("version bump failed")?;
            Ok(())
        }
        Commands::InstallHook { hook } => {
            let client = open_repo()?;
            let installed = hooks::install_hook(client.workdir(), &hook)?;
            info!(hook = %installed.display(), "hook installed... ok");
            Ok(())
        }
        Commands::Check { base, inputs } => cmd_check(base, inputs, &config),
        Commands::Merge { strategy, inputs } => cmd_merge(strategy, inputs, &config),
    }
}

fn open_repo() -> Result<GitClient> {
    GitClient::discover(".").context("this utility must be run from a git repository")
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_check(base: Option<String>, inputs: InputArgs, config_path: &Path) -> Result<()> {
    let client = open_repo()?;
    let base = client.base_commit(base.as_deref())?;
    let current = client.commit(&inputs.current)?;

    let config_specs = worktree_config_specs(&client, config_path);
    let specs = assemble_specs(&client, &inputs, config_specs);

    let scope = cwd_scope(&client);
    let outcome = run_check(&client, &base, &current, &specs, scope.as_deref()).context(
        "version check failed; try `verguard update patch` (or bump2version patch \
         --allow-dirty), or re-run with --log-level debug for more detail",
    )?;

    match outcome {
        CheckOutcome::NoChangesInScope => {
            info!("no changes detected between current commit and base commit... ok");
        }
        CheckOutcome::Passed { version } => {
            info!(version, "all files matched the correct version... ok");
        }
    }
    Ok(())
}

fn cmd_merge(strategy: String, inputs: InputArgs, config_path: &Path) -> Result<()> {
    let strategy: MergeStrategy = strategy.parse().map_err(|e: String| anyhow!(e))?;

    let client = open_repo()?;
    let current = client.commit(&inputs.current)?;

    // The merge flow reads the config from the commit being merged into,
    // never from the (possibly conflicted) working tree.
    let config_specs = match VersionConfig::load_from_commit(&current, config_path) {
        Ok(config) => {
            let root = client.workdir().to_path_buf();
            let base_dir = config_path
                .parent()
                .map(|p| root.join(p))
                .unwrap_or_else(|| root.clone());
            config.into_specs(&root, &base_dir)
        }
        Err(err) => {
            warn!(%err, "config not found at the current commit, skipping");
            Vec::new()
        }
    };
    let specs = assemble_specs(&client, &inputs, config_specs);

    match run_merge(&client, &inputs.current, &specs, strategy)? {
        MergeOutcome::NoConflicts => {
            info!("no merge conflicts detected... ok");
        }
        MergeOutcome::Completed {
            resolved,
            unresolved,
        } => {
            info!(
                resolved = resolved.len(),
                unresolved = unresolved.len(),
                "resolved all version merge conflicts that could be auto-resolved... ok"
            );
            for path in &unresolved {
                warn!(path = %path.display(), "conflicts remain, resolve manually");
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Input assembly
// ---------------------------------------------------------------------------

/// Load tracked-file specs from the working-tree config, degrading to an
/// empty list with a warning when the config is absent or malformed.
fn worktree_config_specs(client: &GitClient, config_path: &Path) -> Vec<VersionSpec> {
    let abs = client.workdir().join(config_path);
    match VersionConfig::load_from_file(&abs) {
        Ok(config) => {
            let root = client.workdir().to_path_buf();
            let base_dir = abs.parent().map(Path::to_path_buf).unwrap_or(root.clone());
            config.into_specs(&root, &base_dir)
        }
        Err(err) => {
            warn!(%err, "config not found or invalid, skipping; see `verguard example-config`");
            Vec::new()
        }
    }
}

/// Merge CLI-provided files/regexes over config-provided ones into the
/// ordered spec list, primary first.
///
/// CLI file lists replace the config's tracked files wholesale; a
/// regex-count mismatch is reconciled against the primary version regex.
fn assemble_specs(
    client: &GitClient,
    inputs: &InputArgs,
    config_specs: Vec<VersionSpec>,
) -> Vec<VersionSpec> {
    let root = client.workdir();

    let mut paths: Vec<RepoPath> = vec![RepoPath::new(root, &inputs.version_file)];
    let mut patterns: Vec<String> = vec![inputs.version_regex.clone()];

    if inputs.files.is_empty() {
        paths.extend(config_specs.iter().map(|s| s.path.clone()));
    } else {
        paths.extend(inputs.files.iter().map(|f| RepoPath::new(root, f)));
    }

    if inputs.file_regexes.is_empty() {
        patterns.extend(config_specs.iter().map(|s| s.pattern.clone()));
    } else {
        patterns.extend(inputs.file_regexes.iter().cloned());
    }

    let patterns = reconcile_regexes(paths.len(), patterns, &inputs.version_regex);
    paths
        .into_iter()
        .zip(patterns)
        .map(|(path, pattern)| VersionSpec { path, pattern })
        .collect()
}

/// The repo-relative prefix of the invoking working directory, used to
/// scope change detection; `None` means the whole tree.
fn cwd_scope(client: &GitClient) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let rel = cwd.strip_prefix(client.workdir()).ok()?;
    if rel.as_os_str().is_empty() {
        None
    } else {
        Some(rel.to_path_buf())
    }
}
