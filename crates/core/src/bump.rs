//! External version-bump invocation.
//!
//! Bumping is delegated to `bump2version` as an opaque side-effecting
//! command; its output is logged, never parsed.

use std::process::Command;

use tracing::info;

use crate::errors::BumpError;

/// The bump command and its default flags.
pub const BUMP_COMMAND: &str = "bump2version";
pub const DEFAULT_BUMP_OPTIONS: &[&str] = &["--allow-dirty"];

/// Which component of the version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpPart {
    Major,
    Minor,
    Patch,
}

impl std::fmt::Display for BumpPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for BumpPart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            other => Err(format!(
                "unknown version part '{other}' (expected major, minor or patch)"
            )),
        }
    }
}

/// Run the bump tool for one version part with the default flags.
pub fn run_bump(part: BumpPart) -> Result<(), BumpError> {
    run_bump_command(BUMP_COMMAND, &part.to_string(), DEFAULT_BUMP_OPTIONS)
}

fn run_bump_command(command: &str, part: &str, options: &[&str]) -> Result<(), BumpError> {
    let cmd_display = format!("{command} {part} {}", options.join(" "));
    info!(command = %cmd_display, "attempting bump command");

    let output = Command::new(command)
        .arg(part)
        .args(options)
        .output()
        .map_err(|source| BumpError::SpawnFailed {
            command: cmd_display.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(BumpError::CommandFailed {
            command: cmd_display,
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    info!("{}", String::from_utf8_lossy(&output.stdout));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_round_trips_through_strings() {
        for name in ["major", "minor", "patch"] {
            let part: BumpPart = name.parse().unwrap();
            assert_eq!(part.to_string(), name);
        }
        assert!("majorest".parse::<BumpPart>().is_err());
    }

    #[test]
    fn test_missing_command_is_spawn_failure() {
        let result = run_bump_command("definitely-not-a-real-bump-tool", "patch", &[]);
        assert!(matches!(result, Err(BumpError::SpawnFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_command_failure() {
        let result = run_bump_command("false", "patch", &[]);
        assert!(matches!(result, Err(BumpError::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_command() {
        assert!(run_bump_command("true", "patch", &[]).is_ok());
    }
}
