//! Semantic-version comparison with the brand-new-file policy.

use semver::Version;
use tracing::{info, warn};

use crate::errors::CheckError;

/// Verify that `new_text` is a strictly larger semantic version than
/// `old_text`.
///
/// Policy:
/// - empty `old_text` succeeds unconditionally (first-ever version);
/// - an unparsable version on either side is a hard failure
///   (`VersionNotDetected`) — absent and unparsable are distinct states;
/// - `new <= old` fails with `VersionNotIncreasing`.
///
/// Ordering follows semver precedence: numeric major.minor.patch, then
/// pre-release identifiers per dot-separated field, pre-release < release.
pub fn compare_versions(old_text: &str, new_text: &str) -> Result<(), CheckError> {
    let old = if old_text.is_empty() {
        warn!("old version empty, assuming brand new version");
        None
    } else {
        Some(parse(old_text)?)
    };
    let new = parse(new_text)?;

    info!(old = %old_text, new = %new_text, "comparing versions");

    let Some(old) = old else {
        info!("old version not detected, assuming first commit with new version");
        return Ok(());
    };

    if old < new {
        return Ok(());
    }
    Err(CheckError::VersionNotIncreasing {
        old: old_text.to_string(),
        new: new_text.to_string(),
    })
}

fn parse(text: &str) -> Result<Version, CheckError> {
    Version::parse(text).map_err(|_| CheckError::VersionNotDetected {
        text: text.to_string(),
    })
}
