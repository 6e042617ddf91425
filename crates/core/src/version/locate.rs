//! The version locator: regex-first, literal-substring fallback.
//!
//! Version files mix fixed-format text (e.g. `"version": "1.2.3"`) with
//! consumer-supplied search templates that approximate but don't strictly
//! satisfy regex syntax (unescaped brackets and the like). The locator
//! therefore tries the pattern as a regex and, failing that, as a literal
//! substring, so well-formed non-regex search strings don't hard-fail.

use regex_lite::Regex;
use tracing::debug;

use crate::errors::CheckError;

/// Return the first match of `pattern` in `content`.
///
/// Two-step fallback: compile and match `pattern` as a regex; if it does
/// not compile or does not match, fall back to literal containment and
/// return the pattern itself. `path` is only used for error context.
pub fn search_content(content: &str, pattern: &str, path: &str) -> Result<String, CheckError> {
    if let Ok(regex) = Regex::new(pattern) {
        if let Some(found) = regex.find(content) {
            return Ok(found.as_str().to_string());
        }
    }

    if content.contains(pattern) {
        debug!(pattern, "regex match failed, but raw string compare succeeded");
        return Ok(pattern.to_string());
    }

    Err(CheckError::PatternNotFound {
        pattern: pattern.to_string(),
        path: path.to_string(),
    })
}

/// Whether one line matches `pattern`, as a regex or as a literal substring.
///
/// Same fallback rule as [`search_content`], but as a boolean test; used to
/// pick the version-bearing lines out of a conflict body.
pub fn line_matches(pattern: &str, line: &str) -> bool {
    if let Ok(regex) = Regex::new(pattern) {
        if regex.is_match(line) {
            return true;
        }
    }
    line.contains(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_match_returns_match_text() {
        let content = "stuff\nversion = \"1.2.3\"\nmore";
        let found = search_content(content, r"(\d+\.?){3}", "f").unwrap();
        assert_eq!(found, "1.2.3");
    }

    #[test]
    fn test_invalid_regex_falls_back_to_literal() {
        // Unbalanced bracket: fails to compile as a regex, but the literal
        // text appears verbatim in the content.
        let pattern = "version [1.2.3";
        let content = "before version [1.2.3 after";
        let found = search_content(content, pattern, "f").unwrap();
        assert_eq!(found, pattern);
    }

    #[test]
    fn test_valid_regex_no_match_falls_back_to_literal() {
        // Compiles fine but matches nothing; the raw text is present.
        let pattern = "^zzz$";
        let content = "a ^zzz$ b";
        let found = search_content(content, pattern, "f").unwrap();
        assert_eq!(found, pattern);
    }

    #[test]
    fn test_no_match_at_all_errors() {
        let result = search_content("nothing here", r"(\d+\.?){3}", "version.txt");
        assert!(matches!(
            result,
            Err(CheckError::PatternNotFound { .. })
        ));
    }

    #[test]
    fn test_line_matches_regex_and_literal() {
        assert!(line_matches(r"version: \d+\.\d+\.\d+", "version: 1.0.0\n"));
        assert!(line_matches("plain text", "some plain text here"));
        assert!(!line_matches(r"version: \d+\.\d+\.\d+", "unrelated line\n"));
    }
}
