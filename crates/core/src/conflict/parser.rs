//! Conflict-region detection.
//!
//! Conflicts are detected in a single pass with one regex over the
//! three-part marker grammar: a start line (`<<<<<<< ` plus a ref label),
//! a divider line of exactly seven equals signs, and an end line
//! (`>>>>>>> ` plus a ref label). The two bodies between the markers are
//! captured as `current` and `incoming`.
//!
//! A parsed [`MergeConflict`] is a transient view over the file text it
//! was scanned from: byte offsets are invalidated by any rewrite, so
//! conflicts must be re-parsed after every mutation and never reused.

use std::sync::OnceLock;

use regex_lite::Regex;
use tracing::debug;

/// The conflict divider line.
pub(crate) const DIVIDER: &str = "=======\n";

fn conflict_re() -> &'static Regex {
    static CONFLICT_RE: OnceLock<Regex> = OnceLock::new();
    CONFLICT_RE.get_or_init(|| {
        Regex::new(
            r"(?ms)^(?P<start><{7} [^\n]*\n)(?P<current>.*?)^={7}\n(?P<incoming>.*?)^(?P<end>>{7} [^\n]*\n)",
        )
        .expect("conflict marker regex is valid")
    })
}

/// One conflict region inside a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    /// Byte offset of the region's first byte in the owning file text.
    pub start_index: usize,
    /// Byte offset one past the region's last byte.
    pub end_index: usize,
    /// The full start marker line, trailing newline included.
    pub start_line: String,
    /// The full end marker line, trailing newline included.
    pub end_line: String,
    /// Body between the start marker and the divider.
    pub current: String,
    /// Body between the divider and the end marker.
    pub incoming: String,
    /// The entire matched region.
    pub text: String,
}

/// Parse all conflict regions in `file_text`, in file order.
pub fn parse_conflicts(file_text: &str) -> Vec<MergeConflict> {
    let conflicts: Vec<MergeConflict> = conflict_re()
        .captures_iter(file_text)
        .map(|caps| {
            let whole = caps.get(0).expect("group 0 always present");
            MergeConflict {
                start_index: whole.start(),
                end_index: whole.end(),
                start_line: caps["start"].to_string(),
                end_line: caps["end"].to_string(),
                current: caps["current"].to_string(),
                incoming: caps["incoming"].to_string(),
                text: whole.as_str().to_string(),
            }
        })
        .collect();
    debug!(count = conflicts.len(), "parsed merge conflicts");
    conflicts
}

impl MergeConflict {
    /// Splice `replacement` over this region inside `file_text`.
    ///
    /// Only valid against the exact text this conflict was parsed from.
    pub fn apply(&self, file_text: &str, replacement: &str) -> String {
        debug!(
            "applying merge resolution, replacing:\n{}with:\n{}",
            self.text, replacement
        );
        let mut result = String::with_capacity(
            file_text.len() - self.text.len() + replacement.len(),
        );
        result.push_str(&file_text[..self.start_index]);
        result.push_str(replacement);
        result.push_str(&file_text[self.end_index..]);
        result
    }

    /// Re-wrap two bodies in this conflict's own markers; empty when both
    /// sides are empty.
    pub(crate) fn rewrap(&self, current: &str, incoming: &str) -> String {
        if current.is_empty() && incoming.is_empty() {
            return String::new();
        }
        format!(
            "{}{}{}{}{}",
            self.start_line, current, DIVIDER, incoming, self.end_line
        )
    }
}

/// A segment breaks line structure if it is non-empty and does not end at
/// a line boundary.
pub(crate) fn is_partial_line(text: &str) -> bool {
    !text.is_empty() && !text.ends_with('\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFLICTED: &str = "\
intro line
<<<<<<< HEAD
version: 1.0.0
=======
version: 1.1.0
>>>>>>> feature/bump
outro line
";

    #[test]
    fn test_parse_single_conflict() {
        let conflicts = parse_conflicts(CONFLICTED);
        assert_eq!(conflicts.len(), 1);

        let conflict = &conflicts[0];
        assert_eq!(conflict.start_line, "<<<<<<< HEAD\n");
        assert_eq!(conflict.end_line, ">>>>>>> feature/bump\n");
        assert_eq!(conflict.current, "version: 1.0.0\n");
        assert_eq!(conflict.incoming, "version: 1.1.0\n");
        assert_eq!(&CONFLICTED[conflict.start_index..conflict.end_index], conflict.text);
    }

    #[test]
    fn test_parse_multiple_conflicts_in_order() {
        let text = format!("{CONFLICTED}\nmiddle\n{CONFLICTED}");
        let conflicts = parse_conflicts(&text);
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts[0].start_index < conflicts[1].start_index);
    }

    #[test]
    fn test_no_conflicts_is_empty() {
        assert!(parse_conflicts("just a normal file\nwith lines\n").is_empty());
        assert!(parse_conflicts("").is_empty());
    }

    #[test]
    fn test_markers_must_start_a_line() {
        let text = "prefix <<<<<<< HEAD\nbody\n=======\nbody\n>>>>>>> other\n";
        assert!(parse_conflicts(text).is_empty());
    }

    #[test]
    fn test_multiline_bodies() {
        let text = "\
<<<<<<< HEAD
line a
line b
=======
line c
>>>>>>> other
";
        let conflicts = parse_conflicts(text);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].current, "line a\nline b\n");
        assert_eq!(conflicts[0].incoming, "line c\n");
    }

    #[test]
    fn test_apply_splices_by_offset() {
        let conflicts = parse_conflicts(CONFLICTED);
        let rewritten = conflicts[0].apply(CONFLICTED, "version: 1.1.0\n");
        assert_eq!(rewritten, "intro line\nversion: 1.1.0\noutro line\n");
        assert!(parse_conflicts(&rewritten).is_empty());
    }

    #[test]
    fn test_rewrap_preserves_markers() {
        let conflicts = parse_conflicts(CONFLICTED);
        let rewrapped = conflicts[0].rewrap("a\n", "b\n");
        assert_eq!(
            rewrapped,
            "<<<<<<< HEAD\na\n=======\nb\n>>>>>>> feature/bump\n"
        );
        assert_eq!(conflicts[0].rewrap("", ""), "");
    }

    #[test]
    fn test_is_partial_line() {
        assert!(!is_partial_line(""));
        assert!(!is_partial_line("complete\n"));
        assert!(is_partial_line("no trailing newline"));
    }
}
