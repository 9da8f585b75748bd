//! Unified diff generation for draftwork documents.
//!
//! A single pure function over two document states. Callers treat an empty
//! diff as "no change", not as an error.

use similar::TextDiff;

/// Number of context lines around each hunk.
const CONTEXT_LINES: usize = 3;

/// Generate a unified diff between two document states.
///
/// Output uses `a/<path>` and `b/<path>` file headers and 3 lines of
/// context. Returns the empty string when `before` and `after` are equal
/// line for line.
pub fn unified_diff(before: &str, after: &str, path: &str) -> String {
    if before.lines().eq(after.lines()) {
        return String::new();
    }

    let diff = TextDiff::from_lines(before, after);
    let from_header = format!("a/{path}");
    let to_header = format!("b/{path}");

    diff.unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(&from_header, &to_header)
        .to_string()
}
