//! Leading JavaDoc comment location and normalization.
//!
//! Association is heuristic: the last complete `/** ... */` block before the
//! declaration wins, provided nothing but whitespace, ordinary comments, and
//! annotation lines sits between the block and the declaration start.

use std::sync::LazyLock;

use regex::Regex;

/// Backward scan window before the declaration start.
const SCAN_WINDOW_BYTES: usize = 20_000;

static JAVADOC_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*(.*?)\*/").unwrap());

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").unwrap());

static LEADING_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\* ?").unwrap());

/// Find and normalize the JavaDoc block immediately preceding a declaration
/// that starts at `start_byte`. Returns `None` when the nearest preceding
/// content is not a JavaDoc block; absence is a valid result, not an error.
pub fn leading_javadoc(source: &str, start_byte: usize) -> Option<String> {
    let start = start_byte.min(source.len());
    let mut window_start = start.saturating_sub(SCAN_WINDOW_BYTES);
    while !source.is_char_boundary(window_start) {
        window_start -= 1;
    }
    let window = &source[window_start..start];

    let last = JAVADOC_BLOCK_RE.find_iter(window).last()?;

    // Only blanks, plain comments, and annotation lines may separate the
    // block from the declaration.
    let between = COMMENT_RE.replace_all(&window[last.end()..], "");
    for line in between.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('@') {
            return None;
        }
    }

    Some(normalize_javadoc(last.as_str()))
}

/// Strip comment delimiters and per-line `*` gutters, preserving interior
/// line breaks and trimming blank lines at both ends.
pub fn normalize_javadoc(raw: &str) -> String {
    let mut body = raw.trim();
    body = body.strip_prefix("/**").unwrap_or(body);
    body = body.strip_suffix("*/").unwrap_or(body);

    let mut cleaned: Vec<String> = body
        .lines()
        .map(|line| LEADING_STAR_RE.replace(line.trim_end(), "").into_owned())
        .collect();

    while cleaned.first().is_some_and(|l| l.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}
