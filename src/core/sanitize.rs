// src/core/sanitize.rs

/// Collapse whitespace runs (including `&nbsp;` after decoding) to one space
/// and trim the ends.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop thousands separators the leaderboard sometimes prints inside numbers.
pub fn strip_grouping(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, ',' | ' ' | '\u{a0}')).collect()
}
