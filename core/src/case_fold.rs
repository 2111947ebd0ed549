//! Case-insensitive string comparison
//!
//! Comparison is performed per `char` using *simple* case mappings: two characters
//! match when they are identical, when their single-character uppercase forms agree,
//! or when their lowercase forms agree. Full case folding (`ß` → `ss`) is not
//! applied, so matching never changes the length of either side.
//!
//! Characters whose lowercase expands to several code points (`İ` → `i̇`) are
//! compared on the first code point, which makes `İ` and `i` equal.

/// Returns `true` if `a` and `b` are equal ignoring case.
#[inline]
#[must_use]
pub fn chars_eq(a: char, b: char) -> bool {
    a == b || simple_upper(a) == simple_upper(b) || simple_lower(a) == simple_lower(b)
}

fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn simple_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// `a == b`, ignoring case.
///
/// ```
/// use jmatch::case_fold;
///
/// assert!(case_fold::eq("Mittens", "mITTENS"));
/// assert!(case_fold::eq("i", "İ"));
/// ```
#[must_use]
pub fn eq(a: &str, b: &str) -> bool {
    let mut left = a.chars();
    let mut right = b.chars();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if chars_eq(x, y) => {}
            _ => return false,
        }
    }
}

/// `haystack.starts_with(needle)`, ignoring case.
#[must_use]
pub fn starts_with(haystack: &str, needle: &str) -> bool {
    let mut hay = haystack.chars();
    needle
        .chars()
        .all(|n| hay.next().is_some_and(|h| chars_eq(h, n)))
}

/// `haystack.ends_with(needle)`, ignoring case.
#[must_use]
pub fn ends_with(haystack: &str, needle: &str) -> bool {
    let mut hay = haystack.chars().rev();
    needle
        .chars()
        .rev()
        .all(|n| hay.next().is_some_and(|h| chars_eq(h, n)))
}

/// `haystack.contains(needle)`, ignoring case.
#[must_use]
pub fn contains(haystack: &str, needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return true;
    }
    let hay: Vec<char> = haystack.chars().collect();
    hay.windows(needle.len())
        .any(|window| window.iter().zip(&needle).all(|(&h, &n)| chars_eq(h, n)))
}
