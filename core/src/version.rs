//! `VersionMatcher`: dotted version constraints
//!
//! A constraint is either a *pattern* or a *range*.
//!
//! Patterns are dot-separated segments, each one of:
//!
//! | Segment | Meaning |
//! |---------|---------|
//! | `N`     | the value segment equals `N` numerically (missing segments read as `0`) |
//! | `+`     | this and every following segment match |
//! | `N+`    | the value segment exists and its text starts with `N`; following segments match |
//!
//! Ranges use interval notation: `[1.0,2.0]`, `]1.0,2.0[`, `[1.0,)`, `(,2.0]` and so on.
//! `[` opening / `]` closing are inclusive, the reversed brackets are exclusive, and
//! parentheses mark an unbounded side. Bounds compare segment by segment, missing
//! segments reading as `0`.
//!
//! Both constraints and values are trimmed, and `-qualifier` suffixes (`-SNAPSHOT`,
//! `-rc1`) are ignored. A malformed constraint is accepted but never matches.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-[^+,\s\[\]()]*").expect("valid qualifier regex"));

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\[\]\(])\s*([0-9]+(?:\.[0-9]+)*)?\s*,\s*([0-9]+(?:\.[0-9]+)*)?\s*([\[\]\)])$")
        .expect("valid range regex")
});

/// A compiled version constraint.
///
/// # Example
///
/// ```
/// use jmatch::VersionMatcher;
///
/// let wildcard = VersionMatcher::new("1.+");
/// assert!(wildcard.apply("1.2.4"));
/// assert!(!wildcard.apply("2.0.0"));
///
/// let range = VersionMatcher::new("[1.2, 2.0[");
/// assert!(range.apply("1.9.9"));
/// assert!(!range.apply("2.0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionMatcher {
    constraint: String,
    parsed: Constraint,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Constraint {
    Malformed,
    Pattern(Vec<Segment>),
    Range {
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Number(u64),
    Prefix(String),
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Bound {
    version: Vec<u64>,
    inclusive: bool,
}

/// One segment of a candidate version: its text (for prefix tests) and value.
struct Part<'a> {
    text: &'a str,
    number: u64,
}

impl VersionMatcher {
    /// Compile `constraint`. Never fails: malformed input yields a matcher that
    /// rejects every version (see [`is_valid`](Self::is_valid)).
    #[must_use]
    pub fn new(constraint: impl Into<String>) -> Self {
        let constraint = constraint.into();
        let parsed = Constraint::parse(&constraint);
        Self { constraint, parsed }
    }

    /// The constraint text exactly as given.
    #[inline]
    #[must_use]
    pub fn constraint(&self) -> &str {
        &self.constraint
    }

    /// Returns `false` if the constraint could not be parsed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(self.parsed, Constraint::Malformed)
    }

    /// Returns `true` if `version` satisfies the constraint.
    ///
    /// `version` must be dot-separated non-negative integers (after trimming and
    /// dropping a `-qualifier`); anything else never matches.
    #[must_use]
    pub fn apply(&self, version: &str) -> bool {
        let normalized = normalize(version);
        let Some(parts) = split_version(&normalized) else {
            return false;
        };

        match &self.parsed {
            Constraint::Malformed => false,
            Constraint::Pattern(segments) => pattern_matches(segments, &parts),
            Constraint::Range { lower, upper } => {
                let numbers: Vec<u64> = parts.iter().map(|p| p.number).collect();
                lower.as_ref().map_or(true, |b| {
                    let ord = compare(&numbers, &b.version);
                    ord == Ordering::Greater || (b.inclusive && ord == Ordering::Equal)
                }) && upper.as_ref().map_or(true, |b| {
                    let ord = compare(&numbers, &b.version);
                    ord == Ordering::Less || (b.inclusive && ord == Ordering::Equal)
                })
            }
        }
    }
}

impl Constraint {
    fn parse(text: &str) -> Self {
        let normalized = normalize(text);
        if normalized.starts_with(['[', ']', '(']) {
            Self::parse_range(&normalized)
        } else {
            Self::parse_pattern(&normalized)
        }
        .unwrap_or(Self::Malformed)
    }

    fn parse_pattern(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        text.split('.')
            .map(|segment| {
                if segment == "+" {
                    Some(Segment::Any)
                } else if let Some(digits) = segment.strip_suffix('+') {
                    is_digits(digits).then(|| Segment::Prefix(digits.to_owned()))
                } else if is_digits(segment) {
                    segment.parse().ok().map(Segment::Number)
                } else {
                    None
                }
            })
            .collect::<Option<Vec<_>>>()
            .map(Self::Pattern)
    }

    fn parse_range(text: &str) -> Option<Self> {
        let caps = RANGE.captures(text)?;
        let open = caps.get(1)?.as_str();
        let close = caps.get(4)?.as_str();
        let lower = caps.get(2).map(|m| m.as_str());
        let upper = caps.get(3).map(|m| m.as_str());

        // Parentheses mark, and only mark, an unbounded side.
        if (open == "(") != lower.is_none() || (close == ")") != upper.is_none() {
            return None;
        }
        if lower.is_none() && upper.is_none() {
            return None;
        }

        let lower = match lower {
            Some(v) => Some(Bound {
                version: parse_numbers(v)?,
                inclusive: open == "[",
            }),
            None => None,
        };
        let upper = match upper {
            Some(v) => Some(Bound {
                version: parse_numbers(v)?,
                inclusive: close == "]",
            }),
            None => None,
        };
        Some(Self::Range { lower, upper })
    }
}

fn normalize(text: &str) -> String {
    QUALIFIER.replace_all(text.trim(), "").into_owned()
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_numbers(text: &str) -> Option<Vec<u64>> {
    text.split('.').map(|s| s.parse().ok()).collect()
}

fn split_version(text: &str) -> Option<Vec<Part<'_>>> {
    if text.is_empty() {
        return None;
    }
    text.split('.')
        .map(|text| {
            if !is_digits(text) {
                return None;
            }
            text.parse().ok().map(|number| Part { text, number })
        })
        .collect()
}

fn pattern_matches(segments: &[Segment], parts: &[Part<'_>]) -> bool {
    for (i, segment) in segments.iter().enumerate() {
        let part = parts.get(i);
        match segment {
            Segment::Any => return true,
            Segment::Prefix(prefix) => return part.is_some_and(|p| p.text.starts_with(prefix.as_str())),
            Segment::Number(n) => {
                if part.map_or(0, |p| p.number) != *n {
                    return false;
                }
            }
        }
    }
    parts.iter().skip(segments.len()).all(|p| p.number == 0)
}

fn compare(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}
