//! `ValueMatcher`: leaf tests over a single JSON value
//!
//! A value matcher answers one question about one value: is it equal to
//! something, inside a numeric range, present, a matching version string, and so
//! on. Matchers are total: a value of the wrong shape is a non-match, never an
//! error.

use crate::{case_fold, FiniteF64, JsonPredicate, JsonValue, VersionMatcher};

/// A test applied to a single [`JsonValue`].
///
/// Exactly one variant is active per instance; the grammar form of each variant
/// is described in [`grammar`](crate::grammar).
///
/// # Example
///
/// ```
/// use jmatch::{JsonValue, ValueMatcher};
///
/// let range = ValueMatcher::number_range(Some(5.0), Some(7.0));
/// assert!(range.apply(&JsonValue::from(5)));
/// assert!(range.apply(&JsonValue::from(7.0)));
/// assert!(!range.apply(&JsonValue::from(4.999)));
/// assert!(!range.apply(&JsonValue::from("6")));
///
/// let exact = ValueMatcher::equals("VALUE");
/// assert!(!exact.apply(&JsonValue::from("value")));
/// assert!(exact.apply_with(&JsonValue::from("value"), true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueMatcher {
    /// Structural equality with the expected value.
    Exact(JsonValue),

    /// A number within the inclusive range. An absent bound imposes no constraint.
    NumberRange {
        /// Lower bound, inclusive.
        min: Option<FiniteF64>,
        /// Upper bound, inclusive.
        max: Option<FiniteF64>,
    },

    /// `true`: the value is anything but null. `false`: the value is null.
    Presence(bool),

    /// A version string satisfying the constraint.
    Version(VersionMatcher),

    /// A string starting with the needle (coerced to a string).
    StringBegins(JsonValue),

    /// A string ending with the needle (coerced to a string).
    StringEnds(JsonValue),

    /// A string containing the needle (coerced to a string).
    StringContains(JsonValue),

    /// An array with an element satisfying the predicate. With an `index`, only
    /// that element is tested; negative or out-of-range indexes never match.
    ArrayContains {
        /// Predicate applied to elements.
        predicate: Box<JsonPredicate>,
        /// Restrict the test to one position.
        index: Option<i32>,
    },

    /// An array (or a string holding a JSON array) whose length satisfies the
    /// predicate.
    ArrayLength(Box<JsonPredicate>),
}

impl ValueMatcher {
    /// Match values equal to `expected`.
    #[must_use]
    pub fn equals(expected: impl Into<JsonValue>) -> Self {
        Self::Exact(expected.into())
    }

    /// Match numbers in `[min, max]`. Non-finite bounds are treated as absent.
    #[must_use]
    pub fn number_range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::NumberRange {
            min: min.and_then(FiniteF64::new),
            max: max.and_then(FiniteF64::new),
        }
    }

    /// Match any non-null value.
    #[must_use]
    pub fn is_present() -> Self {
        Self::Presence(true)
    }

    /// Match only null (which includes missing fields).
    #[must_use]
    pub fn is_absent() -> Self {
        Self::Presence(false)
    }

    /// Match version strings against `constraint`.
    #[must_use]
    pub fn version(constraint: impl Into<String>) -> Self {
        Self::Version(VersionMatcher::new(constraint))
    }

    /// Match strings beginning with `needle`.
    #[must_use]
    pub fn string_begins(needle: impl Into<JsonValue>) -> Self {
        Self::StringBegins(needle.into())
    }

    /// Match strings ending with `needle`.
    #[must_use]
    pub fn string_ends(needle: impl Into<JsonValue>) -> Self {
        Self::StringEnds(needle.into())
    }

    /// Match strings containing `needle`.
    #[must_use]
    pub fn string_contains(needle: impl Into<JsonValue>) -> Self {
        Self::StringContains(needle.into())
    }

    /// Match arrays with any element satisfying `predicate`.
    #[must_use]
    pub fn array_contains(predicate: JsonPredicate) -> Self {
        Self::ArrayContains {
            predicate: Box::new(predicate),
            index: None,
        }
    }

    /// Match arrays whose element at `index` satisfies `predicate`.
    #[must_use]
    pub fn array_contains_at(predicate: JsonPredicate, index: i32) -> Self {
        Self::ArrayContains {
            predicate: Box::new(predicate),
            index: Some(index),
        }
    }

    /// Match arrays whose length satisfies `predicate`.
    #[must_use]
    pub fn array_length(predicate: JsonPredicate) -> Self {
        Self::ArrayLength(Box::new(predicate))
    }

    /// Apply case-sensitively.
    #[must_use]
    pub fn apply(&self, value: &JsonValue) -> bool {
        self.apply_with(value, false)
    }

    /// Apply, comparing strings without regard to case when `ignore_case` is set.
    ///
    /// Only `Exact` and the string matchers compare text directly; the array
    /// matchers pass the flag to their nested predicate.
    #[must_use]
    pub fn apply_with(&self, value: &JsonValue, ignore_case: bool) -> bool {
        match self {
            Self::Exact(expected) => values_equal(expected, value, ignore_case),
            Self::NumberRange { min, max } => value.as_f64().is_some_and(|n| {
                min.map_or(true, |m| n >= m.get()) && max.map_or(true, |m| n <= m.get())
            }),
            Self::Presence(present) => value.is_null() != *present,
            Self::Version(matcher) => value.as_str().is_some_and(|s| matcher.apply(s)),
            Self::StringBegins(needle) => string_test(
                value,
                needle,
                ignore_case,
                |h, n| h.starts_with(n),
                case_fold::starts_with,
            ),
            Self::StringEnds(needle) => string_test(
                value,
                needle,
                ignore_case,
                |h, n| h.ends_with(n),
                case_fold::ends_with,
            ),
            Self::StringContains(needle) => string_test(
                value,
                needle,
                ignore_case,
                |h, n| h.contains(n),
                case_fold::contains,
            ),
            Self::ArrayContains { predicate, index } => {
                let Some(items) = value.as_array() else {
                    return false;
                };
                match index {
                    None => items
                        .iter()
                        .any(|item| predicate.apply_ignoring_case(item, ignore_case)),
                    Some(i) => usize::try_from(*i)
                        .ok()
                        .and_then(|i| items.get(i))
                        .is_some_and(|item| predicate.apply_ignoring_case(item, ignore_case)),
                }
            }
            Self::ArrayLength(predicate) => {
                let len = match value {
                    JsonValue::Array(items) => items.len(),
                    JsonValue::String(text) => match JsonValue::parse(text) {
                        Ok(JsonValue::Array(items)) => items.len(),
                        _ => return false,
                    },
                    _ => return false,
                };
                predicate.apply_ignoring_case(&JsonValue::from(len), ignore_case)
            }
        }
    }

    /// Nesting depth contributed by predicates inside this matcher (0 for scalars).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::ArrayContains { predicate, .. } | Self::ArrayLength(predicate) => {
                predicate.depth()
            }
            _ => 0,
        }
    }

    /// The literal compared against, for `equals` and the string matchers.
    #[must_use]
    pub fn literal(&self) -> Option<&JsonValue> {
        match self {
            Self::Exact(value)
            | Self::StringBegins(value)
            | Self::StringEnds(value)
            | Self::StringContains(value) => Some(value),
            _ => None,
        }
    }
}

fn values_equal(expected: &JsonValue, actual: &JsonValue, ignore_case: bool) -> bool {
    if !ignore_case {
        return expected == actual;
    }
    match (expected, actual) {
        (JsonValue::String(a), JsonValue::String(b)) => case_fold::eq(a, b),
        (JsonValue::Array(a), JsonValue::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y, true))
        }
        (JsonValue::Object(a), JsonValue::Object(b)) => {
            // Keys compare exactly; only values fold.
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|w| values_equal(v, w, true)))
        }
        _ => expected == actual,
    }
}

fn string_test(
    value: &JsonValue,
    needle: &JsonValue,
    ignore_case: bool,
    exact: fn(&str, &str) -> bool,
    folded: fn(&str, &str) -> bool,
) -> bool {
    let (Some(haystack), Some(needle)) = (value.as_str(), needle.coerce_string()) else {
        return false;
    };
    if ignore_case {
        folded(haystack, &needle)
    } else {
        exact(haystack, &needle)
    }
}
