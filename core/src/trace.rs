//! Evaluation trace types for debugging predicate behavior.
//!
//! [`PredicateTrace`] mirrors the shape of a [`JsonPredicate`](crate::JsonPredicate)
//! but records results instead of conditions. Use
//! [`apply_with_trace()`](crate::JsonPredicate::apply_with_trace) to see which
//! leaves matched and what value each one was given.
//!
//! # Example
//!
//! ```
//! use jmatch::{JsonPredicate, JsonValue, PredicateTrace};
//!
//! let predicate = JsonPredicate::parse(r#"{"key": "legs", "value": {"equals": 4}}"#).unwrap();
//! let trace = predicate.apply_with_trace(&JsonValue::parse(r#"{"legs": 3}"#).unwrap());
//!
//! assert!(!trace.matched());
//! if let PredicateTrace::Leaf { value, matcher, .. } = &trace {
//!     assert_eq!(value.to_string(), "3");
//!     assert_eq!(matcher, r#"{"equals":4}"#);
//! }
//! ```

use crate::JsonValue;

/// Trace of a predicate evaluation.
///
/// In And/Or, ALL children are evaluated (no short-circuit) for maximum
/// debugging value. The `matched` result is still correct.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateTrace {
    /// A single matcher evaluation.
    Leaf {
        /// Whether the matcher matched.
        matched: bool,
        /// Scope descended before the key lookup.
        scope: Vec<String>,
        /// Terminal key, if any.
        key: Option<String>,
        /// The value handed to the value matcher (`null` when the path was missing).
        value: JsonValue,
        /// Grammar form of the value matcher (e.g., `{"at_least":5}`).
        matcher: String,
    },
    /// AND: all children must match.
    And {
        /// Whether all children matched.
        matched: bool,
        /// Trace of each child.
        children: Vec<PredicateTrace>,
    },
    /// OR: any child must match.
    Or {
        /// Whether any child matched.
        matched: bool,
        /// Trace of each child.
        children: Vec<PredicateTrace>,
    },
    /// NOT: inverts inner result.
    Not {
        /// Whether the NOT predicate matched (i.e., inner did NOT match).
        matched: bool,
        /// Trace of the inner predicate.
        inner: Box<PredicateTrace>,
    },
}

impl PredicateTrace {
    /// Get the overall match result of this predicate.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Leaf { matched, .. }
            | Self::And { matched, .. }
            | Self::Or { matched, .. }
            | Self::Not { matched, .. } => *matched,
        }
    }

    /// Leaf traces in evaluation order, depth first.
    #[must_use]
    pub fn leaves(&self) -> Vec<&PredicateTrace> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a PredicateTrace>) {
        match self {
            Self::Leaf { .. } => out.push(self),
            Self::And { children, .. } | Self::Or { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            Self::Not { inner, .. } => inner.collect_leaves(out),
        }
    }
}
