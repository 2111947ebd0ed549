//! jmatch - JSON audience-matching predicates
//!
//! Decides whether a JSON document (device attributes, event payloads, locale and
//! version info) satisfies a declarative, composable boolean condition written in
//! a small JSON grammar.
//!
//! # Architecture
//!
//! - [`JsonValue`]: Immutable JSON document model
//! - [`ValueMatcher`]: Leaf test over a single value (equality, range, presence, ...)
//! - [`JsonMatcher`]: Field path (`scope` + `key`) composed with a `ValueMatcher`
//! - [`JsonPredicate`]: Boolean composition (And, Or, Not) of matchers
//! - [`grammar`]: Strict parser and canonical serializer for the JSON grammar
//!
//! # Key Design Insights
//!
//! 1. **Closed sum types**: every matcher kind is an enum variant, so evaluation,
//!    equality and the codec handle each kind exhaustively.
//!
//! 2. **Evaluation is total**: a document of the wrong shape is a non-match, never an
//!    error. Only the grammar codec fails, and it fails on the whole document.
//!
//! 3. **Missing reads as null**: absent fields and broken scope paths yield
//!    [`JsonValue::Null`], which is exactly what `{"is_present": false}` tests for.
//!
//! 4. **Structural equality**: two independently parsed predicates with the same
//!    content are `==` and hash alike, so callers can cache and deduplicate them.
//!
//! # Example
//!
//! ```
//! use jmatch::prelude::*;
//!
//! let predicate = JsonPredicate::parse(r#"{
//!     "or": [
//!         {"scope": ["android", "version"], "value": {"version_matches": "14.+"}},
//!         {"key": "locale", "value": {"string_begins": "EN", "ignore_case": true}}
//!     ]
//! }"#)?;
//!
//! let device = JsonValue::parse(r#"{"locale": "en-US", "android": {"version": "13.1"}}"#)?;
//! assert!(predicate.apply(&device));
//!
//! // Serialization is the inverse of parsing.
//! assert_eq!(JsonPredicate::parse(&predicate.to_string())?, predicate);
//! # Ok::<(), jmatch::ParseError>(())
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

pub mod case_fold;
pub mod grammar;
mod json_matcher;
mod json_value;
mod number;
mod predicate;
mod trace;
mod value_matcher;
mod version;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use json_matcher::{JsonMatcher, JsonMatcherBuilder};
pub use json_value::{JsonMap, JsonValue};
pub use number::FiniteF64;
pub use predicate::{JsonPredicate, JsonPredicateBuilder, PredicateType};
pub use value_matcher::ValueMatcher;
pub use version::VersionMatcher;

// Trace types
pub use trace::PredicateTrace;

/// Parse a predicate from JSON text with [`ParseLimits::default`].
///
/// # Errors
///
/// Returns a [`ParseError`] if the text is not JSON or not a valid predicate.
pub fn parse_predicate(text: &str) -> Result<JsonPredicate, ParseError> {
    JsonPredicate::parse(text)
}

/// Serialize a predicate to its canonical JSON grammar form.
#[must_use]
pub fn serialize_predicate(predicate: &JsonPredicate) -> JsonValue {
    predicate.to_json()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use jmatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core types
        JsonMatcher,
        JsonPredicate,
        JsonValue,
        // Config & errors
        ParseError,
        ParseLimits,
        PredicateTrace,
        PredicateType,
        ValueMatcher,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants & configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// Default maximum nesting depth for predicates.
///
/// Every combinator and matcher counts as one level, as does each predicate
/// nested inside `array_contains` / `array_length`. Parsing stops at this depth
/// before recursing further, which bounds stack use on adversarial input.
///
/// Each level adds at most two levels of JSON nesting to the serialized text.
/// With [`MAX_LITERAL_DEPTH`] this keeps every valid predicate within the 128
/// levels `serde_json` accepts, so serialized text always parses back. Raising
/// either limit past that bound trades the round trip for deeper trees.
pub const MAX_DEPTH: usize = 32;

/// Default maximum container nesting of `equals` and string-matcher literals.
///
/// A scalar has depth 0 and a flat array or object depth 1.
pub const MAX_LITERAL_DEPTH: usize = 63;

/// Limits applied while parsing and validating predicates.
///
/// Deserializable so hosts can load it from their own configuration:
///
/// ```
/// use jmatch::ParseLimits;
///
/// let limits: ParseLimits = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
/// assert_eq!(limits.max_depth, 8);
///
/// let defaults: ParseLimits = serde_json::from_str("{}").unwrap();
/// assert_eq!(defaults, ParseLimits::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParseLimits {
    /// Maximum nesting depth (see [`MAX_DEPTH`]).
    pub max_depth: usize,
    /// Maximum literal nesting depth (see [`MAX_LITERAL_DEPTH`]).
    pub max_literal_depth: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_literal_depth: MAX_LITERAL_DEPTH,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from parsing JSON text or the predicate grammar.
///
/// Grammar variants carry the offending JSON fragment. Evaluation never
/// produces an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The text was not JSON.
    #[error("invalid JSON: {message}")]
    InvalidJson {
        /// The underlying parser message.
        message: String,
    },

    /// A matcher or predicate position held something other than an object.
    #[error("expected a JSON object, found {found}")]
    ExpectedObject {
        /// The value found instead.
        found: JsonValue,
    },

    /// A value-matcher object had no recognized variant key.
    #[error("no recognized value matcher in {json}")]
    UnknownValueMatcher {
        /// The value-matcher object.
        json: JsonValue,
    },

    /// A value-matcher object had keys for more than one variant.
    #[error("value matcher mixes {} in {json}", keys.join(", "))]
    AmbiguousValueMatcher {
        /// The conflicting variant keys.
        keys: Vec<String>,
        /// The value-matcher object.
        json: JsonValue,
    },

    /// A key not allowed in this object shape.
    #[error("unexpected key \"{key}\" in {json}")]
    UnexpectedKey {
        /// The offending key.
        key: String,
        /// The enclosing object.
        json: JsonValue,
    },

    /// A recognized key whose value has the wrong type.
    #[error("\"{field}\" must be {expected} in {json}")]
    InvalidField {
        /// The offending key.
        field: &'static str,
        /// What the key requires (e.g., `"a boolean"`).
        expected: &'static str,
        /// The enclosing object.
        json: JsonValue,
    },

    /// A required key was missing.
    #[error("missing \"{field}\" in {json}")]
    MissingField {
        /// The missing key.
        field: &'static str,
        /// The enclosing object.
        json: JsonValue,
    },

    /// `and`, `or` or `not` with no children.
    #[error("\"{operator}\" needs at least one child in {json}")]
    EmptyCompound {
        /// `"and"`, `"or"` or `"not"`.
        operator: &'static str,
        /// The predicate object.
        json: JsonValue,
    },

    /// `not` with more than one child.
    #[error("\"not\" takes exactly one child, found {count} in {json}")]
    NotArity {
        /// Number of children given.
        count: usize,
        /// The predicate object.
        json: JsonValue,
    },

    /// Nesting exceeds [`ParseLimits::max_depth`], or a literal nests deeper
    /// than [`ParseLimits::max_literal_depth`].
    #[error("nesting depth is {depth}, but maximum allowed is {max}")]
    DepthExceeded {
        /// Depth reached.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
}

impl ParseError {
    /// A stable snake_case name for the variant, for logs and fixtures.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidJson { .. } => "invalid_json",
            Self::ExpectedObject { .. } => "expected_object",
            Self::UnknownValueMatcher { .. } => "unknown_value_matcher",
            Self::AmbiguousValueMatcher { .. } => "ambiguous_value_matcher",
            Self::UnexpectedKey { .. } => "unexpected_key",
            Self::InvalidField { .. } => "invalid_field",
            Self::MissingField { .. } => "missing_field",
            Self::EmptyCompound { .. } => "empty_compound",
            Self::NotArity { .. } => "not_arity",
            Self::DepthExceeded { .. } => "depth_exceeded",
        }
    }
}
