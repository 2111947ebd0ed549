//! `JsonPredicate`: boolean trees over [`JsonMatcher`] leaves
//!
//! Predicates combine matchers with AND/OR/NOT. They are immutable once built:
//! either parsed from the JSON grammar (see [`grammar`](crate::grammar)) or
//! assembled with [`JsonPredicate::builder`], which enforces the same arity rules
//! the parser does.

use crate::{grammar, JsonMatcher, JsonValue, ParseError, ParseLimits, PredicateTrace};

/// A boolean combination of [`JsonMatcher`]s.
///
/// The variants are public, so a tree assembled from them directly can break
/// the grammar's rules: `And(vec![])` evaluates, but its serialized text does
/// not parse. Run [`validate`](Self::validate) on hand-built trees before
/// serializing them.
///
/// ```
/// use jmatch::{JsonPredicate, ParseLimits};
///
/// let empty = JsonPredicate::And(vec![]);
/// assert!(empty.validate(&ParseLimits::default()).is_err());
/// assert!(JsonPredicate::parse(&empty.to_string()).is_err());
/// ```
///
/// # Example
///
/// ```
/// use jmatch::{JsonPredicate, JsonValue};
///
/// let predicate = JsonPredicate::parse(
///     r#"{"and": [
///         {"key": "legs", "value": {"equals": 4}},
///         {"key": "weight", "value": {"at_least": 5, "at_most": 15}}
///     ]}"#,
/// )
/// .unwrap();
///
/// assert!(predicate.apply(&JsonValue::parse(r#"{"legs": 4, "weight": 9.8}"#).unwrap()));
/// assert!(!predicate.apply(&JsonValue::parse(r#"{"legs": 3, "weight": 9.8}"#).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JsonPredicate {
    /// A single matcher.
    Leaf(JsonMatcher),

    /// All children must match.
    And(Vec<JsonPredicate>),

    /// Any child must match.
    Or(Vec<JsonPredicate>),

    /// Inverts the child.
    Not(Box<JsonPredicate>),
}

/// The combinator a [`JsonPredicateBuilder`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateType {
    /// `{"and": [...]}`
    And,
    /// `{"or": [...]}`
    Or,
    /// `{"not": ...}`
    Not,
}

impl PredicateType {
    /// The grammar key for this combinator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

impl JsonPredicate {
    /// Parse JSON text using [`ParseLimits::default`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the text is not JSON or not a valid predicate.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_with_limits(text, &ParseLimits::default())
    }

    /// Parse JSON text with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the text is not JSON, not a valid predicate,
    /// or nested deeper than `limits.max_depth`.
    pub fn parse_with_limits(text: &str, limits: &ParseLimits) -> Result<Self, ParseError> {
        let json = JsonValue::parse(text)?;
        grammar::parse_predicate(&json, limits)
    }

    /// Parse an already-decoded JSON value using [`ParseLimits::default`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if `json` is not a valid predicate.
    pub fn from_json(json: &JsonValue) -> Result<Self, ParseError> {
        grammar::parse_predicate(json, &ParseLimits::default())
    }

    /// The grammar form of this predicate.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        grammar::predicate_to_json(self)
    }

    /// Create a builder for a compound predicate.
    #[must_use]
    pub fn builder(kind: PredicateType) -> JsonPredicateBuilder {
        JsonPredicateBuilder {
            kind,
            children: Vec::new(),
        }
    }

    /// Evaluate against `document`.
    #[must_use]
    pub fn apply(&self, document: &JsonValue) -> bool {
        self.apply_ignoring_case(document, false)
    }

    /// Evaluate against `document`, OR-ing `ignore_case` into every leaf's own flag.
    ///
    /// And/Or short-circuit left to right.
    #[must_use]
    pub fn apply_ignoring_case(&self, document: &JsonValue, ignore_case: bool) -> bool {
        match self {
            Self::Leaf(m) => m.apply_ignoring_case(document, ignore_case),
            Self::And(children) => children
                .iter()
                .all(|p| p.apply_ignoring_case(document, ignore_case)),
            Self::Or(children) => children
                .iter()
                .any(|p| p.apply_ignoring_case(document, ignore_case)),
            Self::Not(p) => !p.apply_ignoring_case(document, ignore_case),
        }
    }

    /// Evaluate with full trace for debugging.
    ///
    /// Unlike [`apply()`](Self::apply), this does NOT short-circuit And/Or; every
    /// child is evaluated. The `matched` result is still the same.
    #[must_use]
    pub fn apply_with_trace(&self, document: &JsonValue) -> PredicateTrace {
        match self {
            Self::Leaf(m) => PredicateTrace::Leaf {
                matched: m.apply(document),
                scope: m.scope().to_vec(),
                key: m.key().map(str::to_owned),
                value: m.extract(document).clone(),
                matcher: m.value_matcher().to_string(),
            },
            Self::And(children) => {
                let children: Vec<PredicateTrace> =
                    children.iter().map(|p| p.apply_with_trace(document)).collect();
                let matched = children.iter().all(PredicateTrace::matched);
                PredicateTrace::And { matched, children }
            }
            Self::Or(children) => {
                let children: Vec<PredicateTrace> =
                    children.iter().map(|p| p.apply_with_trace(document)).collect();
                let matched = children.iter().any(PredicateTrace::matched);
                PredicateTrace::Or { matched, children }
            }
            Self::Not(p) => {
                let inner = p.apply_with_trace(document);
                PredicateTrace::Not {
                    matched: !inner.matched(),
                    inner: Box::new(inner),
                }
            }
        }
    }

    /// Returns `true` if this is a `Leaf`.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns `true` if this is an `And`.
    #[must_use]
    pub fn is_and(&self) -> bool {
        matches!(self, Self::And(_))
    }

    /// Returns `true` if this is an `Or`.
    #[must_use]
    pub fn is_or(&self) -> bool {
        matches!(self, Self::Or(_))
    }

    /// Returns `true` if this is a `Not`.
    #[must_use]
    pub fn is_not(&self) -> bool {
        matches!(self, Self::Not(_))
    }

    /// The matcher, if this is a `Leaf`.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&JsonMatcher> {
        match self {
            Self::Leaf(m) => Some(m),
            _ => None,
        }
    }

    /// Calculate the depth of this predicate tree.
    ///
    /// Every combinator and every matcher counts as one level, as does each
    /// predicate nested inside `array_contains` / `array_length`.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(m) => m.depth(),
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Not(p) => 1 + p.depth(),
        }
    }

    /// Check the tree against `limits` and the non-empty combinator rule.
    ///
    /// Parsed predicates always pass, and a tree that passes serializes to text
    /// that parses back. This is for trees assembled by hand from the public
    /// variants.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyCompound`] for an empty `And`/`Or` (anywhere in
    /// the tree, including inside array matchers) and
    /// [`ParseError::DepthExceeded`] if the tree or one of its literals is too
    /// deep.
    pub fn validate(&self, limits: &ParseLimits) -> Result<(), ParseError> {
        let depth = self.depth();
        if depth > limits.max_depth {
            return Err(ParseError::DepthExceeded {
                depth,
                max: limits.max_depth,
            });
        }
        self.validate_nodes(limits)
    }

    fn validate_nodes(&self, limits: &ParseLimits) -> Result<(), ParseError> {
        match self {
            Self::Leaf(m) => match m.value_matcher() {
                crate::ValueMatcher::ArrayContains { predicate, .. }
                | crate::ValueMatcher::ArrayLength(predicate) => predicate.validate_nodes(limits),
                vm => match vm.literal().map(JsonValue::depth) {
                    Some(depth) if depth > limits.max_literal_depth => {
                        Err(ParseError::DepthExceeded {
                            depth,
                            max: limits.max_literal_depth,
                        })
                    }
                    _ => Ok(()),
                },
            },
            Self::And(children) | Self::Or(children) => {
                if children.is_empty() {
                    let operator = if self.is_and() { "and" } else { "or" };
                    return Err(ParseError::EmptyCompound {
                        operator,
                        json: self.to_json(),
                    });
                }
                children.iter().try_for_each(|child| child.validate_nodes(limits))
            }
            Self::Not(p) => p.validate_nodes(limits),
        }
    }
}

impl From<JsonMatcher> for JsonPredicate {
    fn from(matcher: JsonMatcher) -> Self {
        Self::Leaf(matcher)
    }
}

/// Builder for compound predicates.
///
/// # Example
///
/// ```
/// use jmatch::{JsonMatcher, JsonPredicate, PredicateType, ValueMatcher};
///
/// let legs = JsonMatcher::builder()
///     .key("legs")
///     .value_matcher(ValueMatcher::equals(4))
///     .build()
///     .unwrap();
///
/// let not_four_legs = JsonPredicate::builder(PredicateType::Not)
///     .add_matcher(legs)
///     .build()
///     .unwrap();
/// assert!(not_four_legs.is_not());
///
/// assert!(JsonPredicate::builder(PredicateType::And).build().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct JsonPredicateBuilder {
    kind: PredicateType,
    children: Vec<JsonPredicate>,
}

impl JsonPredicateBuilder {
    /// Add a matcher child.
    #[must_use]
    pub fn add_matcher(mut self, matcher: JsonMatcher) -> Self {
        self.children.push(JsonPredicate::Leaf(matcher));
        self
    }

    /// Add a nested predicate child.
    #[must_use]
    pub fn add_predicate(mut self, predicate: JsonPredicate) -> Self {
        self.children.push(predicate);
        self
    }

    /// Build the predicate.
    ///
    /// # Errors
    ///
    /// `And`/`Or` need at least one child ([`ParseError::EmptyCompound`]); `Not`
    /// needs exactly one ([`ParseError::EmptyCompound`] or [`ParseError::NotArity`]).
    pub fn build(self) -> Result<JsonPredicate, ParseError> {
        let operator = self.kind.as_str();
        let mut children = self.children;
        if children.is_empty() {
            return Err(ParseError::EmptyCompound {
                operator,
                json: std::iter::once((operator, JsonValue::Array(Vec::new()))).collect(),
            });
        }
        match self.kind {
            PredicateType::And => Ok(JsonPredicate::And(children)),
            PredicateType::Or => Ok(JsonPredicate::Or(children)),
            PredicateType::Not if children.len() == 1 => {
                Ok(JsonPredicate::Not(Box::new(children.remove(0))))
            }
            PredicateType::Not => Err(ParseError::NotArity {
                count: children.len(),
                json: std::iter::once((
                    operator,
                    JsonValue::Array(children.iter().map(JsonPredicate::to_json).collect()),
                ))
                .collect(),
            }),
        }
    }
}
