//! `JsonMatcher`: a field path composed with a [`ValueMatcher`]

use crate::json_value::NULL;
use crate::{JsonMap, JsonValue, ParseError, ValueMatcher};

/// Locates a value inside a document and tests it.
///
/// The document is descended through each `scope` key in order, then `key` (if
/// any) is looked up, and the value matcher is applied to the result. Any
/// missing field or non-object along the way yields `null`, so the matcher can
/// still test for absence.
///
/// # Example
///
/// ```
/// use jmatch::{JsonMatcher, JsonValue, ValueMatcher};
///
/// let matcher = JsonMatcher::builder()
///     .scope(["properties"])
///     .key("key")
///     .value_matcher(ValueMatcher::equals("value"))
///     .build()
///     .unwrap();
///
/// let doc = JsonValue::parse(r#"{"properties": {"key": "value"}}"#).unwrap();
/// assert!(matcher.apply(&doc));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonMatcher {
    scope: Vec<String>,
    key: Option<String>,
    value_matcher: ValueMatcher,
    ignore_case: bool,
}

impl JsonMatcher {
    /// A matcher that tests the whole document.
    #[must_use]
    pub fn new(value_matcher: ValueMatcher) -> Self {
        Self {
            scope: Vec::new(),
            key: None,
            value_matcher,
            ignore_case: false,
        }
    }

    /// Create a builder for `JsonMatcher`.
    #[must_use]
    pub fn builder() -> JsonMatcherBuilder {
        JsonMatcherBuilder::default()
    }

    /// Keys descended before the `key` lookup.
    #[must_use]
    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    /// The terminal field name, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The test applied to the located value.
    #[must_use]
    pub fn value_matcher(&self) -> &ValueMatcher {
        &self.value_matcher
    }

    /// Whether string comparisons ignore case.
    #[must_use]
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Apply to `document`.
    #[must_use]
    pub fn apply(&self, document: &JsonValue) -> bool {
        self.apply_ignoring_case(document, false)
    }

    /// Apply to `document`, additionally ignoring case when `ignore_case` is set.
    #[must_use]
    pub fn apply_ignoring_case(&self, document: &JsonValue, ignore_case: bool) -> bool {
        self.value_matcher
            .apply_with(self.extract(document), self.ignore_case || ignore_case)
    }

    /// The value the value matcher sees: `document` after scope descent and key lookup.
    #[must_use]
    pub fn extract<'a>(&self, document: &'a JsonValue) -> &'a JsonValue {
        let mut current = document;
        for segment in &self.scope {
            match current.get(segment) {
                Some(next) => current = next,
                None => return &NULL,
            }
        }
        match &self.key {
            Some(key) => current.opt(key),
            None => current,
        }
    }

    /// Nesting depth: this matcher plus any predicate inside its value matcher.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.value_matcher.depth()
    }
}

impl From<ValueMatcher> for JsonMatcher {
    fn from(value_matcher: ValueMatcher) -> Self {
        Self::new(value_matcher)
    }
}

/// Builder for `JsonMatcher`.
#[derive(Debug, Default)]
pub struct JsonMatcherBuilder {
    scope: Vec<String>,
    key: Option<String>,
    value_matcher: Option<ValueMatcher>,
    ignore_case: bool,
}

impl JsonMatcherBuilder {
    /// Set the scope path, replacing any previous one.
    #[must_use]
    pub fn scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    /// Set the terminal key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the value matcher.
    #[must_use]
    pub fn value_matcher(mut self, value_matcher: ValueMatcher) -> Self {
        self.value_matcher = Some(value_matcher);
        self
    }

    /// Compare strings without regard to case.
    #[must_use]
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Build the `JsonMatcher`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingField`] if no value matcher was set.
    pub fn build(self) -> Result<JsonMatcher, ParseError> {
        let Some(value_matcher) = self.value_matcher else {
            let mut partial = JsonMap::new();
            if !self.scope.is_empty() {
                partial.insert("scope".into(), JsonValue::from(self.scope));
            }
            if let Some(key) = self.key {
                partial.insert("key".into(), JsonValue::from(key));
            }
            return Err(ParseError::MissingField {
                field: "value",
                json: JsonValue::Object(partial),
            });
        };
        Ok(JsonMatcher {
            scope: self.scope,
            key: self.key,
            value_matcher,
            ignore_case: self.ignore_case,
        })
    }
}
