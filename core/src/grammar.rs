//! JSON grammar codec for predicates and matchers.
//!
//! # Value matchers
//!
//! An object with exactly one variant key:
//!
//! | Key(s) | Variant | Extra keys |
//! |--------|---------|------------|
//! | `equals` | [`ValueMatcher::Exact`] | `ignore_case` |
//! | `at_least` and/or `at_most` (number or `null`) | [`ValueMatcher::NumberRange`] | |
//! | `is_present` (bool) | [`ValueMatcher::Presence`] | |
//! | `version_matches` or `version` (string) | [`ValueMatcher::Version`] | |
//! | `string_begins` / `string_ends` / `string_contains` | `String*` | `ignore_case` |
//! | `array_contains` (predicate) | [`ValueMatcher::ArrayContains`] | `index` (i32) |
//! | `array_length` (predicate) | [`ValueMatcher::ArrayLength`] | |
//!
//! # Matchers
//!
//! `{"scope": "a" | ["a", "b"], "key": "k", "value": {...}, "ignore_case": true}`;
//! only `value` is required. A value-level `ignore_case` is folded into the
//! matcher-level flag.
//!
//! # Predicates
//!
//! `{"and": [...]}`, `{"or": [...]}` or `{"not": {...}}`. Children are predicates or
//! matchers. An object without a combinator key is a matcher.
//!
//! # Serialization
//!
//! [`predicate_to_json`] is the inverse of [`parse_predicate`]. It writes the
//! canonical form: `version_matches`, `not` as an object, single-segment scopes as a
//! bare string, `ignore_case` at matcher level and only when set.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::json_value::NULL;
use crate::{
    FiniteF64, JsonMap, JsonMatcher, JsonPredicate, JsonValue, ParseError, ParseLimits,
    PredicateType, ValueMatcher, VersionMatcher,
};

const MATCHER_KEYS: [&str; 4] = ["scope", "key", "value", "ignore_case"];

const VALUE_MATCHER_KEYS: [&str; 11] = [
    "equals",
    "at_least",
    "at_most",
    "is_present",
    "version_matches",
    "version",
    "string_begins",
    "string_ends",
    "string_contains",
    "array_contains",
    "array_length",
];

/// Parse a predicate from its grammar form.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first violation found.
pub fn parse_predicate(json: &JsonValue, limits: &ParseLimits) -> Result<JsonPredicate, ParseError> {
    let result = Parser { limits }.predicate(json, 1);
    match &result {
        Ok(predicate) => trace!(depth = predicate.depth(), "parsed predicate"),
        Err(error) => debug!(%error, "rejected predicate"),
    }
    result
}

/// Parse a single matcher from its grammar form.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first violation found.
pub fn parse_matcher(json: &JsonValue, limits: &ParseLimits) -> Result<JsonMatcher, ParseError> {
    let result = Parser { limits }.matcher(json, 1);
    if let Err(error) = &result {
        debug!(%error, "rejected matcher");
    }
    result
}

/// Parse a value matcher from its grammar form.
///
/// A value-level `ignore_case` is validated but has nowhere to go on a bare
/// [`ValueMatcher`]; parse the enclosing matcher to keep it.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first violation found.
pub fn parse_value_matcher(
    json: &JsonValue,
    limits: &ParseLimits,
) -> Result<ValueMatcher, ParseError> {
    let result = Parser { limits }.value_matcher(json, 1).map(|(m, _)| m);
    if let Err(error) = &result {
        debug!(%error, "rejected value matcher");
    }
    result
}

/// Serialize a predicate to its canonical grammar form.
#[must_use]
pub fn predicate_to_json(predicate: &JsonPredicate) -> JsonValue {
    match predicate {
        JsonPredicate::Leaf(m) => matcher_to_json(m),
        JsonPredicate::And(children) => single_entry(
            "and",
            JsonValue::Array(children.iter().map(predicate_to_json).collect()),
        ),
        JsonPredicate::Or(children) => single_entry(
            "or",
            JsonValue::Array(children.iter().map(predicate_to_json).collect()),
        ),
        JsonPredicate::Not(child) => single_entry("not", predicate_to_json(child)),
    }
}

/// Serialize a matcher to its canonical grammar form.
#[must_use]
pub fn matcher_to_json(matcher: &JsonMatcher) -> JsonValue {
    let mut map = JsonMap::new();
    match matcher.scope() {
        [] => {}
        [only] => {
            map.insert("scope".into(), JsonValue::from(only.as_str()));
        }
        path => {
            map.insert(
                "scope".into(),
                JsonValue::Array(path.iter().map(|s| JsonValue::from(s.as_str())).collect()),
            );
        }
    }
    if let Some(key) = matcher.key() {
        map.insert("key".into(), JsonValue::from(key));
    }
    map.insert("value".into(), value_matcher_to_json(matcher.value_matcher()));
    if matcher.ignore_case() {
        map.insert("ignore_case".into(), JsonValue::Bool(true));
    }
    JsonValue::Object(map)
}

/// Serialize a value matcher to its canonical grammar form.
#[must_use]
pub fn value_matcher_to_json(matcher: &ValueMatcher) -> JsonValue {
    let mut map = JsonMap::new();
    match matcher {
        ValueMatcher::Exact(expected) => {
            map.insert("equals".into(), expected.clone());
        }
        ValueMatcher::NumberRange { min: None, max: None } => {
            map.insert("at_least".into(), JsonValue::Null);
        }
        ValueMatcher::NumberRange { min, max } => {
            if let Some(min) = min {
                map.insert("at_least".into(), JsonValue::Double(*min));
            }
            if let Some(max) = max {
                map.insert("at_most".into(), JsonValue::Double(*max));
            }
        }
        ValueMatcher::Presence(present) => {
            map.insert("is_present".into(), JsonValue::Bool(*present));
        }
        ValueMatcher::Version(version) => {
            map.insert("version_matches".into(), JsonValue::from(version.constraint()));
        }
        ValueMatcher::StringBegins(needle) => {
            map.insert("string_begins".into(), needle.clone());
        }
        ValueMatcher::StringEnds(needle) => {
            map.insert("string_ends".into(), needle.clone());
        }
        ValueMatcher::StringContains(needle) => {
            map.insert("string_contains".into(), needle.clone());
        }
        ValueMatcher::ArrayContains { predicate, index } => {
            map.insert("array_contains".into(), predicate_to_json(predicate));
            if let Some(index) = index {
                map.insert("index".into(), JsonValue::from(*index));
            }
        }
        ValueMatcher::ArrayLength(predicate) => {
            map.insert("array_length".into(), predicate_to_json(predicate));
        }
    }
    JsonValue::Object(map)
}

fn single_entry(key: &str, value: JsonValue) -> JsonValue {
    JsonValue::Object(std::iter::once((key.to_owned(), value)).collect())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Parser
// ═══════════════════════════════════════════════════════════════════════════════

struct Parser<'a> {
    limits: &'a ParseLimits,
}

impl Parser<'_> {
    fn check_depth(&self, level: usize) -> Result<(), ParseError> {
        if level > self.limits.max_depth {
            return Err(ParseError::DepthExceeded {
                depth: level,
                max: self.limits.max_depth,
            });
        }
        Ok(())
    }

    fn check_literal(&self, literal: &JsonValue) -> Result<(), ParseError> {
        let depth = literal.depth();
        if depth > self.limits.max_literal_depth {
            return Err(ParseError::DepthExceeded {
                depth,
                max: self.limits.max_literal_depth,
            });
        }
        Ok(())
    }

    fn predicate(&self, json: &JsonValue, level: usize) -> Result<JsonPredicate, ParseError> {
        self.check_depth(level)?;
        let map = expect_object(json)?;

        let mut combinators = map
            .iter()
            .filter_map(|(key, body)| combinator(key).map(|kind| (kind, body)));
        let Some((kind, body)) = combinators.next() else {
            return self.matcher(json, level).map(JsonPredicate::Leaf);
        };
        if let Some(key) = map.keys().find(|k| k.as_str() != kind.as_str()) {
            return Err(ParseError::UnexpectedKey {
                key: key.clone(),
                json: json.clone(),
            });
        }

        let operator = kind.as_str();
        match kind {
            PredicateType::And | PredicateType::Or => {
                let items = body.as_array().ok_or_else(|| ParseError::InvalidField {
                    field: operator,
                    expected: "an array",
                    json: json.clone(),
                })?;
                if items.is_empty() {
                    return Err(ParseError::EmptyCompound {
                        operator,
                        json: json.clone(),
                    });
                }
                let children = items
                    .iter()
                    .map(|child| self.predicate(child, level + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if kind == PredicateType::And {
                    JsonPredicate::And(children)
                } else {
                    JsonPredicate::Or(children)
                })
            }
            PredicateType::Not => {
                let child = match body {
                    JsonValue::Object(_) => body,
                    JsonValue::Array(items) => match items.as_slice() {
                        [] => {
                            return Err(ParseError::EmptyCompound {
                                operator,
                                json: json.clone(),
                            })
                        }
                        [only] => only,
                        _ => {
                            return Err(ParseError::NotArity {
                                count: items.len(),
                                json: json.clone(),
                            })
                        }
                    },
                    _ => {
                        return Err(ParseError::InvalidField {
                            field: operator,
                            expected: "an object or a one-element array",
                            json: json.clone(),
                        })
                    }
                };
                let inner = self.predicate(child, level + 1)?;
                Ok(JsonPredicate::Not(Box::new(inner)))
            }
        }
    }

    fn matcher(&self, json: &JsonValue, level: usize) -> Result<JsonMatcher, ParseError> {
        self.check_depth(level)?;
        let map = expect_object(json)?;
        reject_unknown(map, json, |key| MATCHER_KEYS.contains(&key))?;

        let scope: Vec<String> = match map.get("scope") {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::String(segment)) => vec![segment.clone()],
            Some(JsonValue::Array(segments)) => segments
                .iter()
                .map(|s| s.as_str().map(str::to_owned))
                .collect::<Option<_>>()
                .ok_or_else(|| invalid("scope", "a string or an array of strings", json))?,
            Some(_) => return Err(invalid("scope", "a string or an array of strings", json)),
        };
        let key = match map.get("key") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(key)) => Some(key.clone()),
            Some(_) => return Err(invalid("key", "a string", json)),
        };
        let ignore_case = optional_bool(map, "ignore_case", json)?.unwrap_or(false);
        let value = map.get("value").ok_or_else(|| ParseError::MissingField {
            field: "value",
            json: json.clone(),
        })?;
        let (value_matcher, value_ignore_case) = self.value_matcher(value, level)?;

        let mut builder = JsonMatcher::builder()
            .scope(scope)
            .value_matcher(value_matcher)
            .ignore_case(ignore_case || value_ignore_case);
        if let Some(key) = key {
            builder = builder.key(key);
        }
        builder.build()
    }

    /// Returns the matcher and its value-level `ignore_case` flag.
    fn value_matcher(
        &self,
        json: &JsonValue,
        level: usize,
    ) -> Result<(ValueMatcher, bool), ParseError> {
        let map = expect_object(json)?;
        let variant_keys: Vec<&str> = VALUE_MATCHER_KEYS
            .iter()
            .copied()
            .filter(|key| map.contains_key(*key))
            .collect();

        let is_range = |key: &&str| matches!(*key, "at_least" | "at_most");
        match variant_keys.as_slice() {
            [] => {
                return Err(ParseError::UnknownValueMatcher { json: json.clone() });
            }
            [_] => {}
            keys if keys.iter().all(is_range) => {}
            keys => {
                return Err(ParseError::AmbiguousValueMatcher {
                    keys: keys.iter().map(|k| (*k).to_owned()).collect(),
                    json: json.clone(),
                });
            }
        }
        let variant = variant_keys[0];

        reject_unknown(map, json, |key| {
            variant_keys.contains(&key)
                || (key == "index" && variant == "array_contains")
                || (key == "ignore_case"
                    && matches!(
                        variant,
                        "equals" | "string_begins" | "string_ends" | "string_contains"
                    ))
        })?;
        let ignore_case = optional_bool(map, "ignore_case", json)?.unwrap_or(false);
        let body = map.get(variant).unwrap_or(&NULL);

        let matcher = match variant {
            "equals" => ValueMatcher::Exact(body.clone()),
            "at_least" | "at_most" => ValueMatcher::NumberRange {
                min: optional_number(map, "at_least", json)?,
                max: optional_number(map, "at_most", json)?,
            },
            "is_present" => ValueMatcher::Presence(
                body.as_bool()
                    .ok_or_else(|| invalid("is_present", "a boolean", json))?,
            ),
            "version_matches" | "version" => ValueMatcher::Version(VersionMatcher::new(
                body.as_str()
                    .ok_or_else(|| invalid(variant, "a string", json))?,
            )),
            "string_begins" => ValueMatcher::StringBegins(body.clone()),
            "string_ends" => ValueMatcher::StringEnds(body.clone()),
            "string_contains" => ValueMatcher::StringContains(body.clone()),
            "array_contains" => {
                let index = match map.get("index") {
                    None | Some(JsonValue::Null) => None,
                    Some(index) => Some(
                        index
                            .as_i64()
                            .and_then(|i| i32::try_from(i).ok())
                            .ok_or_else(|| invalid("index", "a 32-bit integer", json))?,
                    ),
                };
                ValueMatcher::ArrayContains {
                    predicate: Box::new(self.predicate(body, level + 1)?),
                    index,
                }
            }
            _ => ValueMatcher::ArrayLength(Box::new(self.predicate(body, level + 1)?)),
        };
        if let Some(literal) = matcher.literal() {
            self.check_literal(literal)?;
        }
        Ok((matcher, ignore_case))
    }
}

fn combinator(key: &str) -> Option<PredicateType> {
    match key {
        "and" => Some(PredicateType::And),
        "or" => Some(PredicateType::Or),
        "not" => Some(PredicateType::Not),
        _ => None,
    }
}

fn expect_object(json: &JsonValue) -> Result<&JsonMap, ParseError> {
    json.as_object()
        .ok_or_else(|| ParseError::ExpectedObject { found: json.clone() })
}

fn reject_unknown(
    map: &JsonMap,
    json: &JsonValue,
    allowed: impl Fn(&str) -> bool,
) -> Result<(), ParseError> {
    match map.keys().find(|key| !allowed(key)) {
        Some(key) => Err(ParseError::UnexpectedKey {
            key: key.clone(),
            json: json.clone(),
        }),
        None => Ok(()),
    }
}

fn invalid(field: &'static str, expected: &'static str, json: &JsonValue) -> ParseError {
    ParseError::InvalidField {
        field,
        expected,
        json: json.clone(),
    }
}

fn optional_bool(
    map: &JsonMap,
    field: &'static str,
    json: &JsonValue,
) -> Result<Option<bool>, ParseError> {
    match map.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(invalid(field, "a boolean", json)),
    }
}

fn optional_number(
    map: &JsonMap,
    field: &'static str,
    json: &JsonValue,
) -> Result<Option<FiniteF64>, ParseError> {
    match map.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .and_then(FiniteF64::new)
            .map(Some)
            .ok_or_else(|| invalid(field, "a number or null", json)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Inherent codec methods, Display, FromStr, serde
// ═══════════════════════════════════════════════════════════════════════════════

impl JsonMatcher {
    /// Parse a matcher object using [`ParseLimits::default`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if `json` is not a valid matcher.
    pub fn from_json(json: &JsonValue) -> Result<Self, ParseError> {
        parse_matcher(json, &ParseLimits::default())
    }

    /// The grammar form of this matcher.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        matcher_to_json(self)
    }
}

impl ValueMatcher {
    /// Parse a value-matcher object using [`ParseLimits::default`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if `json` is not a valid value matcher.
    pub fn from_json(json: &JsonValue) -> Result<Self, ParseError> {
        parse_value_matcher(json, &ParseLimits::default())
    }

    /// The grammar form of this value matcher.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        value_matcher_to_json(self)
    }
}

impl FromStr for JsonPredicate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

macro_rules! grammar_impls {
    ($($ty:ty),+) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.to_json(), f)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.to_json().serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let json = JsonValue::deserialize(deserializer)?;
                Self::from_json(&json).map_err(de::Error::custom)
            }
        }
    )+};
}

grammar_impls!(JsonPredicate, JsonMatcher, ValueMatcher);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<JsonPredicate, ParseError> {
        JsonPredicate::from_json(&JsonValue::from(value))
    }

    fn doc(value: serde_json::Value) -> JsonValue {
        JsonValue::from(value)
    }

    fn limits(max_depth: usize) -> ParseLimits {
        ParseLimits {
            max_depth,
            ..ParseLimits::default()
        }
    }

    fn nested_array(depth: usize) -> JsonValue {
        (0..depth).fold(JsonValue::from(1), |inner, _| JsonValue::Array(vec![inner]))
    }

    fn round_trip(p: &JsonPredicate) {
        let text = p.to_string();
        let back = JsonPredicate::parse(&text).unwrap();
        assert_eq!(&back, p, "round trip through {text}");
    }

    #[test]
    fn end_to_end_legs_and_weight() {
        let p = parse(json!({"and": [
            {"key": "legs", "value": {"equals": 4}},
            {"key": "weight", "value": {"at_least": 5, "at_most": 15}}
        ]}))
        .unwrap();
        assert!(p.apply(&doc(json!({"legs": 4, "weight": 9.8}))));
        assert!(!p.apply(&doc(json!({"legs": 3, "weight": 9.8}))));
        round_trip(&p);
    }

    #[test]
    fn bare_matcher_is_leaf() {
        let p = parse(json!({"key": "name", "value": {"equals": "mittens"}})).unwrap();
        assert!(p.is_leaf());
        assert_eq!(p.as_leaf().and_then(JsonMatcher::key), Some("name"));
    }

    #[test]
    fn each_value_matcher_variant_parses() {
        let cases = [
            (json!({"equals": [1, "a"]}), ValueMatcher::equals(doc(json!([1, "a"])))),
            (json!({"at_least": 1}), ValueMatcher::number_range(Some(1.0), None)),
            (json!({"at_most": 2.5}), ValueMatcher::number_range(None, Some(2.5))),
            (json!({"at_least": null}), ValueMatcher::number_range(None, None)),
            (json!({"is_present": false}), ValueMatcher::is_absent()),
            (json!({"version_matches": "1.+"}), ValueMatcher::version("1.+")),
            (json!({"version": "1.+"}), ValueMatcher::version("1.+")),
            (json!({"string_begins": "a"}), ValueMatcher::string_begins("a")),
            (json!({"string_ends": 5}), ValueMatcher::string_ends(5)),
            (json!({"string_contains": "c"}), ValueMatcher::string_contains("c")),
        ];
        for (json, expected) in cases {
            let parsed = ValueMatcher::from_json(&doc(json.clone())).unwrap();
            assert_eq!(parsed, expected, "{json}");
        }
    }

    #[test]
    fn array_matchers_parse_nested_predicates() {
        let p = parse(json!({"key": "tags", "value": {
            "array_contains": {"value": {"equals": "bingo"}},
            "index": 2
        }}))
        .unwrap();
        assert!(p.apply(&doc(json!({"tags": ["that's", "a", "bingo"]}))));
        assert!(!p.apply(&doc(json!({"tags": ["bingo", "a", "that's"]}))));

        let p = parse(json!({"key": "tags", "value": {
            "array_length": {"value": {"equals": 3}}
        }}))
        .unwrap();
        assert!(p.apply(&doc(json!({"tags": ["toto", "titi", "tite"]}))));
        round_trip(&p);
    }

    #[test]
    fn scope_accepts_string_or_array() {
        let a = parse(json!({"scope": "properties", "key": "k", "value": {"equals": 1}})).unwrap();
        let b = parse(json!({"scope": ["properties"], "key": "k", "value": {"equals": 1}})).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.to_json(),
            doc(json!({"scope": "properties", "key": "k", "value": {"equals": 1}}))
        );

        let deep = parse(json!({"scope": ["android", "version"], "value": {"is_present": true}})).unwrap();
        assert_eq!(
            deep.to_json(),
            doc(json!({"scope": ["android", "version"], "value": {"is_present": true}}))
        );
    }

    #[test]
    fn value_level_ignore_case_moves_to_matcher() {
        let p = parse(json!({"key": "name", "value": {"equals": "MITTENS", "ignore_case": true}})).unwrap();
        assert!(p.as_leaf().is_some_and(JsonMatcher::ignore_case));
        assert!(p.apply(&doc(json!({"name": "mittens"}))));
        assert_eq!(
            p.to_json(),
            doc(json!({"key": "name", "value": {"equals": "MITTENS"}, "ignore_case": true}))
        );
        round_trip(&p);
    }

    #[test]
    fn not_accepts_object_or_single_element_array() {
        let object = parse(json!({"not": {"key": "a", "value": {"is_present": true}}})).unwrap();
        let array = parse(json!({"not": [{"key": "a", "value": {"is_present": true}}]})).unwrap();
        assert_eq!(object, array);
        assert!(object.to_json().opt("not").is_object());
    }

    #[test]
    fn canonical_output() {
        let p = parse(json!({"or": [
            {"key": "v", "value": {"version": "1.+"}},
            {"not": [{"key": "n", "value": {"at_least": null}}]}
        ]}))
        .unwrap();
        assert_eq!(
            p.to_string(),
            r#"{"or":[{"key":"v","value":{"version_matches":"1.+"}},{"not":{"key":"n","value":{"at_least":null}}}]}"#
        );
    }

    #[test]
    fn rejects_empty_object_and_non_objects() {
        assert!(matches!(parse(json!({})), Err(ParseError::MissingField { field: "value", .. })));
        assert!(matches!(parse(json!("not valid")), Err(ParseError::ExpectedObject { .. })));
        assert!(matches!(
            JsonPredicate::parse("not valid"),
            Err(ParseError::InvalidJson { .. })
        ));
        assert!(matches!(
            parse(json!({"and": ["x"]})),
            Err(ParseError::ExpectedObject { .. })
        ));
    }

    #[test]
    fn rejects_bad_compounds() {
        assert!(matches!(parse(json!({"and": []})), Err(ParseError::EmptyCompound { operator: "and", .. })));
        assert!(matches!(parse(json!({"or": []})), Err(ParseError::EmptyCompound { operator: "or", .. })));
        assert!(matches!(parse(json!({"not": []})), Err(ParseError::EmptyCompound { operator: "not", .. })));
        let two = json!({"not": [
            {"value": {"is_present": true}},
            {"value": {"is_present": false}}
        ]});
        assert!(matches!(parse(two), Err(ParseError::NotArity { count: 2, .. })));
        assert!(matches!(
            parse(json!({"and": {"value": {"is_present": true}}})),
            Err(ParseError::InvalidField { field: "and", .. })
        ));
    }

    #[test]
    fn rejects_mixed_shapes() {
        let mixed = json!({"and": [{"value": {"is_present": true}}], "key": "a"});
        assert!(matches!(parse(mixed), Err(ParseError::UnexpectedKey { ref key, .. }) if key == "key"));

        let two_ops = json!({"and": [{"value": {"is_present": true}}], "or": [{"value": {"is_present": true}}]});
        assert!(matches!(parse(two_ops), Err(ParseError::UnexpectedKey { ref key, .. }) if key == "or"));

        let stray = json!({"key": "a", "value": {"is_present": true}, "extra": 1});
        assert!(matches!(parse(stray), Err(ParseError::UnexpectedKey { ref key, .. }) if key == "extra"));
    }

    #[test]
    fn rejects_bad_value_matchers() {
        let vm = |v: serde_json::Value| ValueMatcher::from_json(&doc(v));

        assert!(matches!(vm(json!({"bogus": 1})), Err(ParseError::UnknownValueMatcher { .. })));
        assert!(matches!(vm(json!({})), Err(ParseError::UnknownValueMatcher { .. })));
        assert!(matches!(
            vm(json!({"equals": 1, "at_least": 0})),
            Err(ParseError::AmbiguousValueMatcher { ref keys, .. }) if keys.len() == 2
        ));
        assert!(matches!(
            vm(json!({"version": "1", "version_matches": "1"})),
            Err(ParseError::AmbiguousValueMatcher { .. })
        ));
        assert!(matches!(
            vm(json!({"at_least": 1, "ignore_case": true})),
            Err(ParseError::UnexpectedKey { ref key, .. }) if key == "ignore_case"
        ));
        assert!(matches!(
            vm(json!({"equals": 1, "index": 0})),
            Err(ParseError::UnexpectedKey { ref key, .. }) if key == "index"
        ));
        assert!(matches!(
            vm(json!({"equals": "a", "ignore_case": "yes"})),
            Err(ParseError::InvalidField { field: "ignore_case", .. })
        ));
        assert!(matches!(vm(json!({"at_least": "5"})), Err(ParseError::InvalidField { field: "at_least", .. })));
        assert!(matches!(vm(json!({"is_present": 1})), Err(ParseError::InvalidField { field: "is_present", .. })));
        assert!(matches!(vm(json!({"version": 1})), Err(ParseError::InvalidField { field: "version", .. })));
        assert!(matches!(
            vm(json!({"array_contains": {"value": {"equals": 1}}, "index": 4_294_967_296_i64})),
            Err(ParseError::InvalidField { field: "index", .. })
        ));
        assert!(matches!(vm(json!("equals")), Err(ParseError::ExpectedObject { .. })));
    }

    #[test]
    fn malformed_version_is_not_a_grammar_error() {
        let m = ValueMatcher::from_json(&doc(json!({"version_matches": "1.a"}))).unwrap();
        assert!(!m.apply(&doc(json!("1.0"))));
    }

    #[test]
    fn depth_limit_enforced() {
        let mut json = json!({"value": {"is_present": true}});
        for _ in 0..3 {
            json = json!({"not": json});
        }
        let text = json.to_string();
        assert!(JsonPredicate::parse_with_limits(&text, &limits(4)).is_ok());
        assert!(matches!(
            JsonPredicate::parse_with_limits(&text, &limits(3)),
            Err(ParseError::DepthExceeded { depth: 4, max: 3 })
        ));
    }

    #[test]
    fn depth_counts_array_predicates() {
        let text = json!({"value": {"array_contains": {"value": {"equals": 1}}}}).to_string();
        assert!(JsonPredicate::parse_with_limits(&text, &limits(2)).is_ok());
        assert!(JsonPredicate::parse_with_limits(&text, &limits(1)).is_err());
    }

    #[test]
    fn literal_depth_enforced() {
        let max = crate::MAX_LITERAL_DEPTH;
        for variant in ["equals", "string_contains"] {
            let json = single_entry("value", single_entry(variant, nested_array(max + 1)));
            assert_eq!(
                JsonPredicate::from_json(&json),
                Err(ParseError::DepthExceeded { depth: max + 1, max })
            );
            let json = single_entry("value", single_entry(variant, nested_array(max)));
            assert!(JsonPredicate::from_json(&json).is_ok());
        }

        let shallow = ParseLimits {
            max_literal_depth: 1,
            ..ParseLimits::default()
        };
        let text = json!({"value": {"equals": [[1]]}}).to_string();
        assert!(JsonPredicate::parse_with_limits(&text, &shallow).is_err());
        assert!(JsonPredicate::parse_with_limits(r#"{"value":{"equals":[1]}}"#, &shallow).is_ok());
    }

    #[test]
    fn deepest_valid_predicate_round_trips() {
        let literal = nested_array(crate::MAX_LITERAL_DEPTH);
        let mut p = JsonPredicate::from(JsonMatcher::new(ValueMatcher::Exact(literal)));
        while p.depth() < crate::MAX_DEPTH {
            p = JsonPredicate::And(vec![p]);
        }
        assert!(p.validate(&ParseLimits::default()).is_ok());
        round_trip(&p);
    }

    #[test]
    fn serde_integration() {
        let p: JsonPredicate =
            serde_json::from_str(r#"{"key":"legs","value":{"equals":4}}"#).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"key":"legs","value":{"equals":4}}"#);

        let err = serde_json::from_str::<JsonPredicate>(r#"{"and":[]}"#).unwrap_err();
        assert!(err.to_string().contains("and"));

        let m: ValueMatcher = serde_json::from_str(r#"{"string_begins":"mit"}"#).unwrap();
        assert_eq!(m, ValueMatcher::string_begins("mit"));
    }

    #[test]
    fn range_serializes_as_doubles() {
        let m = ValueMatcher::number_range(Some(5.0), Some(15.0));
        assert_eq!(m.to_string(), r#"{"at_least":5.0,"at_most":15.0}"#);
        assert_eq!(ValueMatcher::from_json(&m.to_json()).unwrap(), m);
    }

    #[test]
    fn null_optional_fields_are_absent() {
        let p = parse(json!({"scope": null, "key": null, "value": {"equals": 1}, "ignore_case": null})).unwrap();
        assert_eq!(p, JsonPredicate::Leaf(JsonMatcher::new(ValueMatcher::equals(1))));
    }
}
