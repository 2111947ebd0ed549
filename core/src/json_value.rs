//! `JsonValue`: the immutable JSON document model
//!
//! Every document a predicate is evaluated against, and every literal a matcher
//! carries, is a [`JsonValue`]. The model is deliberately small: seven variants,
//! coercion-free accessors that fall back to explicit defaults, and a compact
//! canonical serialization.
//!
//! # Numbers
//!
//! Integers and doubles are distinct variants (so `is_integer` / `is_double` stay
//! precise) but compare numerically: `Int(1) == Double(1.0)`. Non-finite doubles
//! cannot be represented; converting one yields [`JsonValue::Null`].

use crate::{FiniteF64, ParseError};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A JSON object: unique string keys, order irrelevant to equality.
///
/// Backed by a `BTreeMap`, so serialization is deterministic (sorted keys).
pub type JsonMap = BTreeMap<String, JsonValue>;

pub(crate) static NULL: JsonValue = JsonValue::Null;
static EMPTY_MAP: JsonMap = BTreeMap::new();

/// Any JSON-legal value.
///
/// # Example
///
/// ```
/// use jmatch::JsonValue;
///
/// let doc = JsonValue::parse(r#"{"legs": 4, "weight": 9.8}"#).unwrap();
/// assert_eq!(doc.opt("legs").get_int(0), 4);
/// assert!(doc.opt("weight").is_double());
/// assert!(doc.opt("tail").is_null());
/// assert_eq!(doc.to_string(), r#"{"legs":4,"weight":9.8}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub enum JsonValue {
    /// JSON `null`. Also what every accessor yields for a missing field.
    #[default]
    Null,
    /// JSON `true` / `false`.
    Bool(bool),
    /// An integral number.
    Int(i64),
    /// A non-integral (or explicitly floating) number. Always finite.
    Double(FiniteF64),
    /// A string.
    String(String),
    /// An ordered sequence.
    Array(Vec<JsonValue>),
    /// A key/value object.
    Object(JsonMap),
}

impl JsonValue {
    /// The JSON null value.
    pub const NULL: JsonValue = JsonValue::Null;

    /// Parse JSON text.
    ///
    /// Empty (or whitespace-only) text yields [`JsonValue::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidJson`] if the text is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        if text.trim().is_empty() {
            return Ok(Self::Null);
        }
        serde_json::from_str(text).map_err(|e| ParseError::InvalidJson {
            message: e.to_string(),
        })
    }

    /// Convert any serializable value into a `JsonValue`.
    ///
    /// Values that cannot be represented (non-string map keys, failing `Serialize`
    /// impls) become [`JsonValue::Null`] rather than an error. Non-finite floats
    /// become `Null` as well.
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use jmatch::JsonValue;
    ///
    /// let tags = vec!["a", "b"];
    /// assert_eq!(JsonValue::wrap(&tags).opt_list().len(), 2);
    ///
    /// let attrs: HashMap<&str, f64> = [("nan", f64::NAN)].into_iter().collect();
    /// assert!(JsonValue::wrap(&attrs).opt("nan").is_null());
    /// ```
    pub fn wrap<T: Serialize + ?Sized>(value: &T) -> Self {
        serde_json::to_value(value).map_or(Self::Null, Self::from)
    }

    // ── Type checks ─────────────────────────────────────────────────────────

    /// Returns `true` for `null`.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for booleans.
    #[inline]
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Returns `true` for strings.
    #[inline]
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Returns `true` only for the `Int` variant.
    #[inline]
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Returns `true` only for the `Double` variant, even when the value is integral.
    #[inline]
    #[must_use]
    pub fn is_double(&self) -> bool {
        matches!(self, Self::Double(_))
    }

    /// Returns `true` for either numeric variant.
    #[inline]
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Double(_))
    }

    /// Returns `true` for arrays.
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns `true` for objects.
    #[inline]
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// A short name for the variant, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    // ── Optional accessors ──────────────────────────────────────────────────

    /// The string value, if this is a string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean value, if this is a boolean.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer value, if this is the `Int` variant.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The numeric value as `f64`, for either numeric variant.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // JSON numbers are doubles on the wire anyway
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Double(d) => Some(d.get()),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is an object.
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&JsonMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a field of an object. Non-objects have no fields.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Look up a field of an object, yielding [`JsonValue::NULL`] when absent.
    #[must_use]
    pub fn opt(&self, key: &str) -> &JsonValue {
        self.get(key).unwrap_or(&NULL)
    }

    // ── Defaulting accessors ────────────────────────────────────────────────

    /// The string value, or `default`.
    #[must_use]
    pub fn get_string<'a>(&'a self, default: &'a str) -> &'a str {
        self.as_str().unwrap_or(default)
    }

    /// The string value, or `""`.
    #[must_use]
    pub fn opt_string(&self) -> &str {
        self.get_string("")
    }

    /// The value as `i32`.
    ///
    /// Doubles are truncated; integers outside the `i32` range and non-numbers
    /// yield `default`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_int(&self, default: i32) -> i32 {
        match self {
            Self::Int(i) => i32::try_from(*i).unwrap_or(default),
            Self::Double(d) => d.get() as i32,
            _ => default,
        }
    }

    /// The value as `i64`. Doubles are truncated; non-numbers yield `default`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_long(&self, default: i64) -> i64 {
        match self {
            Self::Int(i) => *i,
            Self::Double(d) => d.get() as i64,
            _ => default,
        }
    }

    /// The value as `f64`, or `default` for non-numbers.
    #[must_use]
    pub fn get_double(&self, default: f64) -> f64 {
        self.as_f64().unwrap_or(default)
    }

    /// The boolean value, or `default`.
    #[must_use]
    pub fn get_bool(&self, default: bool) -> bool {
        self.as_bool().unwrap_or(default)
    }

    /// The elements, or an empty slice.
    #[must_use]
    pub fn opt_list(&self) -> &[JsonValue] {
        self.as_array().unwrap_or(&[])
    }

    /// The entries, or an empty map.
    #[must_use]
    pub fn opt_map(&self) -> &JsonMap {
        self.as_object().unwrap_or(&EMPTY_MAP)
    }

    /// Container nesting depth: 0 for scalars, 1 for a flat array or object.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Array(items) => 1 + items.iter().map(Self::depth).max().unwrap_or(0),
            Self::Object(map) => 1 + map.values().map(Self::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Render scalars as text: strings as-is, numbers and booleans as their JSON
    /// form (`5.0` renders as `"5"`). Null, arrays and objects yield `None`.
    #[must_use]
    pub fn coerce_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Double(d) => Some(d.get().to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::Array(_) | Self::Object(_) => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Equality & hashing
// ═══════════════════════════════════════════════════════════════════════════════

/// The exact `i64` an integral double stands for, if any.
#[allow(clippy::cast_possible_truncation)]
fn exact_int(d: FiniteF64) -> Option<i64> {
    // 2^63; i64::MIN is exactly representable, i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let d = d.get();
    (d.fract() == 0.0 && (-LIMIT..LIMIT).contains(&d)).then(|| d as i64)
}

impl PartialEq for JsonValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Int(i), Self::Double(d)) | (Self::Double(d), Self::Int(i)) => {
                exact_int(*d) == Some(*i)
            }
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for JsonValue {}

impl Hash for JsonValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Integral doubles hash through their i64 so Int(1) and Double(1.0) collide.
        match self {
            Self::Null => 0u8.hash(state),
            Self::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Self::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Self::Double(d) => match exact_int(*d) {
                Some(i) => {
                    2u8.hash(state);
                    i.hash(state);
                }
                None => {
                    6u8.hash(state);
                    d.hash(state);
                }
            },
            Self::String(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Self::Array(items) => {
                4u8.hash(state);
                items.hash(state);
            }
            Self::Object(map) => {
                5u8.hash(state);
                map.hash(state);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Text form
// ═══════════════════════════════════════════════════════════════════════════════

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for JsonValue {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Serde
// ═══════════════════════════════════════════════════════════════════════════════

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Double(d) => serializer.serialize_f64(d.get()),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => items.serialize(serializer),
            Self::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(JsonValueVisitor)
    }
}

struct JsonValueVisitor;

impl<'de> Visitor<'de> for JsonValueVisitor {
    type Value = JsonValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<JsonValue, E> {
        Ok(JsonValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JsonValue, E> {
        Ok(JsonValue::Int(v))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JsonValue, E> {
        Ok(i64::try_from(v).map_or_else(|_| JsonValue::from(v as f64), JsonValue::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JsonValue, E> {
        Ok(JsonValue::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<JsonValue, D::Error> {
        JsonValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JsonValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<JsonValue, A::Error> {
        let mut map = JsonMap::new();
        // Duplicate keys: last write wins.
        while let Some((key, value)) = access.next_entry::<String, JsonValue>()? {
            map.insert(key, value);
        }
        Ok(JsonValue::Object(map))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

impl From<bool> for JsonValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for JsonValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for JsonValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<usize> for JsonValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or_else(|_| Self::from(n as f64), Self::Int)
    }
}

impl From<f64> for JsonValue {
    /// Non-finite input becomes [`JsonValue::Null`].
    fn from(d: f64) -> Self {
        FiniteF64::new(d).map_or(Self::Null, Self::Double)
    }
}

impl From<FiniteF64> for JsonValue {
    fn from(d: FiniteF64) -> Self {
        Self::Double(d)
    }
}

impl From<&str> for JsonValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for JsonValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<JsonMap> for JsonValue {
    fn from(map: JsonMap) -> Self {
        Self::Object(map)
    }
}

impl<T: Into<JsonValue>> From<Vec<T>> for JsonValue {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<JsonValue>> From<Option<T>> for JsonValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for JsonValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::from),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&JsonValue> for serde_json::Value {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Int(i) => Self::from(*i),
            JsonValue::Double(d) => Self::from(d.get()),
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            JsonValue::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}
