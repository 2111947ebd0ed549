//! jmatch-test: Test domain for conformance testing
//!
//! Provides a document builder for writing matcher tests and the YAML fixture
//! runner used by the conformance suite under `conformance/`.
//!
//! # Example
//!
//! ```
//! use jmatch_test::prelude::*;
//!
//! // Document is a JSON object built field by field
//! let device = Document::new()
//!     .with("locale", "en-US")
//!     .with("legs", 4);
//!
//! let predicate = JsonPredicate::parse(r#"{"key": "legs", "value": {"equals": 4}}"#).unwrap();
//! assert!(predicate.apply(&device.build()));
//! ```

use jmatch::{JsonMap, JsonValue};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Test document: a JSON object assembled with the builder pattern.
///
/// Used for conformance testing where we need predictable,
/// controllable input data.
#[derive(Debug, Clone, Default)]
pub struct Document {
    fields: JsonMap,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder pattern). A repeated key replaces the earlier value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Nest another document under `key`.
    #[must_use]
    pub fn with_object(self, key: impl Into<String>, inner: Document) -> Self {
        self.with(key, inner.build())
    }

    /// Get a field by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    /// Finish the document.
    #[must_use]
    pub fn build(self) -> JsonValue {
        JsonValue::Object(self.fields)
    }
}

impl From<Document> for JsonValue {
    fn from(document: Document) -> Self {
        document.build()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::Document;
    pub use jmatch::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmatch::prelude::*;

    #[test]
    fn document_builder() {
        let doc = Document::new().with("foo", "bar").with("legs", 4);

        assert_eq!(doc.get("foo"), Some(&JsonValue::from("bar")));
        assert_eq!(doc.get("legs"), Some(&JsonValue::from(4)));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn later_field_wins() {
        let doc = Document::new().with("k", 1).with("k", 2);
        assert_eq!(doc.get("k"), Some(&JsonValue::from(2)));
    }

    #[test]
    fn nested_documents() {
        let doc = Document::new()
            .with_object("android", Document::new().with_object("version", Document::new().with("sdk", 34)))
            .build();

        let p = JsonPredicate::parse(
            r#"{"scope": ["android", "version"], "key": "sdk", "value": {"at_least": 30}}"#,
        )
        .unwrap();
        assert!(p.apply(&doc));
    }

    #[test]
    fn full_predicate() {
        let cat = Document::new().with("legs", 4).with("weight", 9.8).build();

        let p = JsonPredicate::parse(
            r#"{"and": [
                {"key": "legs", "value": {"equals": 4}},
                {"key": "weight", "value": {"at_least": 5, "at_most": 15}}
            ]}"#,
        )
        .unwrap();

        assert!(p.apply(&cat));
        assert!(!p.apply(&Document::new().with("legs", 3).with("weight", 9.8).build()));
    }
}
