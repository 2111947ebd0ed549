//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the jmatch engine.
//!
//! A fixture holds one predicate in the JSON grammar (written as YAML) and
//! either a list of documents with the expected match result, or the error
//! kind that parsing the predicate must fail with.
//!
//! ```yaml
//! name: legs_and_weight
//! description: both conditions must hold
//! predicate:
//!   and:
//!     - { key: legs, value: { equals: 4 } }
//!     - { key: weight, value: { at_least: 5, at_most: 15 } }
//! cases:
//!   - name: cat
//!     document: { legs: 4, weight: 9.8 }
//!     expect: true
//! ```

use jmatch::{JsonPredicate, JsonValue, ParseError};
use serde::Deserialize;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The predicate, in the JSON grammar.
    pub predicate: JsonValue,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    /// When set, parsing must fail with this [`ParseError::kind`].
    #[serde(default)]
    pub error: Option<String>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub document: JsonValue,
    pub expect: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: bool,
    pub actual: bool,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Parse the fixture's predicate.
    pub fn parse(&self) -> Result<JsonPredicate, ParseError> {
        JsonPredicate::from_json(&self.predicate)
    }

    /// Run all test cases against an already parsed predicate
    pub fn run(&self, predicate: &JsonPredicate) -> Vec<CaseResult> {
        self.cases
            .iter()
            .map(|case| {
                let actual = predicate.apply(&case.document);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect,
                    expected: case.expect,
                    actual,
                }
            })
            .collect()
    }

    /// Run the fixture and panic on first failure.
    ///
    /// Besides the cases, every successfully parsed predicate must survive a
    /// serialize/parse round trip unchanged.
    pub fn run_and_assert(&self) {
        let parsed = self.parse();

        if let Some(kind) = &self.error {
            match parsed {
                Ok(p) => panic!(
                    "Fixture '{}' expected error '{}', but parsed {}",
                    self.name, kind, p
                ),
                Err(e) => assert_eq!(
                    e.kind(),
                    kind,
                    "Fixture '{}' failed with the wrong error: {}",
                    self.name,
                    e
                ),
            }
            return;
        }

        let predicate = parsed
            .unwrap_or_else(|e| panic!("Fixture '{}' failed to parse: {}", self.name, e));

        let reparsed = JsonPredicate::parse(&predicate.to_string());
        assert_eq!(
            reparsed.as_ref(),
            Ok(&predicate),
            "Fixture '{}' did not round-trip through {}",
            self.name,
            predicate
        );

        for result in self.run(&predicate) {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGS: &str = r#"
name: legs
description: exact integer match
predicate: { key: legs, value: { equals: 4 } }
cases:
  - name: four
    document: { legs: 4 }
    expect: true
  - name: three
    document: { legs: 3 }
    expect: false
  - name: empty
    expect: false
---
name: empty_and
predicate: { and: [] }
error: empty_compound
"#;

    #[test]
    fn loads_multi_document_yaml() {
        let fixtures = Fixture::from_yaml_multi(LEGS).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].cases.len(), 3);
        assert_eq!(fixtures[0].cases[2].document, JsonValue::Null);
        assert_eq!(fixtures[1].error.as_deref(), Some("empty_compound"));
    }

    #[test]
    fn runs_cases() {
        for fixture in Fixture::from_yaml_multi(LEGS).unwrap() {
            fixture.run_and_assert();
        }
    }

    #[test]
    fn reports_failures() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong
predicate: { key: legs, value: { equals: 4 } }
cases:
  - { name: lie, document: { legs: 4 }, expect: false }
"#,
        )
        .unwrap();
        let predicate = fixture.parse().unwrap();
        let results = fixture.run(&predicate);
        assert!(!results[0].passed);
        assert!(results[0].actual);
    }

    #[test]
    #[should_panic(expected = "expected error")]
    fn missing_error_panics() {
        Fixture::from_yaml(
            r#"
name: not_an_error
predicate: { key: legs, value: { equals: 4 } }
error: empty_compound
"#,
        )
        .unwrap()
        .run_and_assert();
    }
}
