//! crates/slate_core/src/filter.rs
//!
//! Flat equality filters over top-level document fields.

use serde_json::{Map, Value};

use crate::ports::{PortError, PortResult, RawDocument};

/// A conjunction of `field == value` conditions. Values are always scalars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Map<String, Value>,
}

impl Filter {
    /// The filter that matches every document.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut conditions = Map::new();
        conditions.insert(field.into(), value.into());
        Self { conditions }
    }

    /// Parses a caller-supplied filter. `null` is treated as the empty filter.
    pub fn parse(value: Value) -> PortResult<Self> {
        let conditions = match value {
            Value::Null => return Ok(Self::empty()),
            Value::Object(conditions) => conditions,
            other => {
                return Err(PortError::MalformedFilter(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        for (field, value) in &conditions {
            if field.is_empty() {
                return Err(PortError::MalformedFilter(
                    "field names must not be empty".to_string(),
                ));
            }
            if field.starts_with('$') {
                return Err(PortError::MalformedFilter(format!(
                    "operator '{}' is not supported",
                    field
                )));
            }
            if value.is_array() || value.is_object() {
                return Err(PortError::MalformedFilter(format!(
                    "value for '{}' must be a scalar, got {}",
                    field,
                    json_kind(value)
                )));
            }
        }

        Ok(Self { conditions })
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.conditions.get(field)
    }

    /// Whether every condition holds for `document`. A missing field only matches `null`.
    pub fn matches(&self, document: &RawDocument) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            match document.get(field) {
                Some(actual) => actual == expected,
                None => expected.is_null(),
            }
        })
    }

    /// The filter as a JSON object, for drivers that push it down.
    pub fn to_json(&self) -> Value {
        Value::Object(self.conditions.clone())
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> RawDocument {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::empty().matches(&doc(json!({"title": "x"}))));
        assert!(Filter::parse(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn eq_filter_matches_only_equal_values() {
        let filter = Filter::eq("course_id", "abc");
        assert!(filter.matches(&doc(json!({"course_id": "abc", "order": 1}))));
        assert!(!filter.matches(&doc(json!({"course_id": "xyz"}))));
        assert!(!filter.matches(&doc(json!({"order": 1}))));
    }

    #[test]
    fn parse_accepts_flat_scalar_objects() {
        let filter = Filter::parse(json!({"course_id": "abc", "pdf_attached": true})).unwrap();
        assert_eq!(filter.get("course_id"), Some(&json!("abc")));
        assert_eq!(filter.to_json(), json!({"course_id": "abc", "pdf_attached": true}));
    }

    #[test]
    fn parse_rejects_unsupported_shapes() {
        for bad in [
            json!(["course_id"]),
            json!("course_id=abc"),
            json!({"$or": [{"a": 1}]}),
            json!({"order": {"$gt": 1}}),
            json!({"tags": ["a"]}),
            json!({"": 1}),
        ] {
            assert!(
                matches!(Filter::parse(bad.clone()), Err(PortError::MalformedFilter(_))),
                "accepted {}",
                bad
            );
        }
    }
}
