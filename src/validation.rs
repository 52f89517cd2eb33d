//! Field-level validation results shared by request and response checks.

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// One problem found at a specific field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted path such as `data[0].price.total`
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every issue collected during a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{context}: {}", join_issues(.issues))]
pub struct ValidationError {
    /// What was being validated, e.g. "Invalid search parameters"
    pub context: String,
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl ValidationError {
    pub fn new(context: impl Into<String>, issues: Vec<FieldIssue>) -> Self {
        Self { context: context.into(), issues }
    }

    /// Returns true if any issue was reported for `path`.
    pub fn has_issue(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path == path)
    }
}

/// Walks a JSON document, recording shape mismatches instead of stopping at the first one.
pub(crate) struct Validator {
    issues: Vec<FieldIssue>,
}

impl Validator {
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn issue(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(FieldIssue::new(path, message));
    }

    /// Requires `value` to be an object.
    pub fn object<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
        match value.as_object() {
            Some(obj) => Some(obj),
            None => {
                self.issue(path, format!("expected object, got {}", kind(value)));
                None
            }
        }
    }

    /// Requires a field to be present and a string.
    pub fn string(&mut self, obj: &Map<String, Value>, key: &str, path: &str) {
        let path = join(path, key);
        match obj.get(key) {
            Some(Value::String(_)) => {}
            Some(other) => self.issue(path, format!("expected string, got {}", kind(other))),
            None => self.issue(path, "required"),
        }
    }

    /// Allows a field to be absent or null; otherwise it must be a string.
    pub fn optional_string(&mut self, obj: &Map<String, Value>, key: &str, path: &str) {
        match obj.get(key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => {
                self.issue(join(path, key), format!("expected string, got {}", kind(other)))
            }
        }
    }

    /// Requires a field to be a whole number that fits in a `u64`.
    pub fn unsigned(&mut self, obj: &Map<String, Value>, key: &str, path: &str) {
        let path = join(path, key);
        match obj.get(key) {
            Some(Value::Number(n)) if n.is_u64() => {}
            Some(Value::Number(_)) => self.issue(path, "expected non-negative integer"),
            Some(other) => self.issue(path, format!("expected number, got {}", kind(other))),
            None => self.issue(path, "required"),
        }
    }

    /// Allows a field to be absent or null; otherwise it must be a number.
    pub fn optional_number(&mut self, obj: &Map<String, Value>, key: &str, path: &str) {
        match obj.get(key) {
            None | Some(Value::Null) | Some(Value::Number(_)) => {}
            Some(other) => {
                self.issue(join(path, key), format!("expected number, got {}", kind(other)))
            }
        }
    }

    /// Requires a field to be an array and returns its items.
    pub fn array<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'a Vec<Value>> {
        let path = join(path, key);
        match obj.get(key) {
            Some(Value::Array(items)) => Some(items),
            Some(other) => {
                self.issue(path, format!("expected array, got {}", kind(other)));
                None
            }
            None => {
                self.issue(path, "required");
                None
            }
        }
    }

    /// Requires a nested object field.
    pub fn child<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'a Map<String, Value>> {
        let path = join(path, key);
        match obj.get(key) {
            Some(value) => self.object(value, &path),
            None => {
                self.issue(path, "required");
                None
            }
        }
    }

    /// Returns a nested object when present; reports a mismatch otherwise.
    pub fn optional_child<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'a Map<String, Value>> {
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => self.object(value, &join(path, key)),
        }
    }

    /// Requires an optional field, when present, to be an array of strings.
    pub fn optional_string_array(&mut self, obj: &Map<String, Value>, key: &str, path: &str) {
        let path = join(path, key);
        match obj.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        self.issue(
                            format!("{}[{}]", path, i),
                            format!("expected string, got {}", kind(item)),
                        );
                    }
                }
            }
            Some(other) => self.issue(path, format!("expected array, got {}", kind(other))),
        }
    }

    /// Requires an optional field, when present, to be an object of string values.
    pub fn optional_string_map(&mut self, obj: &Map<String, Value>, key: &str, path: &str) {
        let Some(map) = self.optional_child(obj, key, path) else {
            return;
        };
        let path = join(path, key);
        for (k, v) in map {
            if !v.is_string() {
                self.issue(join(&path, k), format!("expected string, got {}", kind(v)));
            }
        }
    }

    /// Requires a string field to be one of `allowed`.
    pub fn one_of(&mut self, obj: &Map<String, Value>, key: &str, path: &str, allowed: &[&str]) {
        match obj.get(key) {
            Some(Value::String(s)) if allowed.contains(&s.as_str()) => {}
            Some(Value::String(s)) => self.issue(
                join(path, key),
                format!("expected one of {}, got '{}'", allowed.join("|"), s),
            ),
            _ => self.string(obj, key, path),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Finishes the pass.
    pub fn finish(self, context: &str) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(context, self.issues))
        }
    }
}

/// Joins a parent path and a key.
pub(crate) fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collects_every_issue() {
        let doc = json!({ "name": 5, "tags": ["a", 1] });
        let obj = doc.as_object().unwrap();

        let mut v = Validator::new();
        v.string(obj, "name", "");
        v.string(obj, "missing", "");
        v.optional_string_array(obj, "tags", "");

        let err = v.finish("Bad document").unwrap_err();
        assert_eq!(err.issues.len(), 3);
        assert!(err.has_issue("name"));
        assert!(err.has_issue("missing"));
        assert!(err.has_issue("tags[1]"));
    }

    #[test]
    fn test_unsigned_rejects_fractions_and_negatives() {
        let doc = json!({ "ok": 1799, "frac": 1.5, "neg": -1, "text": "60" });
        let obj = doc.as_object().unwrap();

        let mut v = Validator::new();
        v.unsigned(obj, "ok", "");
        v.unsigned(obj, "frac", "");
        v.unsigned(obj, "neg", "");
        v.unsigned(obj, "text", "");

        let err = v.finish("Bad document").unwrap_err();
        assert_eq!(err.issues.len(), 3);
        assert!(!err.has_issue("ok"));
        assert!(err.has_issue("frac"));
        assert!(err.has_issue("neg"));
        assert!(err.has_issue("text"));
        assert!(err.to_string().contains("frac: expected non-negative integer"));
    }

    #[test]
    fn test_optional_fields_accept_absent_and_null() {
        let doc = json!({ "a": null });
        let obj = doc.as_object().unwrap();

        let mut v = Validator::new();
        v.optional_string(obj, "a", "");
        v.optional_number(obj, "b", "");
        v.optional_string_map(obj, "c", "");
        assert!(v.is_empty());
    }

    #[test]
    fn test_one_of() {
        let doc = json!({ "kind": "TRAIN" });
        let obj = doc.as_object().unwrap();

        let mut v = Validator::new();
        v.one_of(obj, "kind", "root", &["AIRPORT", "CITY"]);
        let err = v.finish("x").unwrap_err();
        assert_eq!(err.issues[0].path, "root.kind");
        assert!(err.issues[0].message.contains("AIRPORT|CITY"));
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new(
            "Invalid search parameters",
            vec![FieldIssue::new("origin", "must be 3 letters"), FieldIssue::new("", "oops")],
        );
        assert_eq!(err.to_string(), "Invalid search parameters: origin: must be 3 letters; oops");
    }
}
