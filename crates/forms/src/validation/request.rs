//! Submitted form input.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Input of a form submission: decoded values and uploaded file names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormRequest {
    input: Map<String, Value>,
    files: HashSet<String>,
}

impl FormRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object. Non-object values yield an empty request.
    pub fn from_json(value: Value) -> Self {
        let input = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            input,
            files: HashSet::new(),
        }
    }

    /// Decode an `application/x-www-form-urlencoded` body.
    ///
    /// Keys ending in `[]` collect into arrays; repeated plain keys keep the
    /// last value.
    pub fn from_urlencoded(body: &str) -> Self {
        let mut input = Map::new();
        for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
            if let Some(name) = key.strip_suffix("[]") {
                let entry = input
                    .entry(name.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = entry {
                    items.push(Value::String(value.into_owned()));
                }
            } else {
                input.insert(key.into_owned(), Value::String(value.into_owned()));
            }
        }
        Self {
            input,
            files: HashSet::new(),
        }
    }

    /// Set an input value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input.insert(key.into(), value.into());
        self
    }

    /// Record an uploaded file under a field name.
    pub fn with_file(mut self, field: impl Into<String>) -> Self {
        self.files.insert(field.into());
        self
    }

    pub fn input(&self, key: &str) -> Option<&Value> {
        self.input.get(key)
    }

    pub fn all(&self) -> &Map<String, Value> {
        &self.input
    }

    pub fn has_file(&self, field: &str) -> bool {
        self.files.contains(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_urlencoded() {
        let request = FormRequest::from_urlencoded("name=Ana+Lopez&tags[]=php&tags[]=js");
        assert_eq!(request.input("name"), Some(&json!("Ana Lopez")));
        assert_eq!(request.input("tags"), Some(&json!(["php", "js"])));
    }

    #[test]
    fn test_from_json_non_object() {
        let request = FormRequest::from_json(json!([1, 2]));
        assert!(request.all().is_empty());
    }

    #[test]
    fn test_files() {
        let request = FormRequest::new().with_file("document");
        assert!(request.has_file("document"));
        assert!(!request.has_file("avatar"));
    }
}
