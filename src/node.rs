//! Read-only view over a schema node.

use serde_json::{Map, Value};

/// Borrowed accessors for the JSON-Schema vocabulary this crate reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<'a>(pub &'a Value);

impl<'a> Node<'a> {
    pub fn value(&self) -> &'a Value {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.get(key).is_some()
    }

    /// Declared types; `type` may be a single name or a list.
    pub fn types(&self) -> Vec<&'a str> {
        match self.0.get("type") {
            Some(Value::String(name)) => vec![name.as_str()],
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.types().contains(&"null")
    }

    /// First declared type other than `null`.
    pub fn primary_type(&self) -> Option<&'a str> {
        self.types().into_iter().find(|name| *name != "null")
    }

    /// True when the only declared type is `array`.
    pub fn is_array_only(&self) -> bool {
        self.types() == ["array"]
    }

    pub fn str_field(&self, key: &str) -> Option<&'a str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&'a str> {
        self.str_field("description")
    }

    pub fn format(&self) -> Option<&'a str> {
        self.str_field("format")
    }

    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.0.get("properties").and_then(Value::as_object)
    }

    pub fn items(&self) -> Option<&'a Value> {
        self.0.get("items")
    }

    pub fn any_of(&self) -> Option<&'a [Value]> {
        self.0
            .get("anyOf")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    pub fn one_of(&self) -> Option<&'a [Value]> {
        self.0
            .get("oneOf")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    pub fn enum_values(&self) -> Option<&'a [Value]> {
        self.0
            .get("enum")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Names listed under `required`.
    pub fn required(&self) -> Vec<&'a str> {
        self.0
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_may_be_string_or_list() {
        let single = json!({ "type": "string" });
        assert_eq!(Node(&single).types(), vec!["string"]);
        assert!(!Node(&single).is_nullable());

        let list = json!({ "type": ["null", "integer"] });
        assert!(Node(&list).is_nullable());
        assert_eq!(Node(&list).primary_type(), Some("integer"));

        let untyped = json!({});
        assert!(Node(&untyped).types().is_empty());
        assert_eq!(Node(&untyped).primary_type(), None);
    }

    #[test]
    fn array_only_ignores_nullable_arrays() {
        let arr = json!({ "type": ["array"] });
        assert!(Node(&arr).is_array_only());
        let nullable = json!({ "type": ["array", "null"] });
        assert!(!Node(&nullable).is_array_only());
    }

    #[test]
    fn required_skips_non_strings() {
        let node = json!({ "required": ["a", 1, "b"] });
        assert_eq!(Node(&node).required(), vec!["a", "b"]);
    }
}
