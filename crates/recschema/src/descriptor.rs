//! # Schema Documents and Property Descriptors
//!
//! Parses an already-loaded JSON value into the engine's immutable view of
//! a schema: the ordered list of declared properties and, per property,
//! the constraint set the validation engine evaluates.
//!
//! ## Accepted Shape
//!
//! ```json
//! {
//!   "type": "object",
//!   "properties": {
//!     "postalCode": { "type": "string", "pattern": "^\\d{5}$" }
//!   }
//! }
//! ```
//!
//! No other top-level keys are interpreted. Unknown descriptor attributes
//! are ignored, but a recognized attribute of the wrong shape rejects the
//! whole schema. In particular the draft-04 boolean form of
//! `exclusiveMinimum`/`exclusiveMaximum` is not accepted; these bounds
//! must be numbers. Every constraint is an optional field regardless of the
//! declared `type`; the engine only consults the ones relevant to that
//! type, so `pattern` on a `number` field is accepted and inert.

use std::collections::BTreeMap;

use recschema_core::JsonType;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Constraint set declared for one schema field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    /// Declared kind.
    #[serde(rename = "type")]
    pub kind: JsonType,

    /// Allowed literal values.
    #[serde(rename = "enum", default)]
    pub allowed: Option<Vec<Value>>,

    /// Single allowed literal. `"const": null` is a real constraint, so
    /// presence is tracked separately from the value.
    #[serde(rename = "const", default, deserialize_with = "present")]
    pub constant: Option<Value>,

    // numeric
    #[serde(default)]
    pub multiple_of: Option<f64>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub exclusive_minimum: Option<f64>,
    #[serde(default)]
    pub exclusive_maximum: Option<f64>,

    // string
    #[serde(default)]
    pub min_length: Option<u64>,
    #[serde(default)]
    pub max_length: Option<u64>,
    #[serde(default, deserialize_with = "compile_pattern")]
    pub pattern: Option<Regex>,

    // array
    #[serde(default)]
    pub min_items: Option<u64>,
    #[serde(default)]
    pub max_items: Option<u64>,
    #[serde(default)]
    pub unique_items: bool,

    // object
    #[serde(default)]
    pub min_properties: Option<u64>,
    #[serde(default)]
    pub max_properties: Option<u64>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub dependent_required: BTreeMap<String, Vec<String>>,
}

impl PropertyDescriptor {
    /// A descriptor declaring only a type.
    pub fn of_type(kind: JsonType) -> Self {
        Self {
            kind,
            allowed: None,
            constant: None,
            multiple_of: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            min_length: None,
            max_length: None,
            pattern: None,
            min_items: None,
            max_items: None,
            unique_items: false,
            min_properties: None,
            max_properties: None,
            required: Vec::new(),
            dependent_required: BTreeMap::new(),
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn compile_pattern<'de, D>(deserializer: D) -> Result<Option<Regex>, D::Error>
where
    D: Deserializer<'de>,
{
    let source = String::deserialize(deserializer)?;
    Regex::new(&source)
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("invalid pattern '{source}': {e}")))
}

/// A well-formed object schema: declared properties in document order.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    properties: Vec<(String, PropertyDescriptor)>,
}

impl SchemaDocument {
    /// Check the top-level shape and parse every property descriptor.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason if the document is not an object
    /// with `"type": "object"` and a `properties` mapping, or if any
    /// descriptor is malformed.
    pub fn parse(value: &Value) -> Result<Self, String> {
        let root = value
            .as_object()
            .ok_or_else(|| format!("document is {}, not an object", JsonType::of(value)))?;

        match root.get("type") {
            Some(Value::String(t)) if t == "object" => {}
            Some(other) => return Err(format!("top-level type must be \"object\", found {other}")),
            None => return Err("top-level type is missing".to_string()),
        }

        let properties = root
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| "`properties` mapping is missing".to_string())?;

        let properties = properties
            .iter()
            .map(|(name, raw)| {
                PropertyDescriptor::deserialize(raw)
                    .map(|descriptor| (name.clone(), descriptor))
                    .map_err(|e| format!("property '{name}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { properties })
    }

    /// Declared properties in document order.
    pub fn properties(&self) -> &[(String, PropertyDescriptor)] {
        &self.properties
    }

    /// Look up one property's descriptor.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, descriptor)| descriptor)
    }

    /// Declared field names in document order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preserves_declaration_order() {
        let doc = SchemaDocument::parse(&json!({
            "type": "object",
            "properties": {
                "zeta": {"type": "string"},
                "alpha": {"type": "number"},
                "mid": {"type": "boolean"}
            }
        }))
        .unwrap();
        assert_eq!(doc.field_names().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parses_constraints() {
        let doc = SchemaDocument::parse(&json!({
            "type": "object",
            "properties": {
                "age": {"type": "integer", "minimum": 0, "exclusiveMaximum": 150, "multipleOf": 1},
                "code": {"type": "string", "pattern": "^[A-Z]{3}$", "minLength": 3, "maxLength": 3},
                "tags": {"type": "array", "uniqueItems": true, "maxItems": 4},
                "meta": {"type": "object", "required": ["id"], "dependentRequired": {"a": ["b"]}},
                "nothing": {"type": "null", "const": null},
                "extra": {"type": "string", "format": "email", "x-custom": 1}
            }
        }))
        .unwrap();

        let age = doc.property("age").unwrap();
        assert_eq!(age.kind, JsonType::Integer);
        assert_eq!(age.minimum, Some(0.0));
        assert_eq!(age.exclusive_maximum, Some(150.0));

        let code = doc.property("code").unwrap();
        assert!(code.pattern.as_ref().unwrap().is_match("ABC"));
        assert_eq!(code.min_length, Some(3));

        assert!(doc.property("tags").unwrap().unique_items);
        let meta = doc.property("meta").unwrap();
        assert_eq!(meta.required, ["id"]);
        assert_eq!(meta.dependent_required["a"], ["b"]);

        assert_eq!(doc.property("nothing").unwrap().constant, Some(Value::Null));
        assert_eq!(doc.property("extra").unwrap().constant, None);
    }

    #[test]
    fn test_rejects_non_object_schema() {
        let err = SchemaDocument::parse(&json!({"type": "array", "properties": {}})).unwrap_err();
        assert!(err.contains("object"), "{err}");
        let err = SchemaDocument::parse(&json!(["type", "object"])).unwrap_err();
        assert!(err.contains("not an object"), "{err}");
    }

    #[test]
    fn test_rejects_missing_properties() {
        let err = SchemaDocument::parse(&json!({"type": "object"})).unwrap_err();
        assert!(err.contains("properties"), "{err}");
        let err = SchemaDocument::parse(&json!({"type": "object", "properties": []})).unwrap_err();
        assert!(err.contains("properties"), "{err}");
    }

    #[test]
    fn test_rejects_bad_descriptor() {
        let missing_type = json!({"type": "object", "properties": {"a": {"minimum": 1}}});
        assert!(SchemaDocument::parse(&missing_type).unwrap_err().contains("property 'a'"));

        let bad_pattern = json!({"type": "object", "properties": {"a": {"type": "string", "pattern": "("}}});
        assert!(SchemaDocument::parse(&bad_pattern).unwrap_err().contains("invalid pattern"));
    }

    #[test]
    fn test_boolean_exclusive_bound_rejected() {
        let draft4 = json!({
            "type": "object",
            "properties": {"n": {"type": "number", "minimum": 0, "exclusiveMinimum": true}}
        });
        assert!(SchemaDocument::parse(&draft4).unwrap_err().contains("property 'n'"));

        let unknown = json!({
            "type": "object",
            "properties": {"n": {"type": "number", "format": "int32", "x-note": true}}
        });
        assert!(SchemaDocument::parse(&unknown).is_ok());
    }
}
