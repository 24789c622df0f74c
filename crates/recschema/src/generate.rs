//! # Generation Engine
//!
//! Builds a record from the registered generators, one declared property
//! at a time in document order. Each generator sees the record built so
//! far, so later fields may derive from earlier ones. Fields without a
//! generator are left out of the result, never set to `null`.

use serde_json::{Map, Value};

use crate::descriptor::SchemaDocument;
use crate::error::SchemaError;
use crate::handler::HandlerContext;
use crate::registry::Registry;

/// Synthesize a record for `document` under `prefix`.
pub(crate) async fn generate_record(
    document: &SchemaDocument,
    prefix: &str,
    registry: &Registry,
) -> Result<Map<String, Value>, SchemaError> {
    let mut record = Map::new();

    for (field, descriptor) in document.properties() {
        let full_key = format!("{prefix}{field}");
        let Some(generator) = registry.lookup_generator(&full_key) else {
            continue;
        };
        let ctx = HandlerContext {
            full_key: &full_key,
            descriptor,
        };
        let value = generator
            .generate(ctx, &record, field)
            .await
            .map_err(|source| SchemaError::Handler {
                key: full_key.clone(),
                source,
            })?;
        tracing::trace!(key = %full_key, "field generated");
        record.insert(field.clone(), value);
    }

    tracing::debug!(prefix, fields = record.len(), "record generated");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handler::{generator_fn, FieldGenerator};
    use async_trait::async_trait;
    use serde_json::json;

    fn document(properties: Value) -> SchemaDocument {
        SchemaDocument::parse(&json!({"type": "object", "properties": properties})).unwrap()
    }

    #[tokio::test]
    async fn test_fields_without_generator_absent() {
        let registry = Registry::new();
        registry
            .define_generator("name", generator_fn(|_, _| json!("Ada")))
            .unwrap();
        let doc = document(json!({"name": {"type": "string"}, "age": {"type": "number"}}));

        let record = generate_record(&doc, "", &registry).await.unwrap();
        assert_eq!(Value::Object(record), json!({"name": "Ada"}));
    }

    #[tokio::test]
    async fn test_generators_see_earlier_fields() {
        let registry = Registry::new();
        registry
            .define_generator("order.first", generator_fn(|_, _| json!("Ada")))
            .unwrap();
        registry
            .define_generator(
                "order.greeting",
                generator_fn(|record, _| {
                    let first = record.get("first").and_then(Value::as_str).unwrap_or("nobody");
                    json!(format!("hello {first}"))
                }),
            )
            .unwrap();
        let doc = document(json!({"first": {"type": "string"}, "greeting": {"type": "string"}}));

        let record = generate_record(&doc, "order.", &registry).await.unwrap();
        assert_eq!(record["greeting"], "hello Ada");
        assert_eq!(record.keys().collect::<Vec<_>>(), ["first", "greeting"]);
    }

    #[tokio::test]
    async fn test_generated_order_follows_schema() {
        let registry = Registry::new();
        for name in ["z", "m", "a"] {
            registry.define_pattern(name, "^[a-z]{3}$").unwrap();
        }
        let doc = document(json!({"z": {"type": "string"}, "m": {"type": "string"}, "a": {"type": "string"}}));
        let record = generate_record(&doc, "", &registry).await.unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), ["z", "m", "a"]);
    }

    struct Exhausted;

    #[async_trait]
    impl FieldGenerator for Exhausted {
        async fn generate(
            &self,
            _ctx: HandlerContext<'_>,
            _record: &Map<String, Value>,
            _field: &str,
        ) -> Result<Value, HandlerError> {
            Err(HandlerError::new("id pool exhausted"))
        }
    }

    #[tokio::test]
    async fn test_generator_fault_propagates() {
        let registry = Registry::new();
        registry.define_generator("id", Exhausted).unwrap();
        let doc = document(json!({"id": {"type": "string"}}));

        let err = generate_record(&doc, "", &registry).await.unwrap_err();
        assert!(matches!(err, SchemaError::Handler { ref key, .. } if key == "id"), "{err}");
    }
}
