//! # Custom Field Handlers
//!
//! Capability interfaces for per-field custom logic stored in the
//! [`Registry`](crate::Registry):
//!
//! - [`FieldValidator`]: `validate(context, record, field) -> bool`
//! - [`FieldGenerator`]: `generate(context, record, field) -> Value`
//!
//! Handlers are async so they may perform their own I/O. The engines
//! await each field's handler before moving to the next field, so handlers
//! run in schema-declared order, never concurrently.
//!
//! Returning `Ok(false)` from a validator records a violation. Returning
//! `Err` is a fault that aborts the whole engine call.

use std::sync::Arc;

use async_trait::async_trait;
use recschema_core::text_form;
use serde_json::{Map, Value};

use crate::descriptor::PropertyDescriptor;
use crate::error::HandlerError;
use crate::pattern::Pattern;

/// What the engine knows about the field a handler is invoked for.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Schema prefix plus field name, the key the handler was found under.
    pub full_key: &'a str,
    /// The field's declared constraints.
    pub descriptor: &'a PropertyDescriptor,
}

/// Custom validation for one registry key.
#[async_trait]
pub trait FieldValidator: Send + Sync {
    /// Decide whether `record[field]` is acceptable.
    async fn validate(
        &self,
        ctx: HandlerContext<'_>,
        record: &Map<String, Value>,
        field: &str,
    ) -> Result<bool, HandlerError>;
}

/// Custom value synthesis for one registry key.
#[async_trait]
pub trait FieldGenerator: Send + Sync {
    /// Produce a value for `field`. `record` holds the fields generated so
    /// far, in schema-declared order.
    async fn generate(
        &self,
        ctx: HandlerContext<'_>,
        record: &Map<String, Value>,
        field: &str,
    ) -> Result<Value, HandlerError>;
}

/// Synchronous closure adapter for [`FieldValidator`].
pub struct ValidatorFn<F>(F);

/// Wrap a synchronous predicate as a validator.
pub fn validator_fn<F>(f: F) -> ValidatorFn<F>
where
    F: Fn(&Map<String, Value>, &str) -> bool + Send + Sync,
{
    ValidatorFn(f)
}

#[async_trait]
impl<F> FieldValidator for ValidatorFn<F>
where
    F: Fn(&Map<String, Value>, &str) -> bool + Send + Sync,
{
    async fn validate(
        &self,
        _ctx: HandlerContext<'_>,
        record: &Map<String, Value>,
        field: &str,
    ) -> Result<bool, HandlerError> {
        Ok((self.0)(record, field))
    }
}

/// Synchronous closure adapter for [`FieldGenerator`].
pub struct GeneratorFn<F>(F);

/// Wrap a synchronous producer as a generator.
pub fn generator_fn<F>(f: F) -> GeneratorFn<F>
where
    F: Fn(&Map<String, Value>, &str) -> Value + Send + Sync,
{
    GeneratorFn(f)
}

#[async_trait]
impl<F> FieldGenerator for GeneratorFn<F>
where
    F: Fn(&Map<String, Value>, &str) -> Value + Send + Sync,
{
    async fn generate(
        &self,
        _ctx: HandlerContext<'_>,
        record: &Map<String, Value>,
        field: &str,
    ) -> Result<Value, HandlerError> {
        Ok((self.0)(record, field))
    }
}

/// Default validator derived from a pattern definition.
///
/// Fails when the field is absent or has no text form.
pub(crate) struct PatternValidator {
    pattern: Arc<Pattern>,
}

impl PatternValidator {
    pub(crate) fn new(pattern: Arc<Pattern>) -> Self {
        Self { pattern }
    }
}

#[async_trait]
impl FieldValidator for PatternValidator {
    async fn validate(
        &self,
        _ctx: HandlerContext<'_>,
        record: &Map<String, Value>,
        field: &str,
    ) -> Result<bool, HandlerError> {
        let Some(text) = record.get(field).and_then(text_form) else {
            return Ok(false);
        };
        Ok(self.pattern.is_match(&text))
    }
}

/// Default generator derived from a pattern definition.
pub(crate) struct PatternGenerator {
    pattern: Arc<Pattern>,
}

impl PatternGenerator {
    pub(crate) fn new(pattern: Arc<Pattern>) -> Self {
        Self { pattern }
    }
}

#[async_trait]
impl FieldGenerator for PatternGenerator {
    async fn generate(
        &self,
        _ctx: HandlerContext<'_>,
        _record: &Map<String, Value>,
        _field: &str,
    ) -> Result<Value, HandlerError> {
        self.pattern.generate().map(Value::String).ok_or_else(|| {
            HandlerError::new(format!(
                "pattern '{}' was not compiled for synthesis",
                self.pattern.as_str()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recschema_core::JsonType;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_pattern_validator_uses_text_form() {
        let descriptor = PropertyDescriptor::of_type(JsonType::String);
        let ctx = HandlerContext {
            full_key: "zip",
            descriptor: &descriptor,
        };
        let validator = PatternValidator::new(Arc::new(Pattern::new(r"^\d{5}$").unwrap()));

        let ok = record(json!({"zip": "12345", "num": 12345}));
        assert!(validator.validate(ctx, &ok, "zip").await.unwrap());
        assert!(validator.validate(ctx, &ok, "num").await.unwrap());

        let bad = record(json!({"zip": "FFFFF", "list": ["12345"]}));
        assert!(!validator.validate(ctx, &bad, "zip").await.unwrap());
        assert!(!validator.validate(ctx, &bad, "list").await.unwrap());
        assert!(!validator.validate(ctx, &bad, "missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_pattern_generator_requires_synthesis() {
        let descriptor = PropertyDescriptor::of_type(JsonType::String);
        let ctx = HandlerContext {
            full_key: "zip",
            descriptor: &descriptor,
        };
        let generator = PatternGenerator::new(Arc::new(Pattern::matcher_only(r"^\d{5}$").unwrap()));
        let err = generator.generate(ctx, &Map::new(), "zip").await.unwrap_err();
        assert!(err.message().contains("not compiled for synthesis"), "{err}");
    }

    #[tokio::test]
    async fn test_closure_adapters() {
        let descriptor = PropertyDescriptor::of_type(JsonType::Number);
        let ctx = HandlerContext {
            full_key: "n",
            descriptor: &descriptor,
        };
        let even = validator_fn(|record, field| {
            record.get(field).and_then(Value::as_i64).is_some_and(|n| n % 2 == 0)
        });
        assert!(even.validate(ctx, &record(json!({"n": 4})), "n").await.unwrap());
        assert!(!even.validate(ctx, &record(json!({"n": 5})), "n").await.unwrap());

        let seven = generator_fn(|_, _| json!(7));
        assert_eq!(seven.generate(ctx, &Map::new(), "n").await.unwrap(), json!(7));
    }
}
