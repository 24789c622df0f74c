//! # Validation Engine
//!
//! Walks a schema's declared properties in document order and evaluates
//! every rule that applies to each field present in the record. Rules are
//! independent: a field with the wrong type that also fails its pattern
//! contributes two violations. Nothing short-circuits.
//!
//! ## Rule Order Per Field
//!
//! 1. `type`
//! 2. `enum`, `const`
//! 3. numeric rules (`number`/`integer` fields)
//! 4. string rules (`string` fields)
//! 5. the registered custom validator, if any, for any declared type
//! 6. array rules (`array` fields)
//! 7. object rules (`object` fields)
//!
//! Fields absent from the record are skipped entirely. Rules that need a
//! number, text, array or object operand are skipped when the value has
//! no such form; the `type` violation already covers that case.

use recschema_core::{text_form, values_equal, JsonType};
use serde_json::{Map, Value};

use crate::descriptor::{PropertyDescriptor, SchemaDocument};
use crate::error::SchemaError;
use crate::handler::HandlerContext;
use crate::registry::Registry;
use crate::violation::{Rule, ValidationViolations, Violation};

/// Relative tolerance for `multipleOf` on binary floating point.
const MULTIPLE_EPSILON: f64 = 1e-9;

/// Validate `record` against every declared property.
pub(crate) async fn validate_record(
    document: &SchemaDocument,
    prefix: &str,
    registry: &Registry,
    record: &Map<String, Value>,
) -> Result<ValidationViolations, SchemaError> {
    let mut violations = ValidationViolations::default();

    for (field, descriptor) in document.properties() {
        let Some(value) = record.get(field) else {
            continue;
        };
        let mut check = FieldCheck {
            field: field.as_str(),
            value,
            out: &mut violations,
        };

        check_type(descriptor, &mut check);
        check_literals(descriptor, &mut check);
        match descriptor.kind {
            JsonType::Number | JsonType::Integer => check_numeric(descriptor, &mut check),
            JsonType::String => check_string(descriptor, &mut check),
            JsonType::Null | JsonType::Boolean | JsonType::Object | JsonType::Array => {}
        }

        let full_key = format!("{prefix}{field}");
        if let Some(validator) = registry.lookup_validator(&full_key) {
            let ctx = HandlerContext {
                full_key: &full_key,
                descriptor,
            };
            let accepted = validator
                .validate(ctx, record, field)
                .await
                .map_err(|source| SchemaError::Handler {
                    key: full_key.clone(),
                    source,
                })?;
            if !accepted {
                check.push(
                    Rule::Custom,
                    format!("field '{field}' value {value} was rejected by validator '{full_key}'"),
                );
            }
        }

        match descriptor.kind {
            JsonType::Array => check_array(descriptor, &mut check),
            JsonType::Object => check_object(descriptor, &mut check),
            JsonType::Null
            | JsonType::Boolean
            | JsonType::Number
            | JsonType::Integer
            | JsonType::String => {}
        }
    }

    tracing::debug!(
        prefix,
        fields = document.properties().len(),
        violations = violations.len(),
        "record validated"
    );
    Ok(violations)
}

/// Violation sink bound to one field of the record.
struct FieldCheck<'a> {
    field: &'a str,
    value: &'a Value,
    out: &'a mut ValidationViolations,
}

impl FieldCheck<'_> {
    fn push(&mut self, rule: Rule, message: String) {
        tracing::trace!(field = self.field, %rule, %message, "violation");
        self.out.push(Violation {
            field: self.field.to_string(),
            value: self.value.clone(),
            rule,
            message,
        });
    }
}

fn check_type(descriptor: &PropertyDescriptor, check: &mut FieldCheck<'_>) {
    if !descriptor.kind.accepts(check.value) {
        let message = format!(
            "field '{}' of type '{}' should be of type {}",
            check.field,
            JsonType::of(check.value),
            descriptor.kind
        );
        check.push(Rule::Type, message);
    }
}

fn check_literals(descriptor: &PropertyDescriptor, check: &mut FieldCheck<'_>) {
    let value = check.value;
    if let Some(allowed) = &descriptor.allowed {
        if !allowed.iter().any(|candidate| values_equal(candidate, value)) {
            let message = format!("field '{}' value {value} not in enum", check.field);
            check.push(Rule::Enum, message);
        }
    }
    if let Some(expected) = &descriptor.constant {
        if !values_equal(expected, value) {
            let message = format!(
                "field '{}' value {value} was expected to be {expected}",
                check.field
            );
            check.push(Rule::Const, message);
        }
    }
}

fn check_numeric(descriptor: &PropertyDescriptor, check: &mut FieldCheck<'_>) {
    let Some(n) = check.value.as_f64() else {
        return;
    };
    let field = check.field;

    if let Some(m) = descriptor.multiple_of {
        if m != 0.0 && !is_multiple(n, m) {
            check.push(
                Rule::MultipleOf,
                format!("field '{field}' value {n} is not a multiple of {m}"),
            );
        }
    }
    if let Some(min) = descriptor.minimum {
        if n < min {
            check.push(
                Rule::Minimum,
                format!("field '{field}' value {n} is under the minimum value of {min}"),
            );
        }
    }
    if let Some(max) = descriptor.maximum {
        if n > max {
            check.push(
                Rule::Maximum,
                format!("field '{field}' value {n} is above the maximum value of {max}"),
            );
        }
    }
    if let Some(min) = descriptor.exclusive_minimum {
        if n <= min {
            check.push(
                Rule::ExclusiveMinimum,
                format!("field '{field}' value {n} should be above the exclusive minimum of {min}"),
            );
        }
    }
    if let Some(max) = descriptor.exclusive_maximum {
        if n >= max {
            check.push(
                Rule::ExclusiveMaximum,
                format!("field '{field}' value {n} should be below the exclusive maximum of {max}"),
            );
        }
    }
}

fn is_multiple(n: f64, m: f64) -> bool {
    let quotient = n / m;
    if !quotient.is_finite() {
        // Quotient overflowed, too large to resolve a remainder.
        return true;
    }
    (quotient - quotient.round()).abs() <= MULTIPLE_EPSILON * quotient.abs().max(1.0)
}

fn check_string(descriptor: &PropertyDescriptor, check: &mut FieldCheck<'_>) {
    let value = check.value;
    let Some(text) = text_form(value) else {
        return;
    };
    let field = check.field;
    let length = text.chars().count() as u64;

    if let Some(min) = descriptor.min_length {
        if length < min {
            check.push(
                Rule::MinLength,
                format!("field '{field}' value {value} was expected to have at least {min} characters"),
            );
        }
    }
    if let Some(max) = descriptor.max_length {
        if length > max {
            check.push(
                Rule::MaxLength,
                format!("field '{field}' value {value} was expected to have at most {max} characters"),
            );
        }
    }
    if let Some(pattern) = &descriptor.pattern {
        if !pattern.is_match(&text) {
            check.push(
                Rule::Pattern,
                format!(
                    "field '{field}' value {value} was expected to match pattern {}",
                    pattern.as_str()
                ),
            );
        }
    }
}

fn check_array(descriptor: &PropertyDescriptor, check: &mut FieldCheck<'_>) {
    let Some(items) = check.value.as_array() else {
        return;
    };
    let field = check.field;
    let count = items.len() as u64;

    if let Some(min) = descriptor.min_items {
        if count < min {
            check.push(
                Rule::MinItems,
                format!("field '{field}' has {count} items, expected at least {min}"),
            );
        }
    }
    if let Some(max) = descriptor.max_items {
        if count > max {
            check.push(
                Rule::MaxItems,
                format!("field '{field}' has {count} items, expected at most {max}"),
            );
        }
    }
    if descriptor.unique_items && max_occurrences(items) > 1 {
        check.push(
            Rule::UniqueItems,
            format!("field '{field}' was expected to contain only unique values"),
        );
    }
}

/// Highest occurrence count of any distinct value in `items`.
fn max_occurrences(items: &[Value]) -> usize {
    let mut counts: Vec<(&Value, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| values_equal(seen, item)) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    counts.into_iter().map(|(_, count)| count).max().unwrap_or(0)
}

fn check_object(descriptor: &PropertyDescriptor, check: &mut FieldCheck<'_>) {
    let Some(object) = check.value.as_object() else {
        return;
    };
    let field = check.field;
    let count = object.len() as u64;

    if let Some(min) = descriptor.min_properties {
        if count < min {
            check.push(
                Rule::MinProperties,
                format!("field '{field}' has {count} properties, expected at least {min}"),
            );
        }
    }
    if let Some(max) = descriptor.max_properties {
        if count > max {
            check.push(
                Rule::MaxProperties,
                format!("field '{field}' has {count} properties, expected at most {max}"),
            );
        }
    }
    for key in &descriptor.required {
        if !object.contains_key(key) {
            check.push(
                Rule::Required,
                format!("field '{field}' is missing required property '{key}'"),
            );
        }
    }
    for (trigger, dependents) in &descriptor.dependent_required {
        if !object.contains_key(trigger) {
            continue;
        }
        for dependent in dependents {
            if !object.contains_key(dependent) {
                check.push(
                    Rule::DependentRequired,
                    format!("field '{field}' has '{trigger}' but is missing '{dependent}'"),
                );
            }
        }
    }
}
