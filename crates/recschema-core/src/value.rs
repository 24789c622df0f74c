//! Value helpers shared by the validation rules.

use std::borrow::Cow;

use serde_json::Value;

/// Structural equality where numbers compare by numeric value.
///
/// `serde_json` treats `1` and `1.0` as different values; schema literals
/// (`enum`, `const`, `uniqueItems`) do not.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => a == b,
    }
}

/// Text form of a scalar value.
///
/// Strings are borrowed as-is, numbers and booleans are rendered. `null`,
/// arrays and objects have no text form.
pub fn text_form(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(!values_equal(&json!(1), &json!(2)));
        assert!(!values_equal(&json!(1), &json!("1")));
    }

    #[test]
    fn test_nested_equality() {
        assert!(values_equal(
            &json!({"a": [1, 2.0], "b": null}),
            &json!({"b": null, "a": [1.0, 2]})
        ));
        assert!(!values_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!values_equal(&json!([1, 2]), &json!([2, 1])));
    }

    #[test]
    fn test_text_form() {
        assert_eq!(text_form(&json!("abc")).as_deref(), Some("abc"));
        assert_eq!(text_form(&json!(12345)).as_deref(), Some("12345"));
        assert_eq!(text_form(&json!(true)).as_deref(), Some("true"));
        assert!(text_form(&json!(null)).is_none());
        assert!(text_form(&json!([1])).is_none());
        assert!(text_form(&json!({})).is_none());
    }
}
