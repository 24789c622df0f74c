//! Integration test: the bundled address schema, loaded from disk, against
//! the bundled address field definitions.

use std::path::PathBuf;
use std::sync::Arc;

use recschema::{definitions, Registry, Rule, Schema};
use serde_json::{json, Value};

fn address_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("address.schema.json")
}

async fn address_schema() -> Schema {
    let registry = Arc::new(Registry::new());
    definitions::address::register(&registry).expect("address definitions register");
    Schema::load(address_path(), registry)
        .await
        .expect("address schema loads")
}

#[tokio::test]
async fn test_validates_address() {
    let mut schema = address_schema().await;
    assert_eq!(schema.prefix(), "address.");

    let valid = schema
        .validate(&json!({
            "postOfficeBox": "123",
            "streetAddress": "456 Main St",
            "locality": "Cityville",
            "region": "State",
            "postalCode": "12345",
            "countryName": "Country"
        }))
        .await
        .unwrap();

    assert!(valid, "unexpected violations: {:?}", schema.validation_errors());
    assert!(schema.validation_errors().is_empty());
}

#[tokio::test]
async fn test_fails_address_with_bad_postal_code() {
    let mut schema = address_schema().await;
    let valid = schema
        .validate(&json!({
            "postOfficeBox": "123",
            "streetAddress": "456 Main St",
            "locality": "Cityville",
            "region": "State",
            "postalCode": "FFFFF",
            "countryName": "Country"
        }))
        .await
        .unwrap();

    assert!(!valid);
    let errors = schema.validation_errors();
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(errors.iter().all(|e| e.field == "postalCode"));
    assert_eq!(errors[0].rule, Rule::Pattern);
    assert_eq!(errors[1].rule, Rule::Custom);
    assert_eq!(errors[0].value, json!("FFFFF"));
}

#[tokio::test]
async fn test_fails_address_with_wrong_types() {
    let mut schema = address_schema().await;
    let valid = schema
        .validate(&json!({
            "postOfficeBox": 123,
            "streetAddress": 16.0,
            "locality": 12.45,
            "region": 4,
            "postalCode": 12345,
            "countryName": 23
        }))
        .await
        .unwrap();

    assert!(!valid);
    let errors = schema.validation_errors();
    assert_eq!(errors.len(), 6, "{errors:?}");
    assert!(errors.iter().all(|e| e.rule == Rule::Type));
    let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        ["postOfficeBox", "streetAddress", "locality", "region", "postalCode", "countryName"]
    );
}

#[tokio::test]
async fn test_generates_complete_address() {
    let mut schema = address_schema().await;
    let generated = schema.generate().await.unwrap();

    for field in [
        "postOfficeBox",
        "extendedAddress",
        "streetAddress",
        "locality",
        "region",
        "postalCode",
        "countryName",
    ] {
        assert!(
            generated.get(field).is_some_and(Value::is_string),
            "{field} missing from {generated:?}"
        );
    }

    let record = Value::Object(generated);
    let valid = schema.validate(&record).await.unwrap();
    assert!(valid, "{record} failed: {:?}", schema.validation_errors());
}

#[tokio::test]
async fn test_without_definitions_only_builtin_rules_apply() {
    let mut schema = Schema::load(address_path(), Arc::new(Registry::new()))
        .await
        .unwrap();

    assert!(schema.generate().await.unwrap().is_empty());
    assert!(!schema.validate(&json!({"postalCode": "FFFFF"})).await.unwrap());
    assert_eq!(schema.validation_errors().len(), 1);
    assert!(schema.validate(&json!({"locality": "two words"})).await.unwrap());
}

#[tokio::test]
async fn test_in_memory_address_schema_shares_definitions() {
    let registry = Arc::new(Registry::new());
    definitions::address::register(&registry).unwrap();
    let mut schema = definitions::address::schema(Arc::clone(&registry)).unwrap();

    assert!(!schema.validate(&json!({"locality": "two words"})).await.unwrap());
    assert_eq!(schema.validation_errors()[0].rule, Rule::Custom);
}
