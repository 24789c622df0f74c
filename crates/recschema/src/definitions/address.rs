//! # Postal Address Fields
//!
//! Pattern definitions for the h-card style address schema bundled as
//! `data/address.schema.json`. Registered under the `address.` prefix, so
//! they apply to a schema loaded from a file named `address.*` or an
//! in-memory schema named `address`.

use std::sync::Arc;

use crate::error::{RegistryError, SchemaError};
use crate::registry::Registry;
use crate::schema::Schema;

/// The bundled address schema document.
pub const ADDRESS_SCHEMA: &str = include_str!("../../data/address.schema.json");

/// Registry name and pattern for every address field.
pub const ADDRESS_FIELDS: &[(&str, &str)] = &[
    ("address.locality", r"^[\S]+$"),
    ("address.streetAddress", r"^[\S ]+$"),
    ("address.region", r"^[\S]+$"),
    ("address.countryName", r"^[\S]+$"),
    ("address.postalCode", r"^\d{5}$"),
    ("address.postOfficeBox", r"^\d+$"),
    ("address.extendedAddress", r"^[\S]*$"),
];

/// Define every address field in `registry`.
pub fn register(registry: &Registry) -> Result<(), RegistryError> {
    for (name, pattern) in ADDRESS_FIELDS {
        registry.define_pattern(name, pattern)?;
    }
    Ok(())
}

/// A handle over the bundled address schema, namespaced as `address`.
pub fn schema(registry: Arc<Registry>) -> Result<Schema, SchemaError> {
    let document = serde_json::from_str(ADDRESS_SCHEMA).map_err(|e| SchemaError::DocumentLoad {
        path: "data/address.schema.json".to_string(),
        reason: format!("invalid JSON: {e}"),
    })?;
    Ok(Schema::from_document(&document, registry)?.with_name("address"))
}
