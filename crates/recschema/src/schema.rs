//! # Schema Handle
//!
//! A ready-to-use schema: a well-formed [`SchemaDocument`], the name prefix
//! that qualifies field lookups into the registry, and the registry itself.
//!
//! ## Lifecycle
//!
//! A handle only exists once its document has been checked, so there is
//! no way to call [`Schema::validate`] or [`Schema::generate`] before the
//! schema is ready. Construction either succeeds with a usable handle or
//! fails with [`SchemaError::SchemaInvalid`].
//!
//! - [`Schema::from_document`] takes an already-parsed value and has an
//!   empty prefix; [`Schema::with_name`] namespaces it.
//! - [`Schema::load`] reads a JSON or YAML file asynchronously and derives
//!   the prefix from the file name: `data/address.schema.json` looks up
//!   fields under `address.`.
//!
//! ## Error State
//!
//! [`Schema::validate`] overwrites the handle's violation buffer on every
//! call. It takes `&mut self`, so two validations cannot race on the same
//! handle; use [`Schema::check`] or separate handles to validate
//! concurrently.

use std::path::Path;
use std::sync::Arc;

use recschema_core::JsonType;
use serde_json::{Map, Value};

use crate::descriptor::SchemaDocument;
use crate::error::SchemaError;
use crate::registry::Registry;
use crate::violation::{ValidationViolations, Violation};
use crate::{generate, validate};

const IN_MEMORY: &str = "<in-memory>";

/// A loaded, ready-to-use object schema.
#[derive(Debug)]
pub struct Schema {
    document: SchemaDocument,
    prefix: String,
    registry: Arc<Registry>,
    validation_errors: ValidationViolations,
}

impl Schema {
    /// Build a handle from an in-memory document.
    ///
    /// # Errors
    ///
    /// [`SchemaError::SchemaInvalid`] if the document is not an object
    /// schema with `properties`, or a descriptor is malformed.
    pub fn from_document(document: &Value, registry: Arc<Registry>) -> Result<Self, SchemaError> {
        Self::ready(document, IN_MEMORY, String::new(), registry)
    }

    /// Load a handle from a `.json`, `.yaml` or `.yml` file.
    ///
    /// The registry prefix is the file name up to its first `.`, plus `.`.
    pub async fn load(
        location: impl AsRef<Path>,
        registry: Arc<Registry>,
    ) -> Result<Self, SchemaError> {
        let location = location.as_ref();
        let load_error = |reason: String| SchemaError::DocumentLoad {
            path: location.display().to_string(),
            reason,
        };

        let content = tokio::fs::read_to_string(location)
            .await
            .map_err(|e| load_error(format!("cannot read file: {e}")))?;
        let value = parse_document_text(&content, DocumentFormat::from_path(location))
            .map_err(load_error)?;

        let display = location.display().to_string();
        let prefix = source_prefix(&display);
        Self::ready(&value, &display, prefix, registry)
    }

    fn ready(
        document: &Value,
        schema_name: &str,
        prefix: String,
        registry: Arc<Registry>,
    ) -> Result<Self, SchemaError> {
        let document = SchemaDocument::parse(document).map_err(|reason| {
            tracing::warn!(schema = schema_name, %reason, "schema rejected");
            SchemaError::SchemaInvalid {
                schema_name: schema_name.to_string(),
                reason,
            }
        })?;
        tracing::debug!(
            schema = schema_name,
            prefix = %prefix,
            fields = document.properties().len(),
            "schema ready"
        );
        Ok(Self {
            document,
            prefix,
            registry,
            validation_errors: ValidationViolations::default(),
        })
    }

    /// Namespace registry lookups under `name.`. An empty name clears the
    /// prefix.
    pub fn with_name(mut self, name: &str) -> Self {
        self.prefix = if name.is_empty() {
            String::new()
        } else {
            format!("{name}.")
        };
        self
    }

    /// The registry prefix, empty for unnamed in-memory schemas.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The parsed document.
    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    /// The registry this handle resolves custom handlers through.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Registry key for a declared field.
    pub fn full_key(&self, field: &str) -> String {
        format!("{}{field}", self.prefix)
    }

    /// Validate `record`, store its violations on the handle, and report
    /// whether there were none.
    ///
    /// The previous call's violations are discarded first, even if this
    /// call fails.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidRecord`] if `record` is not an object,
    /// [`SchemaError::Handler`] if a custom validator raised a fault.
    pub async fn validate(&mut self, record: &Value) -> Result<bool, SchemaError> {
        self.validation_errors = ValidationViolations::default();
        let violations = self.check(record).await?;
        let valid = violations.is_empty();
        self.validation_errors = violations;
        Ok(valid)
    }

    /// Violations recorded by the last [`Schema::validate`] call.
    pub fn validation_errors(&self) -> &[Violation] {
        self.validation_errors.violations()
    }

    /// Validate `record` without touching the handle's error state.
    pub async fn check(&self, record: &Value) -> Result<ValidationViolations, SchemaError> {
        let record = as_record(record)?;
        validate::validate_record(&self.document, &self.prefix, &self.registry, record).await
    }

    /// Synthesize a record from the registered generators.
    ///
    /// Fields without a generator are absent from the result.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Handler`] if a generator raised a fault.
    pub async fn generate(&self) -> Result<Map<String, Value>, SchemaError> {
        generate::generate_record(&self.document, &self.prefix, &self.registry).await
    }
}

fn as_record(value: &Value) -> Result<&Map<String, Value>, SchemaError> {
    value.as_object().ok_or(SchemaError::InvalidRecord {
        found: JsonType::of(value),
    })
}

/// Registry prefix for a file-backed schema: final path segment (either
/// separator), up to the first `.`, plus `.`.
fn source_prefix(location: &str) -> String {
    let file = location
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(location);
    let stem = file.split('.').next().unwrap_or(file);
    format!("{stem}.")
}

/// Serialization format of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml`/`.yml` are YAML; everything else is read as JSON.
    pub(crate) fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Parse document text into a JSON value tree.
pub(crate) fn parse_document_text(content: &str, format: DocumentFormat) -> Result<Value, String> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))
        }
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))?;
            yaml_to_json_value(&yaml).map_err(|e| format!("YAML-to-JSON conversion failed: {e}"))
        }
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Mapping order is kept, so declared property order survives. Tags are
/// dropped and the inner value converted.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
