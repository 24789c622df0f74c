//! # Named Registry
//!
//! A tree of optional per-field validators and generators addressed by
//! dotted path (`address.postalCode`). Schema-definition code populates it
//! once at startup; every schema handle reads it during `validate` and
//! `generate`.
//!
//! ## Path Resolution
//!
//! A name is split on `.` and walked segment by segment from the root.
//! Registration creates missing intermediate nodes on the way down and
//! attaches the handler at the final segment. Lookup walks the same way
//! but never creates anything, and only finds a handler registered under
//! exactly that path: there is no fallback to ancestors.
//!
//! A node's validator and generator are independent. Registering one never
//! removes the other.
//!
//! ## Thread Safety
//!
//! The tree sits behind a `parking_lot::RwLock`. Lookups clone the
//! handler's `Arc` out, so the lock is never held across an `.await`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use recschema_core::path::SEPARATOR;
use recschema_core::FieldPath;
use serde::Deserialize;

use crate::error::RegistryError;
use crate::handler::{FieldGenerator, FieldValidator, PatternGenerator, PatternValidator};
use crate::pattern::{Pattern, DEFAULT_MAX_REPEAT};
use crate::schema::{parse_document_text, DocumentFormat};

/// Registry tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Repetition bound for unbounded quantifiers when pattern definitions
    /// synthesize strings.
    pub max_repeat: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_repeat: DEFAULT_MAX_REPEAT,
        }
    }
}

/// One registration request: a name plus any of an explicit validator, an
/// explicit generator, and a pattern to derive the missing ones from.
#[derive(Clone)]
pub struct FieldDefinition {
    name: String,
    validator: Option<Arc<dyn FieldValidator>>,
    generator: Option<Arc<dyn FieldGenerator>>,
    regex: Option<String>,
}

impl FieldDefinition {
    /// Start a definition for the dotted `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validator: None,
            generator: None,
            regex: None,
        }
    }

    /// Use an explicit validator.
    pub fn validate(mut self, validator: impl FieldValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Use an explicit generator.
    pub fn generate(mut self, generator: impl FieldGenerator + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Derive whichever of validator and generator is not given explicitly
    /// from `pattern`.
    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("validator", &self.validator.is_some())
            .field("generator", &self.generator.is_some())
            .field("regex", &self.regex)
            .finish()
    }
}

/// A manifest of pattern definitions, loadable from YAML or JSON:
///
/// ```yaml
/// definitions:
///   - name: address.postalCode
///     regex: '^\d{5}$'
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionManifest {
    pub definitions: Vec<PatternDefinition>,
}

/// One manifest entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternDefinition {
    pub name: FieldPath,
    pub regex: String,
}

#[derive(Default)]
struct Node {
    validator: Option<Arc<dyn FieldValidator>>,
    generator: Option<Arc<dyn FieldGenerator>>,
    children: HashMap<String, Node>,
}

impl Node {
    fn has_handler(&self) -> bool {
        self.validator.is_some() || self.generator.is_some()
    }

    /// Walk to `path`, creating missing nodes.
    fn entry(&mut self, path: &FieldPath) -> &mut Node {
        path.segments()
            .fold(self, |node, segment| node.children.entry(segment.to_string()).or_default())
    }

    /// Walk to `key` without creating anything.
    fn find(&self, key: &str) -> Option<&Node> {
        key.split(SEPARATOR)
            .try_fold(self, |node, segment| node.children.get(segment))
    }

    fn collect_names(&self, prefix: &str, out: &mut Vec<String>) {
        for (segment, child) in &self.children {
            let name = if prefix.is_empty() {
                segment.clone()
            } else {
                format!("{prefix}{SEPARATOR}{segment}")
            };
            if child.has_handler() {
                out.push(name.clone());
            }
            child.collect_names(&name, out);
        }
    }
}

/// Path-addressed tree of per-field validators and generators.
#[derive(Default)]
pub struct Registry {
    root: RwLock<Node>,
    config: RegistryConfig,
}

impl Registry {
    /// An empty registry with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry with explicit configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            root: RwLock::default(),
            config,
        }
    }

    /// The registry's configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register `validator` under `name`, replacing any previous validator
    /// there. A generator at the same path is untouched.
    pub fn define_validator(
        &self,
        name: &str,
        validator: impl FieldValidator + 'static,
    ) -> Result<(), RegistryError> {
        self.define(FieldDefinition::new(name).validate(validator))
    }

    /// Register `generator` under `name`, replacing any previous generator
    /// there. A validator at the same path is untouched.
    pub fn define_generator(
        &self,
        name: &str,
        generator: impl FieldGenerator + 'static,
    ) -> Result<(), RegistryError> {
        self.define(FieldDefinition::new(name).generate(generator))
    }

    /// Register both handlers for `name` from a single pattern: a validator
    /// testing the field's text form, and a generator synthesizing
    /// conforming strings.
    pub fn define_pattern(&self, name: &str, pattern: &str) -> Result<(), RegistryError> {
        self.define(FieldDefinition::new(name).regex(pattern))
    }

    /// Apply a definition.
    ///
    /// Explicit handlers win. When a pattern is given, it fills in only the
    /// handler kinds that were not supplied explicitly.
    ///
    /// # Errors
    ///
    /// Fails without touching the tree if the name is not a valid dotted
    /// path or the pattern does not compile. The pattern is compiled for
    /// synthesis only when no explicit generator is supplied.
    pub fn define(&self, definition: FieldDefinition) -> Result<(), RegistryError> {
        let path = FieldPath::parse(definition.name)?;
        let mut validator = definition.validator;
        let mut generator = definition.generator;

        if let Some(source) = definition.regex.as_deref() {
            let pattern = if generator.is_none() {
                Pattern::with_max_repeat(source, self.config.max_repeat)?
            } else {
                Pattern::matcher_only(source)?
            };
            let pattern = Arc::new(pattern);
            if validator.is_none() {
                validator = Some(Arc::new(PatternValidator::new(Arc::clone(&pattern))));
            }
            if generator.is_none() {
                generator = Some(Arc::new(PatternGenerator::new(pattern)));
            }
        }

        let mut root = self.root.write();
        let node = root.entry(&path);
        if let Some(validator) = validator {
            if node.validator.replace(validator).is_some() {
                tracing::debug!(name = %path, "replaced validator");
            }
        }
        if let Some(generator) = generator {
            if node.generator.replace(generator).is_some() {
                tracing::debug!(name = %path, "replaced generator");
            }
        }
        tracing::debug!(
            name = %path,
            validator = node.validator.is_some(),
            generator = node.generator.is_some(),
            "field defined"
        );
        Ok(())
    }

    /// The validator registered at exactly `full_key`.
    pub fn lookup_validator(&self, full_key: &str) -> Option<Arc<dyn FieldValidator>> {
        self.root.read().find(full_key)?.validator.clone()
    }

    /// The generator registered at exactly `full_key`.
    pub fn lookup_generator(&self, full_key: &str) -> Option<Arc<dyn FieldGenerator>> {
        self.root.read().find(full_key)?.generator.clone()
    }

    /// Whether any handler is registered at exactly `full_key`.
    pub fn contains(&self, full_key: &str) -> bool {
        self.root.read().find(full_key).is_some_and(Node::has_handler)
    }

    /// Every path carrying at least one handler, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.root.read().collect_names("", &mut names);
        names.sort();
        names
    }

    /// Register every entry of a manifest as a pattern definition.
    ///
    /// Entries are applied in order; the first failure stops the load and
    /// leaves earlier entries registered.
    pub fn apply_manifest(&self, manifest: &DefinitionManifest) -> Result<usize, RegistryError> {
        for entry in &manifest.definitions {
            self.define_pattern(entry.name.as_str(), &entry.regex)?;
        }
        Ok(manifest.definitions.len())
    }

    /// Load a YAML (`.yaml`/`.yml`) or JSON manifest and apply it.
    ///
    /// Returns the number of definitions registered.
    pub async fn load_definitions(&self, path: impl AsRef<Path>) -> Result<usize, RegistryError> {
        let path = path.as_ref();
        let load_error = |reason: String| RegistryError::ManifestLoad {
            path: path.display().to_string(),
            reason,
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| load_error(format!("cannot read file: {e}")))?;
        let value = parse_document_text(&content, DocumentFormat::from_path(path))
            .map_err(load_error)?;
        let manifest: DefinitionManifest = serde_json::from_value(value)
            .map_err(|e| load_error(format!("invalid manifest: {e}")))?;

        let count = self.apply_manifest(&manifest)?;
        tracing::debug!(path = %path.display(), count, "definition manifest applied");
        Ok(count)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .field("config", &self.config)
            .finish()
    }
}
