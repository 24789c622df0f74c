//! # recschema — Record Validation & Synthesis
//!
//! Validates a JSON record against a declarative object schema and
//! synthesizes records that satisfy it.
//!
//! ## Validation (`validate`)
//!
//! [`Schema::validate`] walks the schema's declared properties and applies
//! the built-in `type`, literal, numeric, string, array and object rules,
//! then any custom validator registered for the field. Every violated rule
//! is collected; validation never stops at the first failure.
//!
//! ## Generation (`generate`)
//!
//! [`Schema::generate`] asks the generator registered for each declared
//! field for a value. Fields without a generator are left out.
//!
//! ## Named Registry (`registry`)
//!
//! Custom validators and generators live in a [`Registry`] addressed by
//! dotted path. A schema handle qualifies each field name with its prefix
//! (`address.` + `postalCode`) to find them. The registry is an explicit
//! dependency, shared by `Arc`, populated once at startup:
//!
//! ```no_run
//! use std::sync::Arc;
//! use recschema::{definitions, Registry, Schema};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(Registry::new());
//! definitions::address::register(&registry)?;
//!
//! let mut schema = Schema::load("data/address.schema.json", Arc::clone(&registry)).await?;
//! let record = serde_json::Value::Object(schema.generate().await?);
//! assert!(schema.validate(&record).await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `recschema-core` internally.
//! - Schema-shape problems are fatal at construction; per-value problems
//!   are always data ([`Violation`]), never errors.
//! - Library code logs through `tracing` and never installs a subscriber.

pub mod definitions;
pub mod descriptor;
pub mod error;
mod generate;
pub mod handler;
pub mod pattern;
pub mod registry;
pub mod schema;
mod validate;
pub mod violation;

pub use descriptor::{PropertyDescriptor, SchemaDocument};
pub use error::{HandlerError, PatternError, RegistryError, SchemaError};
pub use handler::{
    generator_fn, validator_fn, FieldGenerator, FieldValidator, GeneratorFn, HandlerContext,
    ValidatorFn,
};
pub use pattern::Pattern;
pub use registry::{DefinitionManifest, FieldDefinition, PatternDefinition, Registry, RegistryConfig};
pub use schema::Schema;
pub use violation::{Rule, ValidationViolations, Violation};
