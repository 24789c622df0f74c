//! # recschema-core — Foundational Types
//!
//! Leaf crate of the recschema workspace. It defines the primitives every
//! other crate builds on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Closed type taxonomy.** [`JsonType`] is the single definition of the
//!    kinds a property descriptor may declare. Every `match` on it is
//!    exhaustive, so adding a kind forces every rule to handle it.
//!
//! 2. **Validated field paths.** Registry names are [`FieldPath`] values,
//!    never bare strings. A path with an empty segment cannot be constructed.
//!
//! 3. **Value equality by meaning.** [`values_equal`] compares numbers by
//!    numeric value, so `1` and `1.0` are the same literal for `enum`,
//!    `const` and `uniqueItems`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `recschema-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod json_type;
pub mod path;
pub mod value;

pub use error::CoreError;
pub use json_type::JsonType;
pub use path::FieldPath;
pub use value::{text_form, values_equal};
