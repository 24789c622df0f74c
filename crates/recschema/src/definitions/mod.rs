//! Bundled field definitions, one module per domain.
//!
//! Each module exposes a `register` function that populates a
//! [`Registry`](crate::Registry) with its fields' validators and generators.

pub mod address;
