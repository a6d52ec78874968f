//! Schema subsystem for docshield
//!
//! Schemas are declared with `SchemaBuilder`, composed once, and shared as
//! immutable `Arc<Schema>` values.
//!
//! # Design Principles
//!
//! - Explicit composition (no implicit class hooks)
//! - One identity field per top-level schema
//! - Field kinds extend through the `FieldKind` trait
//! - Lenient coercion on assignment, strict checks on validation

mod composer;
mod errors;
mod field;
pub mod kinds;
mod registry;
mod types;

pub use composer::{
    DocumentKind, Schema, SchemaBuilder, CLS_KEY, DEFAULT_ID_FIELD, INTERNAL_FIELDS, TYPES_KEY,
};
pub use errors::{ShieldError, ShieldResult};
pub use field::{
    AnyField, CustomValidator, DefaultProducer, Field, FieldDefault, FieldKind, FieldOptions,
    ID_KEY,
};
pub use registry::SchemaRegistry;
pub use types::{mapping_from_wire, mapping_to_wire, Mapping, Value, WireMapping};
