//! docshield - Declarative document schemas with validation and safe projections
//!
//! Schemas are composed once with `SchemaBuilder`, documents are validated
//! against them, and exports can be filtered for owners or the public.

pub mod config;
pub mod document;
pub mod schema;

pub use config::{CollectionMeta, ValidationOptions};
pub use document::{
    make_json_ownersafe, make_json_publicsafe, make_ownersafe, make_publicsafe, Document,
    SafeInput, SafeOutput, ValidationReport, Validator,
};
pub use schema::{
    Field, FieldKind, FieldOptions, Mapping, Schema, SchemaBuilder, SchemaRegistry, ShieldError,
    ShieldResult, Value,
};
