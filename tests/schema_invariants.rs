//! Schema Invariant Tests
//!
//! Tests for composition and validation invariants:
//! - Defaults read back; producers re-run while nothing is stored
//! - Exactly one identity field per top-level schema
//! - Inheritance merges fields and builds the dotted discriminator
//! - Locked schemas cannot be subclassed
//! - Fail-fast vs aggregate validation
//! - Stripping of unknown fields mutates the input
//! - Empty strings count as absent
//! - Internal fields cannot be overwritten through input

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docshield::schema::kinds::{NumberField, StringField};
use docshield::{
    Document, FieldOptions, Mapping, Schema, SchemaBuilder, ShieldError, Validator, Value,
};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn mapping(json: serde_json::Value) -> Mapping {
    Value::from(json).into_mapping().unwrap()
}

fn setup_media() -> Arc<Schema> {
    SchemaBuilder::document("Media")
        .field("title", StringField::new().max_length(40).required())
        .field("rating", NumberField::int().default_value(3))
        .build()
        .unwrap()
}

fn setup_movie(media: &Arc<Schema>) -> Arc<Schema> {
    SchemaBuilder::document("Movie")
        .extends(media)
        .field("rating", NumberField::int().default_value(5))
        .field("year", NumberField::int().min_value(1950).max_value(2030))
        .build()
        .unwrap()
}

// =============================================================================
// Default Tests
// =============================================================================

/// A static default reads back unchanged.
#[test]
fn test_static_default_round_trip() {
    let schema = setup_media();
    let doc = Document::new(&schema);
    assert_eq!(doc.get("rating").unwrap(), Value::Int(3));
    assert_eq!(doc.to_native()["rating"], Value::Int(3));
}

/// Producers are not memoized.
#[test]
fn test_producer_default_invoked_per_read() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let schema = SchemaBuilder::embedded("Clock")
        .field(
            "tick",
            NumberField::int().default_with(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Value::Null
            }),
        )
        .build()
        .unwrap();

    let doc = Document::new(&schema);
    let after_construction = calls.load(Ordering::SeqCst);
    for _ in 0..3 {
        assert_eq!(doc.get("tick").unwrap(), Value::Null);
    }
    assert_eq!(calls.load(Ordering::SeqCst), after_construction + 3);
}

// =============================================================================
// Identity Tests
// =============================================================================

/// Documents without a declared identity get `id` exported as `_id`.
#[test]
fn test_identity_auto_generated() {
    let schema = setup_media();
    assert_eq!(schema.id_field(), Some("id"));

    let a = Document::new(&schema);
    let b = Document::new(&schema);
    let id_a = a.id().unwrap();
    assert!(matches!(id_a, Value::Uuid(_)));
    assert_ne!(Some(id_a.clone()), b.id());

    let native = a.to_native();
    assert_eq!(native["_id"], id_a);
    assert!(!native.contains_key("id"));
}

/// Two identity claims are a configuration error.
#[test]
fn test_duplicate_identity_rejected() {
    let err = SchemaBuilder::document("Broken")
        .field("a", StringField::new().id_field())
        .field("b", StringField::new().id_field())
        .build()
        .unwrap_err();
    assert!(matches!(err, ShieldError::Configuration(_)));
}

/// A declared identity is supplied and validated under its own name.
#[test]
fn test_declared_identity_validated_by_name() {
    let schema = SchemaBuilder::document("Account")
        .field("email", StringField::email().id_field())
        .field("name", StringField::new())
        .build()
        .unwrap();

    let mut values = mapping(json!({"email": "not-an-email", "name": "Bob"}));
    let err = Validator::new(&schema).full(&mut values).unwrap_err();
    assert_eq!(err.field(), Some("email"));
    assert_eq!(values, mapping(json!({"email": "not-an-email", "name": "Bob"})));

    let mut values = mapping(json!({"email": "bob@example.com", "name": "Bob"}));
    let report = Validator::new(&schema).full(&mut values).unwrap();
    assert!(report.stripped.is_empty());
}

// =============================================================================
// Inheritance Tests
// =============================================================================

/// Subclass fields are a superset; redeclared fields override.
#[test]
fn test_inheritance_field_union() {
    let media = setup_media();
    let movie = setup_movie(&media);

    for name in media.fields().keys() {
        assert!(movie.field(name).is_some(), "missing inherited field {}", name);
    }
    assert!(movie.field("year").is_some());
    assert!(media.field("year").is_none());

    assert_eq!(Document::new(&movie).get("rating").unwrap(), Value::Int(5));
    assert_eq!(Document::new(&media).get("rating").unwrap(), Value::Int(3));
}

/// The discriminator is the dotted chain from the root.
#[test]
fn test_discriminator_chain() {
    let media = setup_media();
    let movie = setup_movie(&media);
    let short = SchemaBuilder::document("Short")
        .extends(&movie)
        .build()
        .unwrap();

    assert_eq!(short.class_name(), "Media.Movie.Short");

    let mut doc = Document::new(&short);
    doc.set("title", "Plot").unwrap();
    let wire = doc.to_wire();
    assert_eq!(wire["_cls"], json!("Media.Movie.Short"));
    assert_eq!(wire["_types"], json!(["Media", "Media.Movie", "Media.Movie.Short"]));
}

// =============================================================================
// Subclassing Lock Tests
// =============================================================================

/// A locked schema cannot be extended.
#[test]
fn test_subclassing_lock() {
    let root = SchemaBuilder::document("Final")
        .allow_inheritance(false)
        .build()
        .unwrap();
    let err = SchemaBuilder::document("Further")
        .extends(&root)
        .build()
        .unwrap_err();
    assert_eq!(err.code(), "SHIELD_CONFIGURATION");
}

/// Locked schemas export neither `_cls` nor `_types`.
#[test]
fn test_locked_schema_exports_no_discriminator() {
    let root = SchemaBuilder::document("Final")
        .field("name", StringField::new())
        .allow_inheritance(false)
        .build()
        .unwrap();
    let native = Document::new(&root).to_native();
    assert!(!native.contains_key("_cls"));
    assert!(!native.contains_key("_types"));
}

// =============================================================================
// Fail-Fast vs Aggregate Tests
// =============================================================================

/// Document validation stops at the first failure; aggregation sees both.
#[test]
fn test_fail_fast_vs_aggregate() {
    let media = setup_media();
    let movie = setup_movie(&media);

    let input = json!({
        "title": "A title that is far too long to fit into forty characters",
        "year": 1900
    });

    let doc = Document::from_json(&movie, &input).unwrap();
    let err = doc.validate().unwrap_err();
    assert_eq!(err.field(), Some("title"));

    let mut values = mapping(input);
    let report = Validator::new(&movie)
        .aggregate_errors(true)
        .full(&mut values)
        .unwrap();
    assert_eq!(report.errors.len(), 2);
    let fields: Vec<_> = report.errors.iter().filter_map(|e| e.field()).collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"year"));
}

// =============================================================================
// Stripping Tests
// =============================================================================

/// Unknown keys are removed from the caller's mapping.
#[test]
fn test_unknown_field_stripping_is_destructive() {
    let schema = SchemaBuilder::embedded("Named")
        .field("name", StringField::new())
        .build()
        .unwrap();
    let mut values = mapping(json!({"name": "x", "bogus": 1}));

    let report = Validator::new(&schema).partial(&mut values).unwrap();

    assert!(report.is_valid());
    assert_eq!(report.stripped, vec!["bogus".to_string()]);
    assert_eq!(values, mapping(json!({"name": "x"})));
}

// =============================================================================
// Empty Value Tests
// =============================================================================

/// An empty required string is missing, not malformed.
#[test]
fn test_empty_string_treated_as_absent() {
    let schema = SchemaBuilder::embedded("Named")
        .field("name", StringField::new().min_length(3).required())
        .build()
        .unwrap();
    let mut doc = Document::new(&schema);
    doc.set("name", "").unwrap();

    let err = doc.validate().unwrap_err();
    assert_eq!(err.code(), "SHIELD_DOCUMENT_INVALID");
    assert_eq!(err.reason(), Some("required field missing"));
}

// =============================================================================
// Internal Field Guard Tests
// =============================================================================

/// Supplying `_id` through input is rejected.
#[test]
fn test_internal_field_overwrite_guard() {
    let schema = setup_media();
    let mut values = mapping(json!({
        "title": "Misc",
        "_id": "9f0c1f6e-1d2b-4c1a-8f7e-3b1e2a9d4c5b"
    }));

    let err = Validator::new(&schema).full(&mut values).unwrap_err();
    assert_eq!(
        err,
        ShieldError::document_invalid(
            "overwrite of internal fields attempted",
            "_id",
            "9f0c1f6e-1d2b-4c1a-8f7e-3b1e2a9d4c5b",
        )
    );
}

/// Validation is deterministic.
#[test]
fn test_validation_is_deterministic() {
    let schema = setup_media();
    for _ in 0..100 {
        let mut values = mapping(json!({"title": "Alice", "extra": true}));
        let report = Validator::new(&schema).full(&mut values).unwrap();
        assert_eq!(report.stripped, vec!["extra".to_string()]);
    }
}
