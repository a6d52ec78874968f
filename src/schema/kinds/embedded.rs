//! Embedded document fields
//!
//! An embedded field either names its schema up front or refers back to the
//! schema that declares it (`EmbeddedField::recursive`). Self-references are
//! bound by `SchemaBuilder::build` through a weak handle, so a schema never
//! keeps itself alive.

use std::sync::{Arc, Weak};

use serde_json::Value as JsonValue;

use crate::document::Document;
use crate::schema::composer::Schema;
use crate::schema::field::FieldKind;
use crate::schema::types::Value;

#[derive(Debug, Clone)]
enum Target {
    Schema(Arc<Schema>),
    /// Self-reference not yet composed into a schema
    Owner,
    /// Self-reference bound to its owning schema
    Bound(Weak<Schema>),
}

/// A field holding a document of an embedded schema or one of its subclasses.
#[derive(Debug, Clone)]
pub struct EmbeddedField {
    target: Target,
}

impl EmbeddedField {
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            target: Target::Schema(schema.clone()),
        }
    }

    /// Field holding documents of the schema it is declared on.
    ///
    /// Subclasses rebind the reference to themselves.
    pub fn recursive() -> Self {
        Self {
            target: Target::Owner,
        }
    }

    /// Target schema; `None` for a self-reference outside a live schema.
    pub fn schema(&self) -> Option<Arc<Schema>> {
        match &self.target {
            Target::Schema(schema) => Some(schema.clone()),
            Target::Owner => None,
            Target::Bound(owner) => owner.upgrade(),
        }
    }
}

impl FieldKind for EmbeddedField {
    fn type_name(&self) -> &'static str {
        "object"
    }

    fn native_from_raw(&self, raw: Value) -> Value {
        match (raw, self.schema()) {
            (Value::Map(seed), Some(schema)) => {
                Value::Document(Document::from_mapping(&schema, seed))
            }
            (other, _) => other,
        }
    }

    /// Null assignments are ignored.
    fn assign(&self, raw: Value) -> Option<Value> {
        if raw.is_null() {
            return None;
        }
        Some(self.native_from_raw(raw))
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let Some(schema) = self.schema() else {
            return Err("embedded document schema is not bound".into());
        };
        match value {
            Value::Document(doc) if doc.schema().is_subclass_of(&schema) => {
                doc.validate().map_err(|e| e.to_string())
            }
            _ => Err(format!(
                "invalid embedded document instance provided for {}",
                schema.class_name()
            )),
        }
    }

    fn export_wire(&self, value: &Value) -> JsonValue {
        match value {
            Value::Document(doc) => JsonValue::Object(doc.to_wire()),
            other => other.to_json(),
        }
    }

    fn embedded_schema(&self) -> Option<Arc<Schema>> {
        self.schema()
    }

    fn is_recursive(&self) -> bool {
        !matches!(self.target, Target::Schema(_))
    }

    fn bind_owner(&self, owner: &Weak<Schema>) -> Option<Arc<dyn FieldKind>> {
        if !self.is_recursive() {
            return None;
        }
        Some(Arc::new(EmbeddedField {
            target: Target::Bound(owner.clone()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::composer::SchemaBuilder;
    use crate::schema::field::FieldOptions;
    use crate::schema::kinds::{ListField, StringField};
    use serde_json::json;

    fn address() -> Arc<Schema> {
        SchemaBuilder::embedded("Address")
            .field("city", StringField::new().required())
            .build()
            .unwrap()
    }

    fn comment() -> Arc<Schema> {
        SchemaBuilder::embedded("Comment")
            .field("text", StringField::new().required())
            .field("replies", ListField::new(EmbeddedField::recursive()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_mapping_becomes_document() {
        let field = EmbeddedField::new(&address());
        let raw = Value::from(json!({"city": "Oslo"}));
        let native = field.native_from_raw(raw);
        let doc = native.as_document().unwrap();
        assert_eq!(doc.get("city").unwrap(), Value::from("Oslo"));
    }

    #[test]
    fn test_validate_runs_nested_document_validation() {
        let field = EmbeddedField::new(&address());
        let missing_city = field.native_from_raw(Value::from(json!({})));
        let reason = field.validate(&missing_city).unwrap_err();
        assert!(reason.contains("required field missing"));
    }

    #[test]
    fn test_validate_rejects_foreign_values() {
        let field = EmbeddedField::new(&address());
        assert!(field.validate(&Value::from("Oslo")).is_err());

        let other = SchemaBuilder::embedded("Other").build().unwrap();
        let foreign = Value::Document(Document::new(&other));
        assert!(field.validate(&foreign).is_err());
    }

    #[test]
    fn test_wire_export_is_nested_mapping() {
        let field = EmbeddedField::new(&address());
        let native = field.native_from_raw(Value::from(json!({"city": "Oslo"})));
        let wire = field.export_wire(&native);
        assert_eq!(wire["city"], json!("Oslo"));
        assert_eq!(wire["_cls"], json!("Address"));
    }

    #[test]
    fn test_null_assignment_declined() {
        let field = EmbeddedField::new(&address());
        assert_eq!(field.assign(Value::Null), None);
        assert!(field.assign(Value::from(json!({"city": "Oslo"}))).is_some());
    }

    #[test]
    fn test_unbound_self_reference() {
        let field = EmbeddedField::recursive();
        assert!(field.is_recursive());
        assert!(field.schema().is_none());
        let raw = Value::from(json!({"text": "hi"}));
        assert_eq!(field.native_from_raw(raw.clone()), raw);
        assert!(field.validate(&raw).is_err());
    }

    #[test]
    fn test_self_reference_bound_to_owner() {
        let schema = comment();
        let replies = schema.field("replies").unwrap();
        assert!(replies.kind().is_recursive());

        let doc = Document::from_json(
            &schema,
            &json!({"text": "root", "replies": [{"text": "child", "replies": [{"text": "leaf"}]}]}),
        )
        .unwrap();
        assert!(doc.validate().is_ok());

        let replies = doc.get("replies").unwrap();
        let child = replies.as_list().unwrap()[0].as_document().unwrap();
        assert_eq!(child.schema().class_name(), "Comment");
        assert_eq!(child.get("text").unwrap(), Value::from("child"));
    }

    #[test]
    fn test_subclass_rebinds_self_reference() {
        let parent = comment();
        let review = SchemaBuilder::embedded("Review")
            .extends(&parent)
            .field("stars", StringField::new())
            .build()
            .unwrap();
        let doc = Document::from_json(&review, &json!({"text": "ok", "replies": [{"stars": "5"}]}))
            .unwrap();
        let replies = doc.get("replies").unwrap();
        let nested = replies.as_list().unwrap()[0].as_document().unwrap();
        assert_eq!(nested.schema().class_name(), "Comment.Review");
        assert_eq!(nested.get("stars").unwrap(), Value::from("5"));
    }
}
