//! Document instances
//!
//! A document is a schema handle plus a values store keyed by field name.
//! Every assignment goes through the field kind's conversion; reads of unset
//! fields resolve the field default.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::trace;

use crate::schema::{
    Field, Mapping, Schema, ShieldError, ShieldResult, Value, WireMapping, CLS_KEY, ID_KEY,
    TYPES_KEY,
};

/// A document of one schema.
#[derive(Clone)]
pub struct Document {
    schema: Arc<Schema>,
    data: Mapping,
}

impl Document {
    /// Creates a document holding only defaults.
    pub fn new(schema: &Arc<Schema>) -> Self {
        let mut doc = Self {
            schema: schema.clone(),
            data: Mapping::new(),
        };
        let defaults: Vec<(String, Value)> = schema
            .fields()
            .iter()
            .map(|(name, field)| (name.clone(), field.default().resolve()))
            .collect();
        for (name, value) in defaults {
            doc.store(&name, value);
        }
        doc
    }

    /// Creates a document from a seed mapping.
    ///
    /// Defaults are applied first, then seed entries. `_id` and serialized
    /// names map to their field; unknown keys are ignored.
    pub fn from_mapping(schema: &Arc<Schema>, seed: Mapping) -> Self {
        let mut doc = Self::new(schema);
        for (key, value) in seed {
            match doc.resolve_key(&key) {
                Some(name) => doc.store(&name, value),
                None => trace!(class_name = %schema.class_name(), key = %key, "seed key ignored"),
            }
        }
        doc
    }

    /// Creates a document from a JSON object.
    pub fn from_json(schema: &Arc<Schema>, json: &JsonValue) -> ShieldResult<Self> {
        match Value::from(json.clone()) {
            Value::Map(seed) => Ok(Self::from_mapping(schema, seed)),
            other => Err(ShieldError::document_invalid(
                format!("expected a JSON object, got {}", other.type_name()),
                "$root",
                other,
            )),
        }
    }

    /// Creates a document from JSON text.
    pub fn from_json_str(schema: &Arc<Schema>, text: &str) -> ShieldResult<Self> {
        let json: JsonValue = serde_json::from_str(text).map_err(|e| {
            ShieldError::document_invalid(format!("invalid JSON: {}", e), "$root", Value::Null)
        })?;
        Self::from_json(schema, &json)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Reads a field, resolving the default when nothing is stored.
    pub fn get(&self, name: &str) -> ShieldResult<Value> {
        let field = self.declared(name)?;
        Ok(match self.data.get(name) {
            Some(value) => value.clone(),
            None => field.default().resolve(),
        })
    }

    /// Assigns a field through its kind's conversion.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> ShieldResult<()> {
        self.declared(name)?;
        self.store(name, value.into());
        Ok(())
    }

    /// True when a value is stored for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Declared field names in schema order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.schema.fields().keys().map(String::as_str)
    }

    /// Identity value, if the schema has an identity field and it is set
    pub fn id(&self) -> Option<Value> {
        let name = self.schema.id_field()?;
        self.data.get(name).filter(|v| v.is_truthy()).cloned()
    }

    /// Validates every field, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns `ShieldError::DocumentInvalid` for the first field that fails
    /// its checks, or for a required field that is absent or empty.
    pub fn validate(&self) -> ShieldResult<()> {
        for (name, field) in self.schema.fields() {
            let value = self.get(name)?;
            let absent = value.is_null() || value.as_str() == Some("");

            if !absent {
                field.check(&value).map_err(|e| match e {
                    ShieldError::FieldInvalid {
                        reason,
                        field,
                        value,
                    } => ShieldError::DocumentInvalid {
                        reason,
                        field,
                        value,
                    },
                    other => other,
                })?;
            } else if field.is_required() {
                return Err(ShieldError::required_missing(name.as_str()));
            }
        }
        Ok(())
    }

    /// Exports for in-process use. Embedded documents stay documents.
    pub fn to_native(&self) -> Mapping {
        let mut out = Mapping::new();
        for (name, field) in self.schema.fields() {
            let value = self.read(name, field);
            if !value.is_null() {
                out.insert(field.key().to_string(), field.kind().export_native(&value));
            }
        }

        if self.schema.allows_inheritance() {
            out.insert(CLS_KEY.to_string(), Value::from(self.schema.class_name()));
            out.insert(
                TYPES_KEY.to_string(),
                Value::List(self.schema.types().into_iter().map(Value::from).collect()),
            );
        }

        if out.get(ID_KEY).map_or(false, |id| !id.is_truthy()) {
            out.remove(ID_KEY);
        }
        out
    }

    /// Exports for the JSON codec.
    pub fn to_wire(&self) -> WireMapping {
        let mut out = WireMapping::new();
        for (name, field) in self.schema.fields() {
            let value = self.read(name, field);
            if !value.is_null() {
                out.insert(field.key().to_string(), field.kind().export_wire(&value));
            }
        }

        if self.schema.allows_inheritance() {
            out.insert(CLS_KEY.to_string(), JsonValue::from(self.schema.class_name()));
            out.insert(TYPES_KEY.to_string(), JsonValue::from(self.schema.types()));
        }

        if out.get(ID_KEY).map_or(false, json_is_falsy) {
            out.remove(ID_KEY);
        }
        out
    }

    /// Wire export encoded as JSON text
    pub fn to_json(&self) -> String {
        JsonValue::Object(self.to_wire()).to_string()
    }

    fn declared(&self, name: &str) -> ShieldResult<&Field> {
        self.schema
            .field(name)
            .ok_or_else(|| ShieldError::UnknownField(name.to_string()))
    }

    fn read(&self, name: &str, field: &Field) -> Value {
        match self.data.get(name) {
            Some(value) => value.clone(),
            None => field.default().resolve(),
        }
    }

    /// Stores a converted value; null values are not kept.
    ///
    /// Kinds that decline the assignment leave the current value in place.
    fn store(&mut self, name: &str, raw: Value) {
        let Some(field) = self.schema.field(name) else {
            return;
        };
        let Some(value) = field.kind().assign(raw) else {
            return;
        };
        if value.is_null() {
            self.data.remove(name);
        } else {
            self.data.insert(name.to_string(), value);
        }
    }

    /// Maps a seed key to a field name.
    fn resolve_key(&self, key: &str) -> Option<String> {
        if key == ID_KEY {
            if let Some(id) = self.schema.id_field() {
                return Some(id.to_string());
            }
        }
        if self.schema.field(key).is_some() {
            return Some(key.to_string());
        }
        self.schema.field_by_key(key).map(|f| f.name().to_string())
    }
}

fn json_is_falsy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
    }
}

impl PartialEq for Document {
    /// Same class and equal identity values. Documents without an identity
    /// are never equal.
    fn eq(&self, other: &Self) -> bool {
        if self.schema.class_name() != other.schema.class_name() {
            return false;
        }
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("class_name", &self.schema.class_name())
            .field("data", &self.data)
            .finish()
    }
}
