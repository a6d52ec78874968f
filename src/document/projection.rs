//! Safe projections of exported documents
//!
//! Owner-safe projections drop the schema's internal fields (reserved keys
//! plus private fields). Public-safe projections keep only the declared
//! public fields, falling back to owner-safe rules when none are declared.
//! Both recurse into embedded documents, and lists of them, using the nested
//! document's own schema.

use serde_json::Value as JsonValue;

use super::instance::Document;
use crate::schema::{mapping_to_wire, Mapping, Schema, Value};

/// Input accepted by the projection functions
#[derive(Debug, Clone)]
pub enum SafeInput {
    Document(Document),
    Mapping(Mapping),
    Documents(Vec<Document>),
    Mappings(Vec<Mapping>),
}

impl From<Document> for SafeInput {
    fn from(doc: Document) -> Self {
        SafeInput::Document(doc)
    }
}

impl From<&Document> for SafeInput {
    fn from(doc: &Document) -> Self {
        SafeInput::Document(doc.clone())
    }
}

impl From<Mapping> for SafeInput {
    fn from(map: Mapping) -> Self {
        SafeInput::Mapping(map)
    }
}

impl From<Vec<Document>> for SafeInput {
    fn from(docs: Vec<Document>) -> Self {
        SafeInput::Documents(docs)
    }
}

impl From<Vec<Mapping>> for SafeInput {
    fn from(maps: Vec<Mapping>) -> Self {
        SafeInput::Mappings(maps)
    }
}

/// Projection result, mirroring the input shape
#[derive(Debug, Clone, PartialEq)]
pub enum SafeOutput {
    Mapping(Mapping),
    List(Vec<Mapping>),
}

impl SafeOutput {
    pub fn into_mapping(self) -> Option<Mapping> {
        match self {
            SafeOutput::Mapping(map) => Some(map),
            SafeOutput::List(_) => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Mapping>> {
        match self {
            SafeOutput::List(maps) => Some(maps),
            SafeOutput::Mapping(_) => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            SafeOutput::Mapping(map) => JsonValue::Object(mapping_to_wire(map)),
            SafeOutput::List(maps) => JsonValue::Array(
                maps.iter()
                    .map(|m| JsonValue::Object(mapping_to_wire(m)))
                    .collect(),
            ),
        }
    }
}

type Filter = fn(&Schema, Mapping) -> Mapping;

fn apply(filter: Filter, schema: &Schema, input: SafeInput) -> SafeOutput {
    match input {
        SafeInput::Document(doc) => SafeOutput::Mapping(filter(schema, doc.to_native())),
        SafeInput::Mapping(map) => SafeOutput::Mapping(filter(schema, map)),
        SafeInput::Documents(docs) => SafeOutput::List(
            docs.iter()
                .map(|doc| filter(schema, doc.to_native()))
                .collect(),
        ),
        SafeInput::Mappings(maps) => {
            SafeOutput::List(maps.into_iter().map(|map| filter(schema, map)).collect())
        }
    }
}

/// Replaces embedded documents (or lists starting with one) by their
/// filtered native mappings.
fn descend(filter: Filter, value: &mut Value) {
    match value {
        Value::Document(doc) => {
            *value = Value::Map(filter(doc.schema(), doc.to_native()));
        }
        Value::List(items) if matches!(items.first(), Some(Value::Document(_))) => {
            for item in items.iter_mut() {
                if let Value::Document(doc) = item {
                    *item = Value::Map(filter(doc.schema(), doc.to_native()));
                }
            }
        }
        _ => {}
    }
}

fn ownersafe_mapping(schema: &Schema, mut map: Mapping) -> Mapping {
    let internal = schema.internal_fields();
    map.retain(|key, _| !internal.contains(key));
    for value in map.values_mut() {
        descend(ownersafe_mapping, value);
    }
    map
}

fn publicsafe_mapping(schema: &Schema, mut map: Mapping) -> Mapping {
    let Some(public) = schema.public_fields() else {
        return ownersafe_mapping(schema, map);
    };
    map.retain(|key, _| public.contains(key));
    for value in map.values_mut() {
        descend(publicsafe_mapping, value);
    }
    map
}

/// Removes internal and private fields for the document's owner.
pub fn make_ownersafe(schema: &Schema, input: impl Into<SafeInput>) -> SafeOutput {
    apply(ownersafe_mapping, schema, input.into())
}

/// Keeps only public fields for third parties.
pub fn make_publicsafe(schema: &Schema, input: impl Into<SafeInput>) -> SafeOutput {
    apply(publicsafe_mapping, schema, input.into())
}

/// Owner-safe projection encoded as JSON text
pub fn make_json_ownersafe(schema: &Schema, input: impl Into<SafeInput>) -> String {
    make_ownersafe(schema, input).to_json().to_string()
}

/// Public-safe projection encoded as JSON text
pub fn make_json_publicsafe(schema: &Schema, input: impl Into<SafeInput>) -> String {
    make_publicsafe(schema, input).to_json().to_string()
}
