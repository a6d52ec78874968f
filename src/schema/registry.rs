//! Schema registry for polymorphic reconstruction
//!
//! Schemas are registered explicitly, once, at their definition site. The
//! registry maps discriminators (`_cls`) to schemas, answers subclass
//! queries, and rebuilds documents from stored mappings.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::composer::{Schema, CLS_KEY};
use super::errors::{ShieldError, ShieldResult};
use super::types::{Mapping, Value};
use crate::document::Document;

/// Registry of composed schemas keyed by class name.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a composed schema.
    ///
    /// A class name can only be registered once; schemas are immutable.
    pub fn register(&mut self, schema: &Arc<Schema>) -> ShieldResult<()> {
        let class_name = schema.class_name().to_string();
        if self.schemas.contains_key(&class_name) {
            return Err(ShieldError::configuration(format!(
                "schema {} is already registered",
                class_name
            )));
        }

        debug!(class_name = %class_name, "schema registered");
        self.schemas.insert(class_name, schema.clone());
        Ok(())
    }

    /// Gets a schema by class name.
    pub fn get(&self, class_name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(class_name)
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.schemas.contains_key(class_name)
    }

    /// Registered schemas descending from `class_name`, excluding itself.
    pub fn subclasses_of(&self, class_name: &str) -> Vec<&Arc<Schema>> {
        self.schemas
            .values()
            .filter(|s| s.superclasses().contains_key(class_name))
            .collect()
    }

    pub fn all_schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Rebuilds a document from a stored mapping using its `_cls` key.
    ///
    /// # Errors
    ///
    /// Returns `ShieldError::UnknownSchema` if the discriminator is missing,
    /// not a string, or not registered.
    pub fn load(&self, mapping: Mapping) -> ShieldResult<Document> {
        let class_name = match mapping.get(CLS_KEY) {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(ShieldError::UnknownSchema(format!(
                    "discriminator is not a string: {}",
                    other
                )))
            }
            None => {
                return Err(ShieldError::UnknownSchema(format!(
                    "mapping has no {} key",
                    CLS_KEY
                )))
            }
        };

        let schema = self
            .get(&class_name)
            .ok_or_else(|| ShieldError::UnknownSchema(class_name.clone()))?;

        Ok(Document::from_mapping(schema, mapping))
    }

    /// Rebuilds a document from a JSON object.
    pub fn load_json(&self, json: &serde_json::Value) -> ShieldResult<Document> {
        match Value::from(json.clone()) {
            Value::Map(mapping) => self.load(mapping),
            other => Err(ShieldError::UnknownSchema(format!(
                "expected an object, got {}",
                other.type_name()
            ))),
        }
    }
}
