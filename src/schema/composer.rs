//! Schema composition
//!
//! A schema is composed exactly once per document type by `SchemaBuilder`
//! and frozen into an `Arc<Schema>`. Composition:
//!
//! 1. Merges parent field sets (local declarations override)
//! 2. Tracks the class-name chain and ancestor map (a mixin's own name excluded)
//! 3. Enforces the inheritance lock
//! 4. Binds field names
//! 5. Assigns the identity field of top-level documents
//! 6. Computes the dotted discriminator
//! 7. Points self-referencing embedded fields at the new schema

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Weak};

use serde_json::{json, Value as JsonValue};
use tracing::debug;

use super::errors::{ShieldError, ShieldResult};
use super::field::{Field, ID_KEY};
use super::kinds::UuidField;
use crate::config::CollectionMeta;

/// Discriminator key on exported documents
pub const CLS_KEY: &str = "_cls";

/// Type-list key on exported documents
pub const TYPES_KEY: &str = "_types";

/// Name of the identity field synthesised for top-level documents
pub const DEFAULT_ID_FIELD: &str = "id";

/// Keys that never leave the system through a safe projection
pub const INTERNAL_FIELDS: [&str; 4] = [ID_KEY, DEFAULT_ID_FIELD, CLS_KEY, TYPES_KEY];

/// How a document type is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Owns a collection; gets an identity field
    TopLevel,
    /// Only lives inside other documents
    Embedded,
}

/// Frozen schema of one document type.
pub struct Schema {
    name: String,
    kind: DocumentKind,
    fields: BTreeMap<String, Field>,
    class_name: String,
    class_name_chain: Vec<String>,
    superclasses: BTreeMap<String, Arc<Schema>>,
    allow_inheritance: bool,
    mixin: bool,
    id_field: Option<String>,
    private_fields: BTreeSet<String>,
    public_fields: Option<BTreeSet<String>>,
    collection: Option<CollectionMeta>,
}

impl Schema {
    /// Type name as declared
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn fields(&self) -> &BTreeMap<String, Field> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Field exported under `key`
    pub fn field_by_key(&self, key: &str) -> Option<&Field> {
        self.fields.values().find(|f| f.key() == key)
    }

    /// Dotted discriminator, root ancestor first
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn class_name_chain(&self) -> &[String] {
        &self.class_name_chain
    }

    /// Ancestors keyed by class name (transitive, mixins themselves excluded)
    pub fn superclasses(&self) -> &BTreeMap<String, Arc<Schema>> {
        &self.superclasses
    }

    /// Ancestor class names followed by this class name
    pub fn types(&self) -> Vec<String> {
        self.superclasses
            .keys()
            .cloned()
            .chain(std::iter::once(self.class_name.clone()))
            .collect()
    }

    pub fn allows_inheritance(&self) -> bool {
        self.allow_inheritance
    }

    pub fn is_mixin(&self) -> bool {
        self.mixin
    }

    /// Name of the identity field (top-level documents only)
    pub fn id_field(&self) -> Option<&str> {
        self.id_field.as_deref()
    }

    pub fn private_fields(&self) -> &BTreeSet<String> {
        &self.private_fields
    }

    pub fn public_fields(&self) -> Option<&BTreeSet<String>> {
        self.public_fields.as_ref()
    }

    /// Collection metadata for the persistence layer
    pub fn collection(&self) -> Option<&CollectionMeta> {
        self.collection.as_ref()
    }

    /// Reserved keys unioned with the private fields.
    pub fn internal_fields(&self) -> BTreeSet<String> {
        INTERNAL_FIELDS
            .iter()
            .map(|k| k.to_string())
            .chain(self.private_fields.iter().cloned())
            .collect()
    }

    /// True when this schema is `other` or descends from it.
    pub fn is_subclass_of(&self, other: &Schema) -> bool {
        self.class_name == other.class_name || self.superclasses.contains_key(&other.class_name)
    }

    /// JSON-schema description of the document type.
    ///
    /// Restricted to the public fields when the schema declares them.
    pub fn for_jsonschema(&self) -> serde_json::Map<String, JsonValue> {
        let properties: serde_json::Map<String, JsonValue> = self
            .fields
            .iter()
            .filter(|(name, _)| {
                self.public_fields
                    .as_ref()
                    .map_or(true, |public| public.contains(*name))
            })
            .map(|(name, field)| (name.clone(), JsonValue::Object(field.for_jsonschema())))
            .collect();

        let mut out = serde_json::Map::new();
        out.insert("type".into(), json!("object"));
        out.insert("title".into(), json!(self.name));
        out.insert("properties".into(), JsonValue::Object(properties));
        out
    }

    /// JSON-schema description encoded as JSON text
    pub fn to_jsonschema(&self) -> String {
        JsonValue::Object(self.for_jsonschema()).to_string()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("class_name", &self.class_name)
            .field("kind", &self.kind)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("id_field", &self.id_field)
            .field("allow_inheritance", &self.allow_inheritance)
            .finish()
    }
}

/// One-time builder producing an immutable `Schema`.
pub struct SchemaBuilder {
    name: String,
    kind: DocumentKind,
    mixin: bool,
    parents: Vec<Arc<Schema>>,
    fields: Vec<(String, Field)>,
    allow_inheritance: bool,
    private_fields: Option<BTreeSet<String>>,
    public_fields: Option<BTreeSet<String>>,
    collection: Option<String>,
    max_documents: Option<u64>,
    max_size: Option<u64>,
}

impl SchemaBuilder {
    fn new(name: impl Into<String>, kind: DocumentKind, mixin: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            mixin,
            parents: Vec::new(),
            fields: Vec::new(),
            allow_inheritance: true,
            private_fields: None,
            public_fields: None,
            collection: None,
            max_documents: None,
            max_size: None,
        }
    }

    /// Top-level, collection-backed document
    pub fn document(name: impl Into<String>) -> Self {
        Self::new(name, DocumentKind::TopLevel, false)
    }

    /// Document stored inside other documents
    pub fn embedded(name: impl Into<String>) -> Self {
        Self::new(name, DocumentKind::Embedded, false)
    }

    /// Field bundle that adds fields without joining the class hierarchy
    pub fn mixin(name: impl Into<String>) -> Self {
        Self::new(name, DocumentKind::Embedded, true)
    }

    pub fn extends(mut self, parent: &Arc<Schema>) -> Self {
        self.parents.push(parent.clone());
        self
    }

    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.push((name.into(), field.into()));
        self
    }

    /// Disabling inheritance drops `_cls`/`_types` from exports.
    pub fn allow_inheritance(mut self, allow: bool) -> Self {
        self.allow_inheritance = allow;
        self
    }

    /// Replaces the private fields inherited from parents.
    pub fn private_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.private_fields = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the public fields inherited from parents.
    pub fn public_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_fields = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    pub fn max_documents(mut self, max: u64) -> Self {
        self.max_documents = Some(max);
        self
    }

    pub fn max_size(mut self, max: u64) -> Self {
        self.max_size = Some(max);
        self
    }

    /// Composes and freezes the schema.
    ///
    /// # Errors
    ///
    /// Returns `ShieldError::Configuration` if:
    /// - a parent disables inheritance
    /// - a schema with parents disables inheritance
    /// - two fields claim the identity
    pub fn build(self) -> ShieldResult<Arc<Schema>> {
        let mut fields: BTreeMap<String, Field> = BTreeMap::new();
        let mut lineage: Vec<String> = Vec::new();
        let mut superclasses: BTreeMap<String, Arc<Schema>> = BTreeMap::new();
        let mut inherited_id: Option<String> = None;
        let mut inherited_collection: Option<CollectionMeta> = None;
        let mut inherited_private: Option<BTreeSet<String>> = None;
        let mut inherited_public: Option<BTreeSet<String>> = None;

        for parent in &self.parents {
            if !parent.allow_inheritance {
                return Err(ShieldError::configuration(format!(
                    "document {} may not be subclassed",
                    parent.name
                )));
            }

            for (name, field) in &parent.fields {
                fields.insert(name.clone(), field.clone());
            }

            if !parent.mixin {
                lineage.push(parent.class_name.clone());
                superclasses.insert(parent.class_name.clone(), parent.clone());
            }
            for (name, ancestor) in &parent.superclasses {
                superclasses.insert(name.clone(), ancestor.clone());
            }

            if inherited_id.is_none() {
                inherited_id = parent.id_field.clone();
            }
            if inherited_collection.is_none() {
                inherited_collection = parent.collection.clone();
            }
            if inherited_private.is_none() && !parent.private_fields.is_empty() {
                inherited_private = Some(parent.private_fields.clone());
            }
            if inherited_public.is_none() {
                inherited_public = parent.public_fields.clone();
            }
        }

        if !self.parents.is_empty() && !self.allow_inheritance {
            return Err(ShieldError::configuration(format!(
                "only direct subclasses of the root document may disable inheritance ({})",
                self.name
            )));
        }

        for (name, mut field) in self.fields {
            field.bind(&name);
            fields.insert(name, field);
        }

        lineage.reverse();
        lineage.push(self.name.clone());
        let class_name = lineage.join(".");
        let class_name_chain: Vec<String> = class_name.split('.').map(String::from).collect();

        let (id_field, collection) = match self.kind {
            DocumentKind::TopLevel => {
                let id_field = assign_id_field(&mut fields, inherited_id)?;
                let mut meta = inherited_collection
                    .unwrap_or_else(|| CollectionMeta::named(self.name.to_lowercase()));
                if let Some(name) = self.collection {
                    meta.collection = name;
                }
                if self.max_documents.is_some() {
                    meta.max_documents = self.max_documents;
                }
                if self.max_size.is_some() {
                    meta.max_size = self.max_size;
                }
                (Some(id_field), Some(meta))
            }
            DocumentKind::Embedded => (None, None),
        };

        debug!(
            class_name = %class_name,
            fields = fields.len(),
            id_field = ?id_field,
            "schema composed"
        );

        let private_fields = self
            .private_fields
            .or(inherited_private)
            .unwrap_or_default();
        let public_fields = self.public_fields.or(inherited_public);
        let name = self.name;
        let kind = self.kind;
        let allow_inheritance = self.allow_inheritance;
        let mixin = self.mixin;

        Ok(Arc::new_cyclic(|owner: &Weak<Schema>| {
            for field in fields.values_mut() {
                field.bind_owner(owner);
            }
            Schema {
                name,
                kind,
                fields,
                class_name,
                class_name_chain,
                superclasses,
                allow_inheritance,
                mixin,
                id_field,
                private_fields,
                public_fields,
                collection,
            }
        }))
    }
}

/// Picks the identity field, synthesising `id` when none is declared.
fn assign_id_field(
    fields: &mut BTreeMap<String, Field>,
    inherited: Option<String>,
) -> ShieldResult<String> {
    let mut current = inherited;

    for (name, field) in fields.iter() {
        if !field.is_id_field() {
            continue;
        }
        if let Some(existing) = current.as_deref() {
            if existing != name {
                return Err(ShieldError::configuration(format!(
                    "cannot override id field '{}' with '{}'",
                    existing, name
                )));
            }
        }
        current = Some(name.clone());
    }

    match current {
        Some(name) if fields.contains_key(&name) => Ok(name),
        _ => {
            let mut id = Field::new(UuidField::new()).id_field();
            id.bind(DEFAULT_ID_FIELD);
            fields.insert(DEFAULT_ID_FIELD.to_string(), id);
            Ok(DEFAULT_ID_FIELD.to_string())
        }
    }
}
