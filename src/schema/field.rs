//! Field descriptors
//!
//! A `Field` pairs the options every field shares (name, defaults, choices,
//! custom validation, identity flag) with a `FieldKind` that owns the
//! kind-specific conversion and validation. New kinds are added by
//! implementing `FieldKind`; nothing else in the engine changes.

use std::fmt;
use std::sync::{Arc, Weak};

use serde_json::{json, Value as JsonValue};

use super::composer::Schema;
use super::errors::{ShieldError, ShieldResult};
use super::types::Value;

/// Serialized key reserved for the identity field
pub const ID_KEY: &str = "_id";

/// Zero-argument default producer
pub type DefaultProducer = Arc<dyn Fn() -> Value + Send + Sync>;

/// Custom validation predicate
pub type CustomValidator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Kind-specific behavior of a field.
pub trait FieldKind: fmt::Debug + Send + Sync {
    /// JSON-schema `type` keyword
    fn type_name(&self) -> &'static str {
        "any"
    }

    /// Default used when the author declares none
    fn implicit_default(&self) -> FieldDefault {
        FieldDefault::None
    }

    /// Pure conversion of raw input into the native representation.
    ///
    /// Inputs that cannot be converted are returned unchanged so that
    /// `validate` can reject them.
    fn native_from_raw(&self, raw: Value) -> Value {
        raw
    }

    /// Conversion applied when a document field is assigned.
    ///
    /// `None` leaves the stored value unchanged.
    fn assign(&self, raw: Value) -> Option<Value> {
        Some(self.native_from_raw(raw))
    }

    /// Kind constraints. Returns the failure reason.
    fn validate(&self, _value: &Value) -> Result<(), String> {
        Ok(())
    }

    /// Representation for further in-process use
    fn export_native(&self, value: &Value) -> Value {
        value.clone()
    }

    /// Representation safe for the JSON codec
    fn export_wire(&self, value: &Value) -> JsonValue {
        self.export_native(value).to_json()
    }

    /// Extra JSON-schema keywords (`maxLength`, `format`, ...)
    fn jsonschema_keywords(&self, _out: &mut serde_json::Map<String, JsonValue>) {}

    /// Schema of embedded documents held by this kind, if any
    fn embedded_schema(&self) -> Option<Arc<Schema>> {
        None
    }

    /// True when the kind refers back to the schema that owns it
    fn is_recursive(&self) -> bool {
        false
    }

    /// Rebinds self-references to `owner` once its schema is composed.
    ///
    /// Returns `None` when the kind holds no self-reference.
    fn bind_owner(&self, _owner: &Weak<Schema>) -> Option<Arc<dyn FieldKind>> {
        None
    }
}

/// Default value of a field
#[derive(Clone, Default)]
pub enum FieldDefault {
    #[default]
    None,
    Value(Value),
    Producer(DefaultProducer),
}

impl FieldDefault {
    /// Resolves the default, invoking a producer every time.
    pub fn resolve(&self) -> Value {
        match self {
            FieldDefault::None => Value::Null,
            FieldDefault::Value(v) => v.clone(),
            FieldDefault::Producer(produce) => produce(),
        }
    }

    /// Static default, if one can be represented without running code.
    pub fn static_value(&self) -> Option<&Value> {
        match self {
            FieldDefault::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, FieldDefault::Producer(_))
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::None => write!(f, "None"),
            FieldDefault::Value(v) => f.debug_tuple("Value").field(v).finish(),
            FieldDefault::Producer(_) => write!(f, "Producer(..)"),
        }
    }
}

/// A field descriptor attached to a schema.
#[derive(Clone)]
pub struct Field {
    name: Option<String>,
    serialized_name: Option<String>,
    required: bool,
    default: FieldDefault,
    choices: Option<Vec<Value>>,
    validation: Option<CustomValidator>,
    id_field: bool,
    description: Option<String>,
    kind: Arc<dyn FieldKind>,
}

impl Field {
    /// Create a field of the given kind
    pub fn new(kind: impl FieldKind + 'static) -> Self {
        Self::from_kind(Arc::new(kind))
    }

    /// Create a field sharing an existing kind
    pub fn from_kind(kind: Arc<dyn FieldKind>) -> Self {
        Self {
            name: None,
            serialized_name: None,
            required: false,
            default: kind.implicit_default(),
            choices: None,
            validation: None,
            id_field: false,
            description: None,
            kind,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Static default value
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Default computed on every read of an unset value
    pub fn default_with<F>(mut self, produce: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = FieldDefault::Producer(Arc::new(produce));
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn validation<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validation = Some(Arc::new(check));
        self
    }

    /// Marks the field as the document identity, exported under `_id`.
    pub fn id_field(mut self) -> Self {
        self.id_field = true;
        self.serialized_name = Some(ID_KEY.to_string());
        self
    }

    /// Key used in exported mappings. Ignored for identity fields.
    pub fn serialized_name(mut self, key: impl Into<String>) -> Self {
        if !self.id_field {
            self.serialized_name = Some(key.into());
        }
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Binds the field to its name within a schema.
    ///
    /// The first binding wins; inherited fields keep their name.
    pub(crate) fn bind(&mut self, name: &str) {
        if self.name.is_none() {
            self.name = Some(name.to_string());
        }
        if self.serialized_name.is_none() {
            self.serialized_name = Some(name.to_string());
        }
    }

    pub(crate) fn bind_owner(&mut self, owner: &Weak<Schema>) {
        if let Some(kind) = self.kind.bind_owner(owner) {
            self.kind = kind;
        }
    }

    /// Field name; empty until the field is composed into a schema.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Key used in exported mappings
    pub fn key(&self) -> &str {
        self.serialized_name
            .as_deref()
            .unwrap_or_else(|| self.name())
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_id_field(&self) -> bool {
        self.id_field
    }

    pub fn default(&self) -> &FieldDefault {
        &self.default
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn get_choices(&self) -> Option<&[Value]> {
        self.choices.as_deref()
    }

    pub fn kind(&self) -> &Arc<dyn FieldKind> {
        &self.kind
    }

    /// True when `value` is exactly the unmodified static default.
    ///
    /// Producer defaults never match.
    pub fn is_default(&self, value: &Value) -> bool {
        match &self.default {
            FieldDefault::None => value.is_null(),
            FieldDefault::Value(v) => v == value,
            FieldDefault::Producer(_) => false,
        }
    }

    /// Full field check: choices, custom validator, then the kind.
    pub fn check(&self, value: &Value) -> ShieldResult<()> {
        if let Some(choices) = &self.choices {
            if !choices.contains(value) {
                let allowed: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
                return Err(ShieldError::field_invalid(
                    format!("value must be one of [{}]", allowed.join(", ")),
                    self.name(),
                    value.clone(),
                ));
            }
        }

        if let Some(check) = &self.validation {
            if !check(value) {
                return Err(ShieldError::field_invalid(
                    "value does not match custom validation method",
                    self.name(),
                    value.clone(),
                ));
            }
        }

        self.kind
            .validate(value)
            .map_err(|reason| ShieldError::field_invalid(reason, self.name(), value.clone()))
    }

    /// JSON-schema description of this field.
    pub fn for_jsonschema(&self) -> serde_json::Map<String, JsonValue> {
        // Self-references are described as plain objects to keep the output finite.
        if !self.kind.is_recursive() {
            if let Some(schema) = self.kind.embedded_schema() {
                return schema.for_jsonschema();
            }
        }

        let mut out = serde_json::Map::new();
        out.insert("type".into(), json!(self.kind.type_name()));
        if let Some(name) = &self.name {
            out.insert("title".into(), json!(name));
        }
        if let Some(description) = &self.description {
            out.insert("description".into(), json!(description));
        }
        if let Some(default) = self.default.static_value() {
            if !default.is_null() {
                out.insert("default".into(), default.to_json());
            }
        }
        if self.required {
            out.insert("required".into(), json!(true));
        }
        self.kind.jsonschema_keywords(&mut out);
        out
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("key", &self.key())
            .field("required", &self.required)
            .field("default", &self.default)
            .field("id_field", &self.id_field)
            .field("kind", &self.kind)
            .finish()
    }
}

impl<K: FieldKind + 'static> From<K> for Field {
    fn from(kind: K) -> Self {
        Field::new(kind)
    }
}

/// Shorthand for attaching common options directly to a kind.
pub trait FieldOptions: FieldKind + Sized + 'static {
    fn required(self) -> Field {
        Field::new(self).required()
    }

    fn default_value(self, value: impl Into<Value>) -> Field {
        Field::new(self).default_value(value)
    }

    fn default_with<F>(self, produce: F) -> Field
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Field::new(self).default_with(produce)
    }

    fn choices<I, V>(self, choices: I) -> Field
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Field::new(self).choices(choices)
    }

    fn validation<F>(self, check: F) -> Field
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Field::new(self).validation(check)
    }

    fn id_field(self) -> Field {
        Field::new(self).id_field()
    }

    fn serialized_name(self, key: impl Into<String>) -> Field {
        Field::new(self).serialized_name(key)
    }

    fn description(self, text: impl Into<String>) -> Field {
        Field::new(self).description(text)
    }
}

impl<K: FieldKind + Sized + 'static> FieldOptions for K {}

/// Base kind: accepts any value.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyField;

impl FieldKind for AnyField {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::kinds::{NumberField, StringField};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bound(mut field: Field, name: &str) -> Field {
        field.bind(name);
        field
    }

    #[test]
    fn test_serialized_name_defaults_to_name() {
        let field = bound(Field::new(AnyField), "title");
        assert_eq!(field.name(), "title");
        assert_eq!(field.key(), "title");
    }

    #[test]
    fn test_id_field_forces_reserved_key() {
        let field = bound(AnyField.id_field().serialized_name("pk"), "pk");
        assert_eq!(field.key(), ID_KEY);
        assert!(field.is_id_field());
    }

    #[test]
    fn test_bind_is_first_wins() {
        let mut field = Field::new(AnyField);
        field.bind("first");
        field.bind("second");
        assert_eq!(field.name(), "first");
    }

    #[test]
    fn test_producer_default_invoked_each_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let field = AnyField.default_with(move || {
            Value::Int(counter.fetch_add(1, Ordering::SeqCst) as i64)
        });
        assert_eq!(field.default().resolve(), Value::Int(0));
        assert_eq!(field.default().resolve(), Value::Int(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_choices_checked_before_kind() {
        let field = bound(StringField::new().choices(["red", "blue"]), "color");
        assert!(field.check(&Value::from("red")).is_ok());
        let err = field.check(&Value::from("green")).unwrap_err();
        assert!(err.reason().unwrap().contains("red"));
        assert_eq!(err.field(), Some("color"));
    }

    #[test]
    fn test_custom_validator() {
        let field = bound(
            NumberField::int().validation(|v| v.as_i64().map_or(false, |i| i % 2 == 0)),
            "even",
        );
        assert!(field.check(&Value::Int(4)).is_ok());
        let err = field.check(&Value::Int(3)).unwrap_err();
        assert_eq!(err.reason(), Some("value does not match custom validation method"));
    }

    #[test]
    fn test_is_default() {
        let field = AnyField.default_value("x");
        assert!(field.is_default(&Value::from("x")));
        assert!(!field.is_default(&Value::from("y")));
        let none = Field::new(AnyField);
        assert!(none.is_default(&Value::Null));
        let produced = AnyField.default_with(|| Value::Null);
        assert!(!produced.is_default(&Value::Null));
    }

    #[test]
    fn test_jsonschema_omits_producer_default() {
        let field = bound(AnyField.default_with(|| Value::Int(1)).required(), "n");
        let schema = field.for_jsonschema();
        assert_eq!(schema["type"], json!("any"));
        assert_eq!(schema["title"], json!("n"));
        assert_eq!(schema["required"], json!(true));
        assert!(!schema.contains_key("default"));
    }

    #[test]
    fn test_jsonschema_static_default_and_optional() {
        let field = bound(AnyField.default_value(7).description("lucky"), "n");
        let schema = field.for_jsonschema();
        assert_eq!(schema["default"], json!(7));
        assert_eq!(schema["description"], json!("lucky"));
        assert!(!schema.contains_key("required"));
    }
}
