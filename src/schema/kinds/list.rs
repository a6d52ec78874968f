//! List fields wrapping a single inner kind

use std::sync::{Arc, Weak};

use serde_json::{json, Value as JsonValue};

use crate::schema::composer::Schema;
use crate::schema::field::{Field, FieldDefault, FieldKind};
use crate::schema::types::Value;

/// Sort applied to wire exports
#[derive(Debug, Clone, PartialEq, Eq)]
enum ListOrdering {
    Natural,
    Key(String),
}

/// A list of values that all share one field kind.
#[derive(Debug, Clone)]
pub struct ListField {
    inner: Arc<dyn FieldKind>,
    ordering: Option<ListOrdering>,
}

impl ListField {
    pub fn new(inner: impl FieldKind + 'static) -> Self {
        Self::of(Arc::new(inner))
    }

    pub fn of(inner: Arc<dyn FieldKind>) -> Self {
        Self {
            inner,
            ordering: None,
        }
    }

    /// Sorts items on wire export.
    pub fn sorted(mut self) -> Self {
        self.ordering = Some(ListOrdering::Natural);
        self
    }

    /// Sorts mapping or document items by `key` on wire export.
    pub fn ordering(mut self, key: impl Into<String>) -> Self {
        self.ordering = Some(ListOrdering::Key(key.into()));
        self
    }

    pub fn inner(&self) -> &Arc<dyn FieldKind> {
        &self.inner
    }

    fn sort_key(&self, item: &Value) -> Value {
        match &self.ordering {
            Some(ListOrdering::Key(key)) => match item {
                Value::Map(map) => map.get(key).cloned().unwrap_or_default(),
                Value::Document(doc) => doc.get(key).unwrap_or_default(),
                _ => Value::Null,
            },
            _ => item.clone(),
        }
    }
}

impl FieldKind for ListField {
    fn type_name(&self) -> &'static str {
        "array"
    }

    fn implicit_default(&self) -> FieldDefault {
        FieldDefault::Producer(Arc::new(|| Value::List(Vec::new())))
    }

    fn native_from_raw(&self, raw: Value) -> Value {
        match raw {
            Value::Null => Value::List(Vec::new()),
            Value::List(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| self.inner.native_from_raw(item))
                    .collect(),
            ),
            other => other,
        }
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let items = value
            .as_list()
            .ok_or_else(|| "only lists may be used in a list field".to_string())?;
        for (i, item) in items.iter().enumerate() {
            self.inner
                .validate(item)
                .map_err(|reason| format!("invalid list item [{}]: {}", i, reason))?;
        }
        Ok(())
    }

    fn export_native(&self, value: &Value) -> Value {
        match value {
            Value::List(items) => {
                Value::List(items.iter().map(|i| self.inner.export_native(i)).collect())
            }
            Value::Null => Value::List(Vec::new()),
            other => other.clone(),
        }
    }

    fn export_wire(&self, value: &Value) -> JsonValue {
        let items = match value {
            Value::List(items) => items,
            Value::Null => return JsonValue::Array(Vec::new()),
            other => return other.to_json(),
        };

        if self.ordering.is_none() {
            return JsonValue::Array(items.iter().map(|i| self.inner.export_wire(i)).collect());
        }

        let mut keyed: Vec<(Value, JsonValue)> = items
            .iter()
            .map(|i| (self.sort_key(i), self.inner.export_wire(i)))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        JsonValue::Array(keyed.into_iter().map(|(_, wire)| wire).collect())
    }

    fn jsonschema_keywords(&self, out: &mut serde_json::Map<String, JsonValue>) {
        let items = Field::from_kind(self.inner.clone()).for_jsonschema();
        out.insert("items".into(), json!(items));
    }

    fn is_recursive(&self) -> bool {
        self.inner.is_recursive()
    }

    fn bind_owner(&self, owner: &Weak<Schema>) -> Option<Arc<dyn FieldKind>> {
        let inner = self.inner.bind_owner(owner)?;
        Some(Arc::new(ListField {
            inner,
            ordering: self.ordering.clone(),
        }))
    }
}
