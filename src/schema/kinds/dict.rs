//! Unstructured mapping fields

use std::sync::Arc;

use crate::schema::field::{FieldDefault, FieldKind};
use crate::schema::types::{Mapping, Value};

fn check_keys(map: &Mapping) -> Result<(), String> {
    if map.keys().any(|k| k.contains('.') || k.contains('$')) {
        return Err("invalid dictionary key name - keys may not contain \".\" or \"$\" characters".into());
    }
    Ok(())
}

fn empty_mapping() -> FieldDefault {
    FieldDefault::Producer(Arc::new(|| Value::Map(Mapping::new())))
}

/// A free-form mapping. Keys may not contain `.` or `$`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictField;

impl DictField {
    pub fn new() -> Self {
        Self
    }
}

impl FieldKind for DictField {
    fn type_name(&self) -> &'static str {
        "object"
    }

    fn implicit_default(&self) -> FieldDefault {
        empty_mapping()
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let map = value
            .as_map()
            .ok_or_else(|| "only mappings may be used in a dict field".to_string())?;
        check_keys(map)
    }
}

/// A mapping where every key holds a list of values.
///
/// Single values are wrapped into one-element lists on assignment, so
/// `{"tag": "a"}` is stored as `{"tag": ["a"]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiValueDictField;

impl MultiValueDictField {
    pub fn new() -> Self {
        Self
    }

    /// Last value stored under `key`, the one a single-value read sees.
    pub fn last<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
        value.as_map()?.get(key)?.as_list()?.last()
    }
}

impl FieldKind for MultiValueDictField {
    fn type_name(&self) -> &'static str {
        "object"
    }

    fn implicit_default(&self) -> FieldDefault {
        empty_mapping()
    }

    fn native_from_raw(&self, raw: Value) -> Value {
        match raw {
            Value::Map(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| match value {
                        Value::List(items) => (key, Value::List(items)),
                        single => (key, Value::List(vec![single])),
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let map = value
            .as_map()
            .ok_or_else(|| "only mappings may be used in a multi-value dict field".to_string())?;
        check_keys(map)
    }
}
