//! UUID fields

use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::schema::field::FieldKind;
use crate::schema::types::Value;

/// A field storing a UUID, optionally auto-filling empty assignments.
#[derive(Debug, Clone, Copy)]
pub struct UuidField {
    auto_fill: bool,
}

impl Default for UuidField {
    fn default() -> Self {
        Self { auto_fill: true }
    }
}

impl UuidField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables generation of a UUID for empty assignments.
    pub fn without_auto_fill() -> Self {
        Self { auto_fill: false }
    }

    pub fn auto_fill(&self) -> bool {
        self.auto_fill
    }
}

impl FieldKind for UuidField {
    fn type_name(&self) -> &'static str {
        "string"
    }

    fn native_from_raw(&self, raw: Value) -> Value {
        if let Value::String(s) = &raw {
            if let Ok(id) = Uuid::parse_str(s.trim()) {
                return Value::Uuid(id);
            }
        }
        raw
    }

    fn assign(&self, raw: Value) -> Option<Value> {
        if !raw.is_truthy() {
            if self.auto_fill {
                return Some(Value::Uuid(Uuid::new_v4()));
            }
            return Some(Value::Null);
        }
        Some(self.native_from_raw(raw))
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        match value {
            Value::Uuid(_) => Ok(()),
            Value::String(s) if Uuid::parse_str(s.trim()).is_ok() => Ok(()),
            _ => Err("not a valid UUID".into()),
        }
    }

    fn export_wire(&self, value: &Value) -> JsonValue {
        match value {
            Value::Uuid(id) => json!(id.to_string()),
            other => other.to_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_autofills_empty_values() {
        let field = UuidField::new();
        assert!(matches!(field.assign(Value::Null), Some(Value::Uuid(_))));
        assert!(matches!(field.assign(Value::from("")), Some(Value::Uuid(_))));
        assert_eq!(UuidField::without_auto_fill().assign(Value::Null), Some(Value::Null));
    }

    #[test]
    fn test_assign_coerces_strings() {
        let id = Uuid::new_v4();
        let field = UuidField::new();
        assert_eq!(field.assign(Value::from(id.to_string())), Some(Value::Uuid(id)));
        assert_eq!(field.assign(Value::from("nope")), Some(Value::from("nope")));
    }

    #[test]
    fn test_validate() {
        let field = UuidField::new();
        let id = Uuid::new_v4();
        assert!(field.validate(&Value::Uuid(id)).is_ok());
        assert!(field.validate(&Value::from(id.to_string())).is_ok());
        assert_eq!(field.validate(&Value::from("nope")), Err("not a valid UUID".into()));
        assert_eq!(field.validate(&Value::Int(3)), Err("not a valid UUID".into()));
    }

    #[test]
    fn test_exports() {
        let field = UuidField::new();
        let id = Uuid::new_v4();
        assert_eq!(field.export_native(&Value::Uuid(id)), Value::Uuid(id));
        assert_eq!(field.export_wire(&Value::Uuid(id)), json!(id.to_string()));
    }
}
