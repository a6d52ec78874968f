//! Boolean fields

use crate::schema::field::FieldKind;
use crate::schema::types::Value;

/// A boolean field.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanField;

impl BooleanField {
    pub fn new() -> Self {
        Self
    }
}

impl FieldKind for BooleanField {
    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        match value {
            Value::Bool(_) => Ok(()),
            _ => Err("not a boolean".into()),
        }
    }

    fn export_native(&self, value: &Value) -> Value {
        Value::Bool(value.is_truthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_booleans_validate() {
        assert!(BooleanField.validate(&Value::Bool(false)).is_ok());
        assert_eq!(BooleanField.validate(&Value::Int(1)), Err("not a boolean".into()));
    }

    #[test]
    fn test_export_native_uses_truthiness() {
        assert_eq!(BooleanField.export_native(&Value::Int(1)), Value::Bool(true));
        assert_eq!(BooleanField.export_native(&Value::from("")), Value::Bool(false));
    }
}
